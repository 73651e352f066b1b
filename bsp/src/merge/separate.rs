//! Finds the axis-aligned plane that separates two packed maps.

use glam::Vec3;

use crate::error::MergeError;

/// A plane strictly between two bounding boxes, ready to be inserted by
/// `HeadNodeBuilder`. `swap` is set when the raw normal had a negative
/// component and was inverted to keep plane normals non-negative — callers
/// must exchange child slots in the nodes/clipnodes they build around it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeparatingPlane {
    pub normal: Vec3,
    pub distance: f32,
    pub swap: bool,
}

/// Finds an axis-aligned plane lying strictly between `a`'s and `b`'s
/// bounding boxes, scanning axes x, y, then z.
pub fn separate(a: (Vec3, Vec3), b: (Vec3, Vec3)) -> Result<SeparatingPlane, MergeError> {
    let (a_min, a_max) = a;
    let (b_min, b_max) = b;

    for axis in 0..3 {
        if b_min[axis] >= a_max[axis] {
            let normal = axis_unit(axis, 1.0);
            let distance = a_max[axis] + (b_min[axis] - a_max[axis]) / 2.0;
            return Ok(finish(normal, distance));
        }

        if b_max[axis] <= a_min[axis] {
            let normal = axis_unit(axis, -1.0);
            let distance = b_max[axis] + (a_min[axis] - b_max[axis]) / 2.0;
            return Ok(finish(normal, distance));
        }
    }

    Err(MergeError::NotSeparable)
}

fn axis_unit(axis: usize, sign: f32) -> Vec3 {
    let mut v = [0.0f32; 3];
    v[axis] = sign;
    Vec3::from_array(v)
}

/// Engine vis/lighting code mishandles nodes whose plane normal has a
/// negative component, so such planes are inverted and the caller is told
/// to swap child slots to compensate.
fn finish(normal: Vec3, distance: f32) -> SeparatingPlane {
    if normal.x < 0.0 || normal.y < 0.0 || normal.z < 0.0 {
        SeparatingPlane {
            normal: -normal,
            distance: -distance,
            swap: true,
        }
    } else {
        SeparatingPlane {
            normal,
            distance,
            swap: false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn plus_x_separation() {
        let a = (Vec3::splat(-128.0), Vec3::splat(128.0));
        let b = (Vec3::new(384.0, -128.0, -128.0), Vec3::new(640.0, 128.0, 128.0));

        let plane = separate(a, b).unwrap();
        assert_eq!(plane.normal, Vec3::X);
        assert_eq!(plane.distance, 256.0);
        assert!(!plane.swap);
    }

    #[test]
    fn minus_x_separation_is_inverted_to_plus_x() {
        let a = (Vec3::new(384.0, -128.0, -128.0), Vec3::new(640.0, 128.0, 128.0));
        let b = (Vec3::splat(-128.0), Vec3::splat(128.0));

        let plane = separate(a, b).unwrap();
        assert_eq!(plane.normal, Vec3::X);
        assert!(plane.swap);
    }

    #[test]
    fn overlapping_boxes_are_not_separable() {
        let a = (Vec3::splat(-128.0), Vec3::splat(128.0));
        let b = (Vec3::splat(-64.0), Vec3::splat(64.0));

        assert!(matches!(separate(a, b), Err(MergeError::NotSeparable)));
    }
}

//! Spatial packer: moves a set of maps so their bounding boxes occupy
//! disjoint cells of a cube-shaped 3-D grid.

use glam::Vec3;

use crate::{constants::MAX_MAP_COORD, error::PackError, types::Bsp};

/// Moves every map in `maps` so their bounding boxes occupy disjoint cells
/// of a cube grid, each cell at least `gap` wider than the largest map on
/// every axis. A no-op if no two input maps already overlap.
pub fn pack(maps: &mut [Bsp], gap: Vec3) -> Result<(), PackError> {
    let n = maps.len();
    if n < 2 {
        return Ok(());
    }

    let boxes: Vec<(Vec3, Vec3)> = maps.iter().map(|m| m.get_bounding_box()).collect();

    if !any_pair_overlaps(&boxes) {
        return Ok(());
    }

    let sizes: Vec<Vec3> = boxes.iter().map(|(mins, maxs)| *maxs - *mins).collect();
    let max_size = sizes
        .iter()
        .fold(Vec3::ZERO, |acc, s| acc.max(*s));
    let cell = max_size + gap;

    let k = grid_size(n);

    let room = |axis: f32| ((2.0 * MAX_MAP_COORD) / axis).floor() as usize;
    let capacity = room(cell.x) * room(cell.y) * room(cell.z);
    if capacity < n {
        return Err(PackError::InsufficientRoom { count: n });
    }

    let origin = -cell / 2.0;

    for (i, map) in maps.iter_mut().enumerate() {
        let x = (i % k) as f32;
        let y = ((i / k) % k) as f32;
        let z = (i / (k * k)) as f32;

        let cell_center = origin + Vec3::new(x, y, z) * cell;
        let (mins, _maxs) = boxes[i];
        let size = sizes[i];
        let target_min = cell_center - size / 2.0;
        let offset = target_min - mins;

        map.translate(offset);
    }

    Ok(())
}

/// Side length of the cube grid that has room for `n` cells: the smallest
/// `k` with `k^3 >= n`.
pub(crate) fn grid_size(n: usize) -> usize {
    let mut k = (n as f64).cbrt().ceil() as usize;
    if k == 0 {
        k = 1;
    }
    while k * k * k < n {
        k += 1;
    }
    k
}

fn any_pair_overlaps(boxes: &[(Vec3, Vec3)]) -> bool {
    let n = boxes.len();
    for i in 0..n {
        for j in (i + 1)..n {
            if boxes_overlap(boxes[i], boxes[j]) {
                return true;
            }
        }
    }
    false
}

fn boxes_overlap((a_min, a_max): (Vec3, Vec3), (b_min, b_max): (Vec3, Vec3)) -> bool {
    a_min.x < b_max.x
        && a_max.x > b_min.x
        && a_min.y < b_max.y
        && a_max.y > b_min.y
        && a_min.z < b_max.z
        && a_max.z > b_min.z
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{Entity, Leaf, LeafContent, Model, Plane, PlaneType};

    fn cube_bsp(name: &str, half: f32) -> Bsp {
        let mut worldspawn = Entity::new();
        worldspawn.insert("classname".to_string(), "worldspawn".to_string());

        Bsp {
            name: name.to_string(),
            entities: vec![worldspawn],
            planes: vec![Plane {
                normal: Vec3::X,
                distance: 0.0,
                type_: PlaneType::X,
            }],
            textures: vec![],
            vertices: vec![],
            visibility: vec![],
            nodes: vec![],
            texinfo: vec![],
            faces: vec![],
            lightmap: vec![],
            clipnodes: vec![],
            leaves: vec![Leaf {
                contents: LeafContent::ContentsEmpty,
                vis_offset: -1,
                mins: [-half as i16, -half as i16, -half as i16],
                maxs: [half as i16, half as i16, half as i16],
                first_mark_surface: 0,
                mark_surface_count: 0,
                ambient_levels: [0, 0, 0, 0],
            }],
            mark_surfaces: vec![],
            edges: vec![],
            surf_edges: vec![],
            models: vec![Model {
                mins: Vec3::splat(-half),
                maxs: Vec3::splat(half),
                origin: Vec3::ZERO,
                head_nodes: [-1, -1, -1, -1],
                vis_leaves_count: 1,
                first_face: 0,
                face_count: 0,
            }],
        }
    }

    #[test]
    fn no_overlap_is_a_no_op() {
        let a = cube_bsp("a", 128.0);
        let mut b = cube_bsp("b", 128.0);
        b.translate(Vec3::new(512.0, 0.0, 0.0));

        let a_box_before = a.get_bounding_box();
        let b_box_before = b.get_bounding_box();

        let mut maps = vec![a, b];
        pack(&mut maps, Vec3::splat(64.0)).unwrap();

        assert_eq!(maps[0].get_bounding_box(), a_box_before);
        assert_eq!(maps[1].get_bounding_box(), b_box_before);
    }

    #[test]
    fn twenty_seven_cubes_form_a_3x3x3_grid() {
        let mut maps: Vec<Bsp> = (0..27).map(|i| cube_bsp(&i.to_string(), 256.0)).collect();

        pack(&mut maps, Vec3::splat(64.0)).unwrap();

        for i in 0..maps.len() {
            for j in (i + 1)..maps.len() {
                let (a_min, a_max) = maps[i].get_bounding_box();
                let (b_min, b_max) = maps[j].get_bounding_box();
                assert!(!boxes_overlap((a_min, a_max), (b_min, b_max)));
            }
        }

        let (mins, maxs) = maps[0].get_bounding_box();
        assert_eq!(mins, Vec3::splat(-544.0));
        assert_eq!(maxs, Vec3::splat(-32.0));
    }

    #[test]
    fn nine_oversized_cubes_exhaust_room() {
        let mut maps: Vec<Bsp> = (0..9).map(|i| cube_bsp(&i.to_string(), 15_000.0)).collect();
        let err = pack(&mut maps, Vec3::splat(64.0)).unwrap_err();
        assert!(matches!(err, PackError::InsufficientRoom { count: 9 }));
    }
}

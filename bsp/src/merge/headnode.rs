//! Synthesises the new BSP head node and clip-hull head nodes that route
//! into A's and B's former root nodes via the separating plane.

use crate::{
    constants::HULL_COUNT,
    merge::separate::SeparatingPlane,
    types::{Bsp, ClipNode, Node, Plane, PlaneType},
};

/// The new head node and `HULL_COUNT - 1` new clip-hull head clipnodes
/// produced for a merge, plus the index of the separating plane they
/// reference. The per-lump NODES/CLIPNODES mergers splice these in and
/// rebase the rest of A's and B's entries around them.
pub struct HeadNodes {
    pub plane_idx: u32,
    pub node: Node,
    pub clipnodes: Vec<ClipNode>,
}

/// `this_node_count`/`this_clipnode_count` are A's node/clipnode counts
/// captured before this merge started mutating any lump.
pub fn build(
    a: &mut Bsp,
    b: &Bsp,
    plane: SeparatingPlane,
    this_node_count: u32,
    this_clipnode_count: u32,
) -> HeadNodes {
    let plane_idx = a.planes.len() as u32;
    a.planes.push(Plane {
        normal: plane.normal,
        distance: plane.distance,
        type_: axial_plane_type(plane.normal),
    });

    let (a_mins, a_maxs) = a.get_bounding_box();
    let (b_mins, b_maxs) = b.get_bounding_box();

    let b_root = this_node_count + 1;
    let a_root = 1u16;
    let children = if plane.swap {
        [a_root as i16, b_root as i16]
    } else {
        [b_root as i16, a_root as i16]
    };

    let node = Node {
        plane: plane_idx,
        children,
        mins: bbox_i16(a_mins.min(b_mins)),
        maxs: bbox_i16(a_maxs.max(b_maxs)),
        first_face: 0,
        face_count: 0,
    };

    let a_world = &a.models[0];
    let b_world = &b.models[0];

    let clipnodes = (0..HULL_COUNT - 1)
        .map(|h| {
            let hull = h + 1;
            let child_b =
                b_world.head_nodes[hull] + this_clipnode_count as i32 + (HULL_COUNT as i32 - 1);
            let child_a = a_world.head_nodes[hull] + (HULL_COUNT as i32 - 1);

            let children = if plane.swap {
                [child_a as i16, child_b as i16]
            } else {
                [child_b as i16, child_a as i16]
            };

            ClipNode {
                plane: plane_idx as i32,
                children,
            }
        })
        .collect();

    HeadNodes {
        plane_idx,
        node,
        clipnodes,
    }
}

/// The separating plane is always perfectly axis-aligned (the `Separator`
/// only ever returns a unit normal along x, y, or z), so it gets the exact
/// `PLANE_X/Y/Z` type rather than the general `AnyX/Y/Z` fallback.
fn axial_plane_type(normal: glam::Vec3) -> PlaneType {
    if normal.x != 0.0 {
        PlaneType::X
    } else if normal.y != 0.0 {
        PlaneType::Y
    } else {
        PlaneType::Z
    }
}

fn bbox_i16(v: glam::Vec3) -> [i16; 3] {
    [
        v.x.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16,
        v.y.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16,
        v.z.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16,
    ]
}

//! End-to-end exercises of `merge_pair`/`merge_all`/`pack` against small,
//! hand-built maps — there are no binary BSP fixtures available to this
//! repository, so these stand in for the teacher's round-trip-style tests
//! under `bsp/tests/`.

use bsp::error::MergeError;
use bsp::merge::{merge_all, merge_pair, pack};
use bsp::{
    Bsp, ClipNode, Entity, Leaf, LeafContent, Model, Node, Plane, PlaneType, Vec3,
};

/// A single-brush-box map: one plane, one BSP node splitting solid (leaf 0)
/// from a world leaf (leaf 1), and one trivial clipnode per hull so every
/// `head_nodes` slot is a real clipnode index rather than a raw sentinel.
fn tiny_world(name: &str) -> Bsp {
    let mut worldspawn = Entity::new();
    worldspawn.insert("classname".to_string(), "worldspawn".to_string());
    worldspawn.insert("origin".to_string(), "0 0 0".to_string());

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
        nodes: vec![Node {
            plane: 0,
            children: [!1i16, !0i16],
            mins: [-64, -64, -64],
            maxs: [64, 64, 64],
            first_face: 0,
            face_count: 0,
        }],
        texinfo: vec![],
        faces: vec![],
        lightmap: vec![],
        clipnodes: vec![
            ClipNode {
                plane: 0,
                children: [
                    LeafContent::ContentsEmpty as i16,
                    LeafContent::ContentsSolid as i16,
                ],
            };
            3
        ],
        leaves: vec![
            Leaf {
                contents: LeafContent::ContentsSolid,
                vis_offset: -1,
                mins: [0, 0, 0],
                maxs: [0, 0, 0],
                first_mark_surface: 0,
                mark_surface_count: 0,
                ambient_levels: [0, 0, 0, 0],
            },
            Leaf {
                contents: LeafContent::ContentsEmpty,
                vis_offset: -1,
                mins: [-64, -64, -64],
                maxs: [64, 64, 64],
                first_mark_surface: 0,
                mark_surface_count: 0,
                ambient_levels: [0, 0, 0, 0],
            },
        ],
        mark_surfaces: vec![],
        edges: vec![],
        surf_edges: vec![],
        models: vec![Model {
            mins: Vec3::splat(-64.0),
            maxs: Vec3::splat(64.0),
            origin: Vec3::ZERO,
            head_nodes: [0, 0, 1, 2],
            vis_leaves_count: 1,
            first_face: 0,
            face_count: 0,
        }],
    }
}

#[test]
fn self_merge_identity_up_to_head_node_prelude() {
    let mut a = tiny_world("a");
    let mut b = tiny_world("b");
    b.translate(Vec3::new(1024.0, 0.0, 0.0));

    let diagnostics = merge_pair(&mut a, &b).unwrap();

    assert!(diagnostics.is_empty());
    assert_eq!(a.leaves.len(), 3);
    assert_eq!(a.nodes.len(), 3);
    assert_eq!(a.clipnodes.len(), 9);
    assert_eq!(a.models[0].vis_leaves_count, 2);
}

#[test]
fn head_node_routes_to_each_sides_world_leaf() {
    let mut a = tiny_world("a");
    let mut b = tiny_world("b");
    b.translate(Vec3::new(1024.0, 0.0, 0.0));

    merge_pair(&mut a, &b).unwrap();

    // The separating plane is appended after planes dedup (2 distinct
    // planes survive, since translating b's plane moved its distance).
    assert_eq!(a.planes.len(), 3);
    assert_eq!(a.nodes[0].plane, 2);
    assert_eq!(a.nodes[0].children, [2, 1]);

    // child 2 is B's former root, routing to leaf 2 (B's world leaf) or
    // leaf 0 (shared solid); child 1 is A's former root, symmetric for A.
    assert_eq!(a.nodes[2].children, [!2i16, !0i16]);
    assert_eq!(a.nodes[1].children, [!1i16, !0i16]);
}

#[test]
fn overlapping_maps_are_rejected_without_mutation() {
    let mut a = tiny_world("a");
    let b = tiny_world("b");

    let err = merge_pair(&mut a, &b).unwrap_err();

    assert!(matches!(err, MergeError::NotSeparable));
    assert_eq!(a.leaves.len(), 2);
    assert_eq!(a.nodes.len(), 1);
}

#[test]
fn merge_all_folds_a_small_grid_into_one_map() {
    let maps: Vec<Bsp> = (0..4).map(|i| tiny_world(&format!("m{i}"))).collect();

    let (merged, diagnostics) = merge_all(maps, Vec3::splat(64.0)).unwrap();

    assert!(diagnostics.is_empty());
    assert_eq!(merged.leaves.len(), 5);
    assert_eq!(merged.nodes.len(), 7);
    assert_eq!(merged.clipnodes.len(), 21);
    assert_eq!(merged.models[0].vis_leaves_count, 4);
    assert_eq!(merged.models[0].head_nodes, [0, 0, 1, 2]);
}

#[test]
fn pack_then_merge_all_round_trips_through_bytes() {
    let maps: Vec<Bsp> = (0..3).map(|i| tiny_world(&format!("m{i}"))).collect();

    let (merged, _) = merge_all(maps, Vec3::splat(64.0)).unwrap();
    let bytes = merged.write_to_bytes();
    let reparsed = Bsp::from_bytes(&bytes).unwrap();

    assert_eq!(reparsed.leaves.len(), merged.leaves.len());
    assert_eq!(reparsed.nodes.len(), merged.nodes.len());
    assert_eq!(reparsed.clipnodes.len(), merged.clipnodes.len());
    assert_eq!(reparsed.planes.len(), merged.planes.len());
    assert_eq!(
        reparsed.models[0].vis_leaves_count,
        merged.models[0].vis_leaves_count
    );
}

#[test]
fn pack_alone_separates_overlapping_maps() {
    let mut maps: Vec<Bsp> = (0..8).map(|i| tiny_world(&format!("m{i}"))).collect();

    pack(&mut maps, Vec3::splat(64.0)).unwrap();

    for i in 0..maps.len() {
        for j in (i + 1)..maps.len() {
            let (a_min, a_max) = maps[i].get_bounding_box();
            let (b_min, b_max) = maps[j].get_bounding_box();
            let separated = a_min.x >= b_max.x
                || b_min.x >= a_max.x
                || a_min.y >= b_max.y
                || b_min.y >= a_max.y
                || a_min.z >= b_max.z
                || b_min.z >= a_max.z;
            assert!(separated, "maps {i} and {j} were not packed apart");
        }
    }
}

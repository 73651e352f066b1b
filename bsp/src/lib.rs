mod constants;
mod container;
pub mod error;
pub mod merge;
mod parser;
mod types;
mod utils;
mod writer;

pub use constants::*;
pub use parser::parse_bsp;
pub use types::Bsp;

pub use types::*;

pub use glam::Vec3;

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{Entity, Model};

    /// Builds the smallest `Bsp` that is internally consistent enough to
    /// round-trip through `write_to_bytes`/`parse_bsp`: one world model,
    /// a single plane/vertex/node/leaf, and no textures or visibility data.
    fn tiny_bsp(name: &str) -> Bsp {
        let mut worldspawn = Entity::new();
        worldspawn.insert("classname".to_string(), "worldspawn".to_string());

        Bsp {
            name: name.to_string(),
            entities: vec![worldspawn],
            planes: vec![Plane {
                normal: Vec3::new(1.0, 0.0, 0.0),
                distance: 0.0,
                type_: PlaneType::X,
            }],
            textures: vec![],
            vertices: vec![Vec3::new(0.0, 0.0, 0.0), Vec3::new(64.0, 0.0, 0.0)],
            visibility: vec![],
            nodes: vec![],
            texinfo: vec![],
            faces: vec![],
            lightmap: vec![],
            clipnodes: vec![],
            leaves: vec![Leaf {
                contents: LeafContent::ContentsEmpty,
                vis_offset: -1,
                mins: [-64, -64, -64],
                maxs: [64, 64, 64],
                first_mark_surface: 0,
                mark_surface_count: 0,
                ambient_levels: [0, 0, 0, 0],
            }],
            mark_surfaces: vec![],
            edges: vec![],
            surf_edges: vec![],
            models: vec![Model {
                mins: Vec3::new(-64.0, -64.0, -64.0),
                maxs: Vec3::new(64.0, 64.0, 64.0),
                origin: Vec3::ZERO,
                head_nodes: [-1, -1, -1, -1],
                vis_leaves_count: 1,
                first_face: 0,
                face_count: 0,
            }],
        }
    }

    #[test]
    fn write_then_parse_round_trips_lump_counts() {
        let bsp = tiny_bsp("roundtrip");
        let bytes = bsp.write_to_bytes();
        let reparsed = Bsp::from_bytes(&bytes).unwrap();

        assert_eq!(reparsed.planes.len(), bsp.planes.len());
        assert_eq!(reparsed.vertices.len(), bsp.vertices.len());
        assert_eq!(reparsed.leaves.len(), bsp.leaves.len());
        assert_eq!(reparsed.models.len(), bsp.models.len());
        assert_eq!(reparsed.entities.len(), bsp.entities.len());
        assert_eq!(
            reparsed.entities[0].get("classname").map(String::as_str),
            Some("worldspawn")
        );
    }
}

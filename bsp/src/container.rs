//! Operations on the in-memory [`Bsp`] container consumed by the merge engine:
//! bounding-box queries, translation, and the entity-lump round trip.
//!
//! `parse_bsp` already eagerly parses the ENTITIES lump into `Bsp::entities`
//! and `write_to_bytes` always regenerates the ENTITIES lump text block from
//! that same field, so `load_entities`/`update_entity_lump` are identity
//! operations here. They exist so the merge engine (`bsp::merge`) can call
//! them exactly the way the spec's `BspContainer` collaborator contract
//! describes, without caring whether a given implementation stores entities
//! lazily.

use glam::Vec3;

use crate::types::Bsp;

impl Bsp {
    /// Returns the world model's axis-aligned bounding box (mins, maxs).
    pub fn get_bounding_box(&self) -> (Vec3, Vec3) {
        let world = &self.models[0];
        (world.mins, world.maxs)
    }

    /// Translates every piece of geometry (and entity origins) by `delta`.
    ///
    /// This keeps the whole map internally consistent: vertices, plane
    /// distances, node/leaf/model bounding boxes, model origins, and any
    /// entity `origin` keyvalue all move together.
    pub fn translate(&mut self, delta: Vec3) {
        for vertex in &mut self.vertices {
            *vertex += delta;
        }

        for plane in &mut self.planes {
            plane.distance += plane.normal.dot(delta);
        }

        for model in &mut self.models {
            model.mins += delta;
            model.maxs += delta;
            model.origin += delta;
        }

        for node in &mut self.nodes {
            translate_bbox_i16(&mut node.mins, &mut node.maxs, delta);
        }

        for leaf in &mut self.leaves {
            translate_bbox_i16(&mut leaf.mins, &mut leaf.maxs, delta);
        }

        for entity in &mut self.entities {
            let Some(origin) = entity.get("origin") else {
                continue;
            };

            let parts: Vec<f32> = origin
                .split_whitespace()
                .filter_map(|p| p.parse::<f32>().ok())
                .collect();

            if parts.len() != 3 {
                continue;
            }

            let moved = Vec3::new(parts[0], parts[1], parts[2]) + delta;
            entity.insert(
                "origin".to_string(),
                format!("{} {} {}", moved.x, moved.y, moved.z),
            );
        }
    }

    /// No-op: entities are parsed eagerly by [`crate::parser::parse_bsp`].
    /// Kept for parity with the spec's `BspContainer` interface.
    pub fn load_entities(&mut self) {}

    /// No-op: [`Bsp::write_to_bytes`] always serialises the ENTITIES lump
    /// from `self.entities`. Kept for parity with the spec's `BspContainer`
    /// interface, and as the call site a merger should use after mutating
    /// `entities` in place.
    pub fn update_entity_lump(&mut self) {}
}

fn translate_bbox_i16(mins: &mut [i16; 3], maxs: &mut [i16; 3], delta: Vec3) {
    let delta = [delta.x, delta.y, delta.z];
    for axis in 0..3 {
        mins[axis] = clamp_to_i16(mins[axis] as f32 + delta[axis]);
        maxs[axis] = clamp_to_i16(maxs[axis] as f32 + delta[axis]);
    }
}

fn clamp_to_i16(v: f32) -> i16 {
    v.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{Entity, Model};

    fn minimal_bsp() -> Bsp {
        let mut model = Model {
            mins: Vec3::new(-64.0, -64.0, -64.0),
            maxs: Vec3::new(64.0, 64.0, 64.0),
            origin: Vec3::ZERO,
            head_nodes: [0, 0, 1, 2],
            vis_leaves_count: 0,
            first_face: 0,
            face_count: 0,
        };
        model.origin = Vec3::ZERO;

        let mut entity = Entity::new();
        entity.insert("classname".to_string(), "info_player_start".to_string());
        entity.insert("origin".to_string(), "0 0 0".to_string());

        Bsp {
            name: "test".to_string(),
            entities: vec![entity],
            planes: vec![],
            textures: vec![],
            vertices: vec![Vec3::new(1.0, 2.0, 3.0)],
            visibility: vec![],
            nodes: vec![],
            texinfo: vec![],
            faces: vec![],
            lightmap: vec![],
            clipnodes: vec![],
            leaves: vec![],
            mark_surfaces: vec![],
            edges: vec![],
            surf_edges: vec![],
            models: vec![model],
        }
    }

    #[test]
    fn bounding_box_reads_world_model() {
        let bsp = minimal_bsp();
        let (mins, maxs) = bsp.get_bounding_box();
        assert_eq!(mins, Vec3::new(-64.0, -64.0, -64.0));
        assert_eq!(maxs, Vec3::new(64.0, 64.0, 64.0));
    }

    #[test]
    fn translate_moves_everything_together() {
        let mut bsp = minimal_bsp();
        let delta = Vec3::new(512.0, 0.0, 0.0);
        bsp.translate(delta);

        let (mins, maxs) = bsp.get_bounding_box();
        assert_eq!(mins, Vec3::new(448.0, -64.0, -64.0));
        assert_eq!(maxs, Vec3::new(576.0, 64.0, 64.0));
        assert_eq!(bsp.vertices[0], Vec3::new(513.0, 2.0, 3.0));
        assert_eq!(bsp.entities[0]["origin"], "512 0 0");
    }
}

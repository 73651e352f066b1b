//! Per-lump fusion routines, run in the fixed order the data-dependency
//! graph demands: entities, planes, textures, vertices, edges, surfedges,
//! texinfo, faces, marksurfaces, leaves, (head nodes), nodes, clipnodes,
//! models, lighting. VIS runs last and lives in [`crate::merge::vis`].
//!
//! Every routine consumes `b` and mutates `a` in place, publishing whatever
//! remap table or count downstream routines need onto the shared
//! [`MergeContext`].

use crate::{
    constants::HULL_COUNT,
    merge::{context::MergeContext, headnode::HeadNodes},
    types::{Bsp, Model},
};

pub fn merge_entities(a: &mut Bsp, b: &Bsp) {
    let other_model_count = b.models.len() as i64;

    for entity in &mut a.entities {
        let Some(model) = entity.get("model").cloned() else {
            continue;
        };
        let Some(rewritten) = rewrite_brush_reference(&model, other_model_count - 1) else {
            continue;
        };
        entity.insert("model".to_string(), rewritten);
    }

    let a_wad = a
        .entities
        .iter()
        .position(|e| e.get("classname").map(String::as_str) == Some("worldspawn"));
    let b_wad = b
        .entities
        .iter()
        .find(|e| e.get("classname").map(String::as_str) == Some("worldspawn"))
        .and_then(|e| e.get("wad").cloned());

    if let (Some(a_idx), Some(b_wad)) = (a_wad, b_wad) {
        let a_wad_value = a.entities[a_idx].get("wad").cloned().unwrap_or_default();
        let merged = merge_wad_lists(&a_wad_value, &b_wad);
        a.entities[a_idx].insert("wad".to_string(), merged);
    }

    for entity in &b.entities {
        if entity.get("classname").map(String::as_str) == Some("worldspawn") {
            continue;
        }
        a.entities.push(entity.clone());
    }
}

fn rewrite_brush_reference(value: &str, delta: i64) -> Option<String> {
    let digits = value.strip_prefix('*')?;
    if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let n: i64 = digits.parse().ok()?;
    Some(format!("*{}", n + delta))
}

fn merge_wad_lists(a: &str, b: &str) -> String {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();

    for path in a.split(';').chain(b.split(';')) {
        let path = path.trim();
        if path.is_empty() {
            continue;
        }
        let basename = path.rsplit(['/', '\\']).next().unwrap_or(path);
        if seen.insert(basename.to_string()) {
            out.push(path.to_string());
        }
    }

    out.join(";")
}

pub fn merge_planes(a: &mut Bsp, b: &Bsp, ctx: &mut MergeContext) {
    ctx.plane_remap = Vec::with_capacity(b.planes.len());

    for plane in &b.planes {
        if let Some(idx) = a.planes.iter().position(|p| p == plane) {
            ctx.plane_remap.push(idx as u32);
        } else {
            ctx.plane_remap.push(a.planes.len() as u32);
            a.planes.push(plane.clone());
        }
    }
}

pub fn merge_textures(a: &mut Bsp, b: &Bsp, ctx: &mut MergeContext) {
    let mut a_bytes: Vec<Vec<u8>> = a.textures.iter().map(|t| t.to_bytes()).collect();
    ctx.tex_remap = Vec::with_capacity(b.textures.len());

    for tex in &b.textures {
        let bytes = tex.to_bytes();
        if let Some(idx) = a_bytes.iter().position(|t| *t == bytes) {
            ctx.tex_remap.push(idx as u32);
        } else {
            ctx.tex_remap.push(a.textures.len() as u32);
            a.textures.push(tex.clone());
            a_bytes.push(bytes);
        }
    }
}

pub fn merge_vertices(a: &mut Bsp, b: &Bsp, ctx: &mut MergeContext) {
    ctx.this_vert_count = a.vertices.len() as u32;
    a.vertices.extend(b.vertices.iter().copied());
}

pub fn merge_edges(a: &mut Bsp, b: &Bsp, ctx: &mut MergeContext) {
    ctx.this_edge_count = a.edges.len() as u32;
    let shift = ctx.this_vert_count as u16;

    for edge in &b.edges {
        a.edges.push([edge[0] + shift, edge[1] + shift]);
    }
}

pub fn merge_surfedges(a: &mut Bsp, b: &Bsp, ctx: &mut MergeContext) {
    ctx.this_surfedge_count = a.surf_edges.len() as u32;
    let shift = ctx.this_edge_count as i32;

    for &s in &b.surf_edges {
        a.surf_edges.push(if s < 0 { s - shift } else { s + shift });
    }
}

pub fn merge_texinfo(a: &mut Bsp, b: &Bsp, ctx: &mut MergeContext) {
    ctx.texinfo_remap = Vec::with_capacity(b.texinfo.len());

    for ti in &b.texinfo {
        let mut rewritten = ti.clone();
        rewritten.texture_index = ctx.tex_remap[ti.texture_index as usize];

        if let Some(idx) = a.texinfo.iter().position(|t| *t == rewritten) {
            ctx.texinfo_remap.push(idx as u32);
        } else {
            ctx.texinfo_remap.push(a.texinfo.len() as u32);
            a.texinfo.push(rewritten);
        }
    }
}

pub fn merge_faces(a: &mut Bsp, b: &Bsp, ctx: &mut MergeContext) {
    ctx.this_face_count = a.faces.len() as u32;

    for face in &b.faces {
        let mut f = face.clone();
        f.plane = ctx.plane_remap[face.plane as usize] as u16;
        f.first_edge += ctx.this_surfedge_count as i32;
        f.texinfo = ctx.texinfo_remap[face.texinfo as usize] as u16;
        a.faces.push(f);
    }
}

pub fn merge_marksurfaces(a: &mut Bsp, b: &Bsp, ctx: &mut MergeContext) {
    ctx.this_marksurf_count = a.mark_surfaces.len() as u32;
    let shift = ctx.this_face_count;

    for &ms in &b.mark_surfaces {
        a.mark_surfaces.push(ms + shift as u16);
    }
}

pub fn merge_leaves(a: &mut Bsp, b: &Bsp, ctx: &mut MergeContext) {
    ctx.this_world_leaf_count = a.models[0].vis_leaves_count as u32;
    ctx.this_leaf_count = a.leaves.len() as u32;
    ctx.other_world_leaf_count = b.models[0].vis_leaves_count as u32;
    ctx.other_leaf_count = b.leaves.len() as u32 - 1;

    let this_world_leaf_count = ctx.this_world_leaf_count as usize;
    let this_leaf_count = ctx.this_leaf_count as usize;

    ctx.leaves_remap = vec![0u16; b.leaves.len()];
    ctx.model_leaf_remap = vec![0u16; this_leaf_count];

    let mut new_leaves = Vec::with_capacity(this_leaf_count + b.leaves.len() - 1);
    new_leaves.push(a.leaves[0].clone());

    for i in 1..=this_world_leaf_count {
        ctx.model_leaf_remap[i] = new_leaves.len() as u16;
        new_leaves.push(a.leaves[i].clone());
    }

    for (i, leaf) in b.leaves.iter().enumerate() {
        if i == 0 {
            ctx.leaves_remap[0] = 0;
            continue;
        }
        let mut nl = leaf.clone();
        if nl.mark_surface_count > 0 {
            nl.first_mark_surface += ctx.this_marksurf_count as u16;
        }
        ctx.leaves_remap[i] = new_leaves.len() as u16;
        new_leaves.push(nl);
    }

    for i in (this_world_leaf_count + 1)..this_leaf_count {
        ctx.model_leaf_remap[i] = new_leaves.len() as u16;
        new_leaves.push(a.leaves[i].clone());
    }

    a.leaves = new_leaves;
}

pub fn merge_nodes(a: &mut Bsp, b: &Bsp, ctx: &MergeContext, head: &HeadNodes) {
    let this_node_count = ctx.this_node_count as i16;

    let mut new_nodes = Vec::with_capacity(1 + a.nodes.len() + b.nodes.len());
    new_nodes.push(head.node.clone());

    for node in &a.nodes {
        let mut n = node.clone();
        for c in &mut n.children {
            if *c >= 0 {
                *c += 1;
            } else {
                let leaf_idx = (!*c) as usize;
                *c = !(ctx.model_leaf_remap[leaf_idx] as i16);
            }
        }
        new_nodes.push(n);
    }

    for node in &b.nodes {
        let mut n = node.clone();
        n.plane = ctx.plane_remap[node.plane as usize];
        for c in &mut n.children {
            if *c >= 0 {
                *c += this_node_count + 1;
            } else {
                let leaf_idx = (!*c) as usize;
                *c = !(ctx.leaves_remap[leaf_idx] as i16);
            }
        }
        if n.face_count > 0 {
            n.first_face += ctx.this_face_count as u16;
        }
        new_nodes.push(n);
    }

    a.nodes = new_nodes;
}

pub fn merge_clipnodes(a: &mut Bsp, b: &Bsp, ctx: &MergeContext, head: &HeadNodes) {
    let this_clipnode_count = ctx.this_clipnode_count as i16;

    let mut new_clipnodes =
        Vec::with_capacity(head.clipnodes.len() + a.clipnodes.len() + b.clipnodes.len());
    new_clipnodes.extend(head.clipnodes.iter().cloned());

    for clipnode in &a.clipnodes {
        let mut n = clipnode.clone();
        for c in &mut n.children {
            if *c >= 0 {
                *c += HULL_COUNT as i16 - 1;
            }
        }
        new_clipnodes.push(n);
    }

    // B's clipnodes land after the prepended head clipnodes *and* A's
    // (now-shifted) clipnodes, so B's own positive children need both
    // accounted for, not just `this_clipnode_count`.
    let b_shift = this_clipnode_count + (HULL_COUNT as i16 - 1);

    for clipnode in &b.clipnodes {
        let mut n = clipnode.clone();
        n.plane = ctx.plane_remap[clipnode.plane as usize] as i32;
        for c in &mut n.children {
            if *c >= 0 {
                *c += b_shift;
            }
        }
        new_clipnodes.push(n);
    }

    a.clipnodes = new_clipnodes;
}

pub fn merge_models(a: &mut Bsp, b: &Bsp, ctx: &MergeContext) {
    let a_world = a.models[0].clone();
    let b_world = b.models[0].clone();

    let mut new_models = Vec::with_capacity(1 + a.models.len() + b.models.len() - 2);
    new_models.push(a_world.clone());

    // Same post-head-prepend offset `merge_clipnodes` shifts B's clipnodes
    // by: B's clip-hull trees now live after the head clipnodes and all of
    // A's clipnodes.
    let b_clipnode_shift = ctx.this_clipnode_count as i32 + (HULL_COUNT as i32 - 1);

    for model in b.models.iter().skip(1) {
        let mut m = model.clone();
        m.head_nodes[0] += ctx.this_node_count as i32 + 1;
        for h in 1..HULL_COUNT {
            m.head_nodes[h] += b_clipnode_shift;
        }
        m.first_face += ctx.this_face_count as i32;
        new_models.push(m);
    }

    for model in a.models.clone().iter().skip(1) {
        let mut m = model.clone();
        m.head_nodes[0] += 1;
        for h in 1..HULL_COUNT {
            m.head_nodes[h] += HULL_COUNT as i32 - 1;
        }
        new_models.push(m);
    }

    new_models[0] = Model {
        mins: a_world.mins.min(b_world.mins),
        maxs: a_world.maxs.max(b_world.maxs),
        origin: a_world.origin,
        head_nodes: [0, 0, 1, 2],
        vis_leaves_count: a_world.vis_leaves_count + b_world.vis_leaves_count,
        first_face: a_world.first_face,
        face_count: a_world.face_count + b_world.face_count,
    };

    a.models = new_models;
}

pub fn merge_lighting(a: &mut Bsp, b: &Bsp, ctx: &mut MergeContext) {
    use crate::constants::MAX_SURFACE_EXTENT;

    let fullbright_len = MAX_SURFACE_EXTENT * MAX_SURFACE_EXTENT;
    let this_face_count = ctx.this_face_count as usize;

    let mut a_light = std::mem::take(&mut a.lightmap);
    let mut b_light = b.lightmap.clone();

    if a_light.is_empty() && !b_light.is_empty() {
        a_light = vec![[255u8, 255, 255]; fullbright_len];
        for face in a.faces.iter_mut().take(this_face_count) {
            face.lightmap_offset = 0;
        }
    } else if !a_light.is_empty() && b_light.is_empty() {
        b_light = vec![[255u8, 255, 255]; fullbright_len];
        for face in a.faces.iter_mut().skip(this_face_count) {
            face.lightmap_offset = 0;
        }
    }

    ctx.this_lighting_len = a_light.len() * 3;

    let mut merged = a_light;
    merged.extend(b_light);

    for face in a.faces.iter_mut().skip(this_face_count) {
        face.lightmap_offset += ctx.this_lighting_len as i32;
    }

    a.lightmap = merged;
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{ClipNode, LeafContent, Node};
    use glam::Vec3;

    fn empty_bsp() -> Bsp {
        Bsp {
            name: String::new(),
            entities: vec![],
            planes: vec![],
            textures: vec![],
            vertices: vec![],
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
            models: vec![],
        }
    }

    fn dummy_head(plane_idx: u32) -> HeadNodes {
        HeadNodes {
            plane_idx,
            node: Node {
                plane: plane_idx,
                children: [0, 0],
                mins: [0, 0, 0],
                maxs: [0, 0, 0],
                first_face: 0,
                face_count: 0,
            },
            clipnodes: vec![
                ClipNode {
                    plane: plane_idx as i32,
                    children: [0, 0],
                };
                HULL_COUNT - 1
            ],
        }
    }

    /// Regression test: B's clipnodes are spliced in *after* both the
    /// prepended head clipnodes and all of A's (shifted) clipnodes, so a
    /// positive child within one of B's own clipnodes must be shifted past
    /// both, not just past A's original clipnode count.
    #[test]
    fn merge_clipnodes_shifts_b_children_past_head_and_a() {
        let mut a = empty_bsp();
        a.clipnodes = vec![
            ClipNode {
                plane: 0,
                children: [
                    LeafContent::ContentsEmpty as i16,
                    LeafContent::ContentsSolid as i16,
                ],
            };
            2
        ];

        let mut b = empty_bsp();
        b.clipnodes = vec![ClipNode {
            plane: 0,
            children: [1, LeafContent::ContentsSolid as i16],
        }];

        let ctx = MergeContext {
            this_clipnode_count: a.clipnodes.len() as u32,
            plane_remap: vec![0],
            ..MergeContext::new()
        };
        let head = dummy_head(0);

        merge_clipnodes(&mut a, &b, &ctx, &head);

        assert_eq!(a.clipnodes.len(), (HULL_COUNT - 1) + 2 + 1);

        let b_shift = ctx.this_clipnode_count as i16 + (HULL_COUNT as i16 - 1);
        let spliced = &a.clipnodes[(HULL_COUNT - 1) + 2];
        assert_eq!(spliced.children[0], 1 + b_shift);
        assert_eq!(spliced.children[1], LeafContent::ContentsSolid as i16);
    }

    /// Regression test: a B submodel's clip-hull head nodes must be shifted
    /// by the same post-head-prepend offset `merge_clipnodes` uses for B's
    /// clipnodes, not just `this_clipnode_count`.
    #[test]
    fn merge_models_shifts_b_submodel_clip_hulls() {
        let mut a = empty_bsp();
        a.models = vec![Model {
            mins: Vec3::ZERO,
            maxs: Vec3::ZERO,
            origin: Vec3::ZERO,
            head_nodes: [0, 0, 1, 2],
            vis_leaves_count: 0,
            first_face: 0,
            face_count: 0,
        }];

        let mut b = empty_bsp();
        b.models = vec![
            Model {
                mins: Vec3::ZERO,
                maxs: Vec3::ZERO,
                origin: Vec3::ZERO,
                head_nodes: [0, 0, 1, 2],
                vis_leaves_count: 0,
                first_face: 0,
                face_count: 0,
            },
            Model {
                mins: Vec3::ZERO,
                maxs: Vec3::ZERO,
                origin: Vec3::ZERO,
                head_nodes: [0, 0, 0, 0],
                vis_leaves_count: 0,
                first_face: 0,
                face_count: 0,
            },
        ];

        let ctx = MergeContext {
            this_node_count: 4,
            this_clipnode_count: 2,
            ..MergeContext::new()
        };

        merge_models(&mut a, &b, &ctx);

        assert_eq!(a.models.len(), 2);
        let sub = &a.models[1];
        assert_eq!(sub.head_nodes[0], ctx.this_node_count as i32 + 1);

        let b_clipnode_shift = ctx.this_clipnode_count as i32 + (HULL_COUNT as i32 - 1);
        assert_eq!(sub.head_nodes[1], b_clipnode_shift);
        assert_eq!(sub.head_nodes[2], b_clipnode_shift);
        assert_eq!(sub.head_nodes[3], b_clipnode_shift);
    }

    #[test]
    fn brush_reference_rewrite() {
        assert_eq!(rewrite_brush_reference("*3", 4), Some("*7".to_string()));
        assert_eq!(rewrite_brush_reference("light", 4), None);
        assert_eq!(rewrite_brush_reference("*", 4), None);
    }

    #[test]
    fn wad_list_dedupes_by_basename() {
        let merged = merge_wad_lists(
            "/valve/cstrike.wad;/valve/other.wad",
            "../other.wad;../extra.wad",
        );
        assert_eq!(merged, "/valve/cstrike.wad;/valve/other.wad;../extra.wad");
    }
}

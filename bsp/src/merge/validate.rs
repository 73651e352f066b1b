//! Post-merge validation: every index field must resolve into its target
//! lump, and every lump must stay within the format's hard limits. Runs once
//! at the end of [`crate::merge::merge_pair`], turning what the original
//! merger only risked crashing the engine over into typed, caught errors.

use crate::{
    constants::{
        MAX_MAP_CLIPNODES, MAX_MAP_EDGES, MAX_MAP_FACES, MAX_MAP_LEAFS, MAX_MAP_MARKSURFACES,
        MAX_MAP_NODES, MAX_MAP_PLANES, MAX_MAP_SURFEDGES, MAX_MAP_TEXINFO, MAX_MAP_VERTS,
    },
    error::{Lump, MergeError},
    types::Bsp,
};

macro_rules! check_limit {
    ($len:expr, $max:expr, $lump:expr) => {
        if $len > $max {
            return Err(MergeError::LimitExceeded { lump: $lump });
        }
    };
}

macro_rules! corrupt {
    ($lump:expr, $($arg:tt)*) => {
        MergeError::LumpCorrupt {
            lump: $lump,
            detail: format!($($arg)*),
        }
    };
}

/// Checks every merged lump against the format's hard maximum and every
/// cross-lump index field against the lump it is supposed to address.
pub fn validate(a: &Bsp) -> Result<(), MergeError> {
    check_limit!(a.planes.len(), MAX_MAP_PLANES, Lump::Planes);
    check_limit!(a.vertices.len(), MAX_MAP_VERTS, Lump::Vertices);
    check_limit!(a.edges.len(), MAX_MAP_EDGES, Lump::Edges);
    check_limit!(a.surf_edges.len(), MAX_MAP_SURFEDGES, Lump::SurfEdges);
    check_limit!(a.texinfo.len(), MAX_MAP_TEXINFO, Lump::TexInfo);
    check_limit!(a.faces.len(), MAX_MAP_FACES, Lump::Faces);
    check_limit!(
        a.mark_surfaces.len(),
        MAX_MAP_MARKSURFACES,
        Lump::MarkSurfaces
    );
    check_limit!(a.nodes.len(), MAX_MAP_NODES, Lump::Nodes);
    check_limit!(a.clipnodes.len(), MAX_MAP_CLIPNODES, Lump::ClipNodes);
    check_limit!(a.leaves.len(), MAX_MAP_LEAFS, Lump::Leaves);

    for edge in &a.edges {
        for &v in edge {
            if v as usize >= a.vertices.len() {
                return Err(corrupt!(
                    Lump::Edges,
                    "edge references vertex {v}, but only {} vertices exist",
                    a.vertices.len()
                ));
            }
        }
    }

    for &s in &a.surf_edges {
        if s == 0 || s.unsigned_abs() as usize >= a.edges.len() {
            return Err(corrupt!(
                Lump::SurfEdges,
                "surfedge {s} does not index into {} edges",
                a.edges.len()
            ));
        }
    }

    for ti in &a.texinfo {
        if ti.texture_index as usize >= a.textures.len() {
            return Err(corrupt!(
                Lump::TexInfo,
                "texinfo references miptex {}, but only {} textures exist",
                ti.texture_index,
                a.textures.len()
            ));
        }
    }

    for face in &a.faces {
        if face.plane as usize >= a.planes.len() {
            return Err(corrupt!(
                Lump::Faces,
                "face references plane {}, but only {} planes exist",
                face.plane,
                a.planes.len()
            ));
        }
        if face.texinfo as usize >= a.texinfo.len() {
            return Err(corrupt!(
                Lump::Faces,
                "face references texinfo {}, but only {} texinfo entries exist",
                face.texinfo,
                a.texinfo.len()
            ));
        }
        let end = face.first_edge as i64 + face.edge_count as i64;
        if face.first_edge < 0 || end > a.surf_edges.len() as i64 {
            return Err(corrupt!(
                Lump::Faces,
                "face surfedge range [{}, {}) overruns {} surfedges",
                face.first_edge,
                end,
                a.surf_edges.len()
            ));
        }
    }

    for &ms in &a.mark_surfaces {
        if ms as usize >= a.faces.len() {
            return Err(corrupt!(
                Lump::MarkSurfaces,
                "marksurface references face {ms}, but only {} faces exist",
                a.faces.len()
            ));
        }
    }

    for leaf in &a.leaves {
        if leaf.mark_surface_count > 0 {
            let end = leaf.first_mark_surface as usize + leaf.mark_surface_count as usize;
            if end > a.mark_surfaces.len() {
                return Err(corrupt!(
                    Lump::Leaves,
                    "leaf marksurface range [{}, {}) overruns {} marksurfaces",
                    leaf.first_mark_surface,
                    end,
                    a.mark_surfaces.len()
                ));
            }
        }
    }

    for node in &a.nodes {
        if node.plane as usize >= a.planes.len() {
            return Err(corrupt!(
                Lump::Nodes,
                "node references plane {}, but only {} planes exist",
                node.plane,
                a.planes.len()
            ));
        }
        for &c in &node.children {
            if c >= 0 {
                if c as usize >= a.nodes.len() {
                    return Err(corrupt!(
                        Lump::Nodes,
                        "node child {c} is not a valid node index ({} nodes)",
                        a.nodes.len()
                    ));
                }
            } else {
                let leaf_idx = !c as usize;
                if leaf_idx >= a.leaves.len() {
                    return Err(corrupt!(
                        Lump::Nodes,
                        "node child resolves to leaf {leaf_idx}, but only {} leaves exist",
                        a.leaves.len()
                    ));
                }
            }
        }
        if node.face_count > 0 {
            let end = node.first_face as usize + node.face_count as usize;
            if end > a.faces.len() {
                return Err(corrupt!(
                    Lump::Nodes,
                    "node face range [{}, {}) overruns {} faces",
                    node.first_face,
                    end,
                    a.faces.len()
                ));
            }
        }
    }

    for clipnode in &a.clipnodes {
        if clipnode.plane as usize >= a.planes.len() {
            return Err(corrupt!(
                Lump::ClipNodes,
                "clipnode references plane {}, but only {} planes exist",
                clipnode.plane,
                a.planes.len()
            ));
        }
        for &c in &clipnode.children {
            if c >= 0 && c as usize >= a.clipnodes.len() {
                return Err(corrupt!(
                    Lump::ClipNodes,
                    "clipnode child {c} is not a valid clipnode index ({} clipnodes)",
                    a.clipnodes.len()
                ));
            }
        }
    }

    for model in &a.models {
        if model.first_face < 0 || model.face_count < 0 {
            return Err(corrupt!(Lump::Models, "model has a negative face range"));
        }
        let end = model.first_face as usize + model.face_count as usize;
        if end > a.faces.len() {
            return Err(corrupt!(
                Lump::Models,
                "model face range [{}, {}) overruns {} faces",
                model.first_face,
                end,
                a.faces.len()
            ));
        }
    }

    Ok(())
}

//! Remap tables and pre-mutation counts threaded through a single `merge_pair`
//! call.
//!
//! The original merger keeps this state as mutable fields on the merger
//! object, written by one lump routine and read by a later one. Here it is
//! an explicit value built up by each stage of [`crate::merge::merge_pair`]
//! and passed to the next — nothing outlives the call.

/// Index remap tables and captured "before mutation" counts published by
/// the per-lump mergers in `bsp::merge::lumps`, consumed by later lumps in
/// the fixed merge order.
#[derive(Debug, Default)]
pub struct MergeContext {
    /// `plane_remap[i]` = index in merged A's planes that B's plane `i` maps to.
    pub plane_remap: Vec<u32>,
    /// `tex_remap[i]` = index in merged A's textures that B's miptex `i` maps to.
    pub tex_remap: Vec<u32>,
    /// `texinfo_remap[i]` = index in merged A's texinfo that B's texinfo `i` maps to.
    pub texinfo_remap: Vec<u32>,
    /// `leaves_remap[i]` = index in merged A's leaves that B's leaf `i` maps to.
    pub leaves_remap: Vec<u16>,
    /// `model_leaf_remap[i]` = index in merged A's leaves that A's leaf `i`
    /// (pre-merge) ends up at once B's world leaves are spliced in.
    pub model_leaf_remap: Vec<u16>,

    /// A's counts captured before any lump is mutated.
    pub this_vert_count: u32,
    pub this_edge_count: u32,
    pub this_surfedge_count: u32,
    pub this_face_count: u32,
    pub this_marksurf_count: u32,
    pub this_node_count: u32,
    pub this_clipnode_count: u32,
    pub this_world_leaf_count: u32,
    pub this_leaf_count: u32,

    /// B's counts captured before any lump is mutated.
    pub other_world_leaf_count: u32,
    /// B's leaf count minus the shared solid leaf (leaf 0).
    pub other_leaf_count: u32,

    /// Byte length of A's LIGHTING lump before the LIGHTING merge concatenates B's.
    pub this_lighting_len: usize,

    /// Non-fatal conditions accumulated over the merge.
    pub diagnostics: Vec<crate::error::Diagnostic>,
}

impl MergeContext {
    pub fn new() -> Self {
        Self::default()
    }
}

//! Drives a full merge of N compiled BSP maps into one: pack them onto a
//! grid so no two bounding boxes overlap, then fold pairs together in the
//! fixed per-lump order (§4.5) with the VIS merge (§4.6) running last, the
//! same shape `BspMerger.cpp`'s `MergeMaps`/`MergeAllMaps` pair walks the
//! grid in.
//!
//! `merge_pair` is the unit of work; `merge_all` (and its progress/cancel
//! aware sibling `merge_all_with`) is the orchestrator that walks rows,
//! then layers, then the whole grid, per §2 item 7 and §6.

pub mod context;
pub mod headnode;
pub mod lumps;
pub mod pack;
pub mod separate;
mod validate;
pub mod vis;

use std::time::{Duration, Instant};

use glam::Vec3;
use log::{info, warn};

use crate::{
    error::{Diagnostic, MergeError},
    types::Bsp,
};

pub use context::MergeContext;
pub use pack::pack;
pub use separate::{separate, SeparatingPlane};

/// Minimum spacing between two progress callback invocations (§5).
pub const PROGRESS_INTERVAL: Duration = Duration::from_millis(16);

/// `(stage_name, completed, total)`.
pub type ProgressFn<'a> = dyn FnMut(&str, usize, usize) + 'a;

/// Fuses `b`'s lumps into `a` in place, following the fixed merge order of
/// §4.5 (ENTITIES..MODELS) and the VIS merge of §4.6. `a` and `b` must
/// already be positioned so their bounding boxes are separable by an
/// axis-aligned plane (see [`pack`] / [`separate`]).
///
/// On success returns the non-fatal diagnostics accumulated during the
/// merge (currently only [`Diagnostic::VisOverflow`]). On a fatal error `a`
/// is left in an indeterminate state and must be discarded by the caller —
/// each lump is swapped in as a complete replacement, so there is nothing
/// to roll back, only a container no longer safe to use.
pub fn merge_pair(a: &mut Bsp, b: &Bsp) -> Result<Vec<Diagnostic>, MergeError> {
    let plane = separate(a.get_bounding_box(), b.get_bounding_box())?;

    let orig_a_leaves = a.leaves.clone();
    let orig_a_vis = a.visibility.clone();

    let mut ctx = MergeContext::new();
    ctx.this_node_count = a.nodes.len() as u32;
    ctx.this_clipnode_count = a.clipnodes.len() as u32;

    lumps::merge_entities(a, b);
    lumps::merge_planes(a, b, &mut ctx);
    lumps::merge_textures(a, b, &mut ctx);
    lumps::merge_vertices(a, b, &mut ctx);
    lumps::merge_edges(a, b, &mut ctx);
    lumps::merge_surfedges(a, b, &mut ctx);
    lumps::merge_texinfo(a, b, &mut ctx);
    lumps::merge_faces(a, b, &mut ctx);
    lumps::merge_marksurfaces(a, b, &mut ctx);
    lumps::merge_leaves(a, b, &mut ctx);

    let head = headnode::build(a, b, plane, ctx.this_node_count, ctx.this_clipnode_count);

    lumps::merge_nodes(a, b, &ctx, &head);
    lumps::merge_clipnodes(a, b, &ctx, &head);
    lumps::merge_models(a, b, &ctx);
    lumps::merge_lighting(a, b, &mut ctx);

    vis::merge_vis(a, b, &mut ctx, &orig_a_leaves, &orig_a_vis);

    for diagnostic in &ctx.diagnostics {
        warn!("{} ∪ {}: {diagnostic}", a.name, b.name);
    }

    validate::validate(a)?;

    Ok(ctx.diagnostics)
}

/// Packs `maps` and folds them all into `maps[0]`, merging +X rows first,
/// then rows into layers along +Y, then layers along +Z, as item 7 of §2
/// describes. No progress reporting and no cancellation — see
/// [`merge_all_with`] for that.
pub fn merge_all(maps: Vec<Bsp>, gap: Vec3) -> Result<(Bsp, Vec<Diagnostic>), MergeError> {
    merge_all_with(maps, gap, &mut |_, _, _| {}, &|| false)
}

/// As [`merge_all`], but invokes `on_progress(stage, completed, total)` at
/// intervals of at least [`PROGRESS_INTERVAL`], and aborts with
/// [`MergeError::Cancelled`] the next time `is_cancelled` reports true — the
/// single suspension point item 5 of §5 describes. The in-flight `a` of
/// whichever pair was merging is discarded; nothing partially merged is
/// ever handed back to the caller.
pub fn merge_all_with(
    mut maps: Vec<Bsp>,
    gap: Vec3,
    on_progress: &mut ProgressFn<'_>,
    is_cancelled: &dyn Fn() -> bool,
) -> Result<(Bsp, Vec<Diagnostic>), MergeError> {
    if maps.is_empty() {
        return Err(MergeError::NotSeparable);
    }
    if maps.len() == 1 {
        return Ok((maps.remove(0), Vec::new()));
    }

    let n = maps.len();
    info!("packing {n} maps");
    pack(&mut maps, gap)?;

    let k = pack::grid_size(n);
    let grid_pos = |i: usize| (i % k, (i / k) % k, i / (k * k));

    let total = n - 1;
    let mut completed = 0usize;
    let mut last_tick = Instant::now()
        .checked_sub(PROGRESS_INTERVAL)
        .unwrap_or_else(Instant::now);
    let mut diagnostics = Vec::new();

    let mut tick = |stage: &str,
                    completed: usize,
                    last_tick: &mut Instant,
                    on_progress: &mut ProgressFn<'_>| {
        let now = Instant::now();
        if completed == total || now.duration_since(*last_tick) >= PROGRESS_INTERVAL {
            on_progress(stage, completed, total);
            *last_tick = now;
        }
    };

    // Bucket original (pre-merge) indices by (y, z) row, x ascending.
    let mut rows: std::collections::BTreeMap<(usize, usize), Vec<usize>> =
        std::collections::BTreeMap::new();
    for i in 0..n {
        let (x, y, z) = grid_pos(i);
        rows.entry((y, z)).or_default().push(x);
    }
    for row in rows.values_mut() {
        row.sort_unstable();
    }

    // Fold each row along X, leaving row-merged maps in place of maps[row[0]].
    let mut row_heads: std::collections::BTreeMap<(usize, usize), usize> =
        std::collections::BTreeMap::new();
    for ((y, z), xs) in &rows {
        let base_i = y * k + z * k * k; // index of x == 0 in this row, if present
        let head_idx = xs[0] + base_i;
        row_heads.insert((*y, *z), head_idx);

        for &x in xs.iter().skip(1) {
            if is_cancelled() {
                return Err(MergeError::Cancelled);
            }
            let other_idx = x + base_i;
            let (lo, hi) = if head_idx < other_idx {
                (head_idx, other_idx)
            } else {
                (other_idx, head_idx)
            };
            let (left, right) = maps.split_at_mut(hi);
            let other = std::mem::replace(
                &mut right[0],
                placeholder(),
            );
            let more = merge_pair(&mut left[lo], &other)?;
            diagnostics.extend(more);

            completed += 1;
            tick("merge-x", completed, &mut last_tick, &mut *on_progress);
        }
    }

    // Fold row heads into layer heads along Y.
    let mut layers: std::collections::BTreeMap<usize, Vec<usize>> = std::collections::BTreeMap::new();
    for ((_y, z), head_idx) in &row_heads {
        layers.entry(*z).or_default().push(*head_idx);
    }
    for heads in layers.values_mut() {
        heads.sort_unstable();
    }

    let mut layer_heads: Vec<usize> = Vec::new();
    for heads in layers.values() {
        let head_idx = heads[0];
        for &other_idx in heads.iter().skip(1) {
            if is_cancelled() {
                return Err(MergeError::Cancelled);
            }
            let (lo, hi) = if head_idx < other_idx {
                (head_idx, other_idx)
            } else {
                (other_idx, head_idx)
            };
            let (left, right) = maps.split_at_mut(hi);
            let other = std::mem::replace(&mut right[0], placeholder());
            let more = merge_pair(&mut left[lo], &other)?;
            diagnostics.extend(more);

            completed += 1;
            tick("merge-y", completed, &mut last_tick, &mut *on_progress);
        }
        layer_heads.push(head_idx);
    }

    layer_heads.sort_unstable();

    // Fold layer heads along Z into a single map.
    let final_idx = layer_heads[0];
    for &other_idx in layer_heads.iter().skip(1) {
        if is_cancelled() {
            return Err(MergeError::Cancelled);
        }
        let (lo, hi) = if final_idx < other_idx {
            (final_idx, other_idx)
        } else {
            (other_idx, final_idx)
        };
        let (left, right) = maps.split_at_mut(hi);
        let other = std::mem::replace(&mut right[0], placeholder());
        let more = merge_pair(&mut left[lo], &other)?;
        diagnostics.extend(more);

        completed += 1;
        tick("merge-z", completed, &mut last_tick, &mut *on_progress);
    }

    let result = maps.swap_remove(final_idx);
    info!("merged {n} maps into one ({} diagnostics)", diagnostics.len());
    Ok((result, diagnostics))
}

/// An empty, already-consumed stand-in swapped into `maps` where a merged
/// source map used to live, so the vector stays indexable without shifting
/// everything after it.
fn placeholder() -> Bsp {
    Bsp {
        name: String::new(),
        entities: Vec::new(),
        planes: Vec::new(),
        textures: Vec::new(),
        vertices: Vec::new(),
        visibility: Vec::new(),
        nodes: Vec::new(),
        texinfo: Vec::new(),
        faces: Vec::new(),
        lightmap: Vec::new(),
        clipnodes: Vec::new(),
        leaves: Vec::new(),
        mark_surfaces: Vec::new(),
        edges: Vec::new(),
        surf_edges: Vec::new(),
        models: Vec::new(),
    }
}

//! PVS (Potentially Visible Set) merger: decompresses both maps' run-length
//! encoded visibility bitsets into a single uncompressed matrix sized for
//! the union leaf count, shifts bit-ranges to make room for the spliced-in
//! leaves, then recompresses.

use crate::{error::Diagnostic, merge::context::MergeContext, types::Bsp};

fn row_bytes_for(visible_leaves: usize) -> usize {
    visible_leaves.div_ceil(64) * 8
}

fn mask_trailing(row: &mut [u8], bits: usize) {
    let full_bytes = bits / 8;
    let rem = bits % 8;

    if rem > 0 {
        if full_bytes < row.len() {
            row[full_bytes] &= (1u8 << rem) - 1;
        }
        for b in row.iter_mut().skip(full_bytes + 1) {
            *b = 0;
        }
    } else {
        for b in row.iter_mut().skip(full_bytes) {
            *b = 0;
        }
    }
}

fn decompress_row(vis: &[u8], vis_offset: i32, old_row_bytes: usize, old_visible_leaves: usize) -> Vec<u8> {
    if vis_offset < 0 {
        let mut row = vec![0xFFu8; old_row_bytes];
        mask_trailing(&mut row, old_visible_leaves);
        return row;
    }

    let mut out = Vec::with_capacity(old_row_bytes);
    let mut i = vis_offset as usize;

    while out.len() < old_row_bytes && i < vis.len() {
        let byte = vis[i];
        i += 1;

        if byte == 0 {
            let count = vis.get(i).copied().unwrap_or(0) as usize;
            i += 1;
            out.extend(std::iter::repeat(0u8).take(count));
        } else {
            out.push(byte);
        }
    }

    out.resize(old_row_bytes, 0);
    out
}

fn compress_row(row: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut i = 0;

    while i < row.len() {
        if row[i] == 0 {
            let mut count = 0u8;
            while i < row.len() && row[i] == 0 && count < 255 {
                count += 1;
                i += 1;
            }
            out.push(0);
            out.push(count);
        } else {
            out.push(row[i]);
            i += 1;
        }
    }

    out
}

/// Shifts bits `[shift_offset_bit, end)` of `row` up by `shift` positions,
/// as `shift` successive single-bit left-shifts (so per-word carry stays
/// trivial). Returns `true` if a set bit fell off the end of the row.
fn shift_row(row: &mut [u8], shift_offset_bit: usize, shift: usize) -> bool {
    if shift == 0 {
        return false;
    }

    let mut words: Vec<u64> = row
        .chunks_exact(8)
        .map(|c| u64::from_le_bytes(c.try_into().unwrap()))
        .collect();

    if words.is_empty() {
        return false;
    }

    let w = (shift_offset_bit / 64).min(words.len() - 1);
    let b = shift_offset_bit % 64;

    let mut overflowed = false;
    for _ in 0..shift {
        if shift_one_bit(&mut words, w, b) {
            overflowed = true;
        }
    }

    for (i, word) in words.iter().enumerate() {
        row[i * 8..i * 8 + 8].copy_from_slice(&word.to_le_bytes());
    }

    overflowed
}

fn shift_one_bit(words: &mut [u64], w: usize, b: usize) -> bool {
    let low_mask: u64 = if b == 0 { 0 } else { (1u64 << b) - 1 };
    let word = words[w];
    let low = word & low_mask;
    let high = word & !low_mask;
    let mut carry = word >> 63;

    words[w] = low | ((high << 1) & !low_mask);

    for word in words.iter_mut().skip(w + 1) {
        let outgoing = *word >> 63;
        *word = (*word << 1) | carry;
        carry = outgoing;
    }

    carry != 0
}

/// Merges A's and B's PVS data into A's, using `orig_a_leaves`/`orig_a_vis`
/// — a snapshot of A's leaves and VIS lump taken before `merge_leaves`
/// overwrote `a.leaves` with the spliced-in result.
pub fn merge_vis(
    a: &mut Bsp,
    b: &Bsp,
    ctx: &mut MergeContext,
    orig_a_leaves: &[crate::types::Leaf],
    orig_a_vis: &[u8],
) {
    let this_leaf_count = ctx.this_leaf_count as usize;
    let this_world_leaf_count = ctx.this_world_leaf_count as usize;
    let other_leaf_count = ctx.other_leaf_count as usize;

    if this_leaf_count == 0 {
        return;
    }

    let visl_a = this_leaf_count - 1;
    let visl_b = other_leaf_count;
    let visl = this_leaf_count + other_leaf_count - 1;

    let old_row_bytes_a = row_bytes_for(visl_a);
    let old_row_bytes_b = row_bytes_for(visl_b);
    let new_row_bytes = row_bytes_for(visl);

    let mut matrix = vec![vec![0u8; new_row_bytes]; visl];
    let mut overflow_count = 0usize;
    let copy_len = old_row_bytes_a.min(new_row_bytes);
    let copy_len_b = old_row_bytes_b.min(new_row_bytes);

    // Stage 1 + 2: A's world leaves, decompressed then shifted to make room
    // for B's leaves spliced in right after them.
    for i in 1..=this_world_leaf_count {
        let leaf = &orig_a_leaves[i];
        let mut row = decompress_row(orig_a_vis, leaf.vis_offset, old_row_bytes_a, visl_a);
        mask_trailing(&mut row, visl_a);

        let mut padded = vec![0u8; new_row_bytes];
        padded[..copy_len].copy_from_slice(&row[..copy_len]);

        if shift_row(&mut padded, this_world_leaf_count, other_leaf_count) {
            overflow_count += 1;
        }

        matrix[i - 1] = padded;
    }

    // Stage 3: A's submodel leaves, same shift as stage 2.
    for i in (this_world_leaf_count + 1)..this_leaf_count {
        let leaf = &orig_a_leaves[i];
        let mut row = decompress_row(orig_a_vis, leaf.vis_offset, old_row_bytes_a, visl_a);
        mask_trailing(&mut row, visl_a);

        let mut padded = vec![0u8; new_row_bytes];
        padded[..copy_len].copy_from_slice(&row[..copy_len]);

        if shift_row(&mut padded, this_world_leaf_count, other_leaf_count) {
            overflow_count += 1;
        }

        let new_row_idx = i + other_leaf_count - 1;
        matrix[new_row_idx] = padded;
    }

    // Stage 4: B's leaves, shifted up wholesale into the gap left above.
    for j in 1..=other_leaf_count {
        let leaf = &b.leaves[j];
        let mut row = decompress_row(&b.visibility, leaf.vis_offset, old_row_bytes_b, visl_b);
        mask_trailing(&mut row, visl_b);

        let mut padded = vec![0u8; new_row_bytes];
        padded[..copy_len_b].copy_from_slice(&row[..copy_len_b]);

        if shift_row(&mut padded, 0, this_world_leaf_count) {
            overflow_count += 1;
        }

        matrix[this_world_leaf_count + j - 1] = padded;
    }

    if overflow_count > 0 {
        ctx.diagnostics.push(Diagnostic::VisOverflow {
            leaves: overflow_count,
        });
    }

    // Stage 5: recompress and rebuild every leaf's vis_offset.
    let mut out = Vec::new();
    for (row_idx, row) in matrix.iter().enumerate() {
        let offset = out.len() as i32;
        out.extend(compress_row(row));
        a.leaves[row_idx + 1].vis_offset = offset;
    }
    a.leaves[0].vis_offset = -1;
    a.visibility = out;
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn run_length_round_trips() {
        let row = vec![0xFFu8, 0x00, 0x00, 0x00, 0xAB, 0x00, 0x00];
        let compressed = compress_row(&row);
        let decompressed = decompress_row(&compressed, 0, row.len(), row.len() * 8);
        assert_eq!(decompressed, row);
    }

    #[test]
    fn shift_by_one_moves_bits_up() {
        let mut row = vec![0u8; 8];
        row[0] = 0b0000_0001;
        let overflowed = shift_row(&mut row, 0, 1);
        assert!(!overflowed);
        assert_eq!(row[0], 0b0000_0010);
    }

    #[test]
    fn shift_off_the_end_is_flagged_as_overflow() {
        let mut row = vec![0u8; 8];
        row[7] = 0b1000_0000;
        let overflowed = shift_row(&mut row, 0, 1);
        assert!(overflowed);
    }
}

/// Longest texture name without the null terminator.
pub const MAX_TEXTURE_NAME_LENGTH: usize = 15;

/// Bytes in a `BSPMIPTEX`/`miptex_t` header before mip pixel data:
/// 16-byte name + width + height + 4 mip offsets.
pub const MIPTEX_HEADER_LENGTH: u32 = 16 + 4 + 4 + 4 * 4;

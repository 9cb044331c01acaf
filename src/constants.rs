// "BILD" read as a little-endian u32.
pub const BILD_MAGIC: u32 = 0x444C_4942;
pub const BILD_VERSION: u16 = 1;

pub const MIN_QUALITY: u32 = 0;
pub const MAX_QUALITY: u32 = 7;
pub const DEFAULT_QUALITY: u32 = 4;

// Packed channel streams are run-length coded before Huffman above this quality.
pub const RLE_QUALITY_THRESHOLD: u32 = 2;

pub const CHANNEL_COUNT: usize = 3;

// In-band marker for a coefficient stored in the overflow buffer.
pub const OVERFLOW_SENTINEL: i8 = -128;
pub const PACKED_MAGNITUDE_MAX: i32 = 127;

pub const FILE_HEADER_SIZE_IN_BYTES: usize = 18;
pub const CHANNEL_HEADER_SIZE_IN_BYTES: usize = 24;
pub const LEVEL_HEADER_SIZE_IN_BYTES: usize = 32;

pub const BYTE_SYMBOL_COUNT: usize = 256;
pub const HUFFMAN_MAX_NODE_COUNT: usize = 2 * BYTE_SYMBOL_COUNT - 1;
pub const HUFFMAN_LEAF_ENTRY_SIZE_IN_BYTES: usize = 5;
pub const HUFFMAN_HEADER_PREFIX_SIZE_IN_BYTES: usize = 5;

//! TIFF tag codes and field types written to the output container.

// =============================================================================
// Tag IDs
// =============================================================================

pub const NEW_SUBFILE_TYPE: u16 = 254;
pub const IMAGE_WIDTH: u16 = 256;
pub const IMAGE_LENGTH: u16 = 257;
pub const BITS_PER_SAMPLE: u16 = 258;
pub const COMPRESSION: u16 = 259;
pub const PHOTOMETRIC_INTERPRETATION: u16 = 262;
pub const IMAGE_DESCRIPTION: u16 = 270;
pub const SAMPLES_PER_PIXEL: u16 = 277;
pub const PLANAR_CONFIGURATION: u16 = 284;
/// Carries the channel name on each full-resolution page.
pub const PAGE_NAME: u16 = 285;
pub const TILE_WIDTH: u16 = 322;
pub const TILE_LENGTH: u16 = 323;
pub const TILE_OFFSETS: u16 = 324;
pub const TILE_BYTE_COUNTS: u16 = 325;
pub const SUB_IFDS: u16 = 330;
pub const SAMPLE_FORMAT: u16 = 339;

// =============================================================================
// Tag values
// =============================================================================

pub const COMPRESSION_NONE: u16 = 1;
pub const COMPRESSION_ADOBE_DEFLATE: u16 = 8;

pub const PHOTOMETRIC_MIN_IS_BLACK: u16 = 1;
pub const PLANAR_CONTIGUOUS: u16 = 1;

/// NewSubfileType bit 0: reduced-resolution version of another image
pub const SUBFILE_REDUCED_IMAGE: u32 = 1;

// =============================================================================
// BigTIFF layout
// =============================================================================

pub const BIGTIFF_MAGIC: u16 = 43;
pub const BIGTIFF_OFFSET_SIZE: u16 = 8;
pub const BIGTIFF_HEADER_LEN: u64 = 16;
/// Offset of the first-IFD pointer within the header
pub const FIRST_IFD_POINTER: u64 = 8;
/// tag (2) + type (2) + count (8) + value/offset (8)
pub const BIGTIFF_ENTRY_LEN: u64 = 20;
/// Values up to this many bytes are stored inside the entry itself
pub const BIGTIFF_INLINE_LEN: usize = 8;

/// TIFF field types used by the writer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum FieldType {
    Ascii = 2,
    Short = 3,
    Long = 4,
    Long8 = 16,
    Ifd8 = 18,
}

//! TIFF writing module
//!
//! This module provides the tiled BigTIFF page writer, the tile codecs and the
//! conversion configuration.

mod bigtiff_writer;
pub mod codec;
pub mod tags;
pub mod tiling;
pub mod types;
mod writer;


pub use bigtiff_writer::BigTiffWriter;
pub use codec::{DeflateCodec, TileCodec, Uncompressed, codec_for};
pub use types::{ConversionConfig, ConversionConfigBuilder, DEFAULT_TILE_SIZE, TiffCompression};
pub use writer::{PageKind, PageRequest, PageWriter};

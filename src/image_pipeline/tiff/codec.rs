//! Tile compression codecs.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::tiff::tags::{COMPRESSION_ADOBE_DEFLATE, COMPRESSION_NONE};
use crate::image_pipeline::tiff::types::TiffCompression;

/// Encodes the raw bytes of one tile.
pub trait TileCodec: Send + Sync {
    /// Value of the TIFF Compression tag for tiles produced by this codec.
    fn compression_tag(&self) -> u16;

    fn encode(&self, tile: &[u8]) -> Result<Vec<u8>>;
}

/// Stores tiles as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uncompressed;

impl TileCodec for Uncompressed {
    fn compression_tag(&self) -> u16 {
        COMPRESSION_NONE
    }

    fn encode(&self, tile: &[u8]) -> Result<Vec<u8>> {
        Ok(tile.to_vec())
    }
}

/// Lossless Adobe Deflate (zlib stream), TIFF compression 8.
#[derive(Debug, Clone, Copy)]
pub struct DeflateCodec {
    level: Compression,
}

impl DeflateCodec {
    pub fn new(level: Compression) -> Self {
        Self { level }
    }
}

impl Default for DeflateCodec {
    fn default() -> Self {
        Self::new(Compression::default())
    }
}

impl TileCodec for DeflateCodec {
    fn compression_tag(&self) -> u16 {
        COMPRESSION_ADOBE_DEFLATE
    }

    fn encode(&self, tile: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = ZlibEncoder::new(Vec::with_capacity(tile.len() / 2), self.level);
        encoder
            .write_all(tile)
            .map_err(|e| ConversionError::WriteError(format!("deflate encoding failed: {}", e)))?;
        encoder
            .finish()
            .map_err(|e| ConversionError::WriteError(format!("deflate encoding failed: {}", e)))
    }
}

pub fn codec_for(compression: TiffCompression) -> Box<dyn TileCodec> {
    match compression {
        TiffCompression::None => Box::new(Uncompressed),
        TiffCompression::DeflateFast => Box::new(DeflateCodec::new(Compression::fast())),
        TiffCompression::DeflateBalanced => Box::new(DeflateCodec::default()),
        TiffCompression::DeflateBest => Box::new(DeflateCodec::new(Compression::best())),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Read;

    use flate2::read::ZlibDecoder;

    use super::*;

    #[test]
    fn test_deflate_is_lossless() {
        let tile: Vec<u8> = (0..256 * 256).map(|i| (i % 251) as u8).collect();
        let codec = codec_for(TiffCompression::DeflateBest);
        assert_eq!(codec.compression_tag(), 8);

        let encoded = codec.encode(&tile).unwrap();
        assert!(encoded.len() < tile.len());

        let mut decoded = Vec::new();
        ZlibDecoder::new(&encoded[..]).read_to_end(&mut decoded).unwrap();
        assert_eq!(decoded, tile);
    }

    #[test]
    fn test_uncompressed_passthrough() {
        let codec = codec_for(TiffCompression::None);
        assert_eq!(codec.compression_tag(), 1);
        assert_eq!(codec.encode(&[1, 2, 3]).unwrap(), vec![1, 2, 3]);
    }
}

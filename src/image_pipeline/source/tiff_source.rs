//! Source container backed by the `tiff` decoder.
//!
//! Every page of the source file holds one channel at one resolution level as
//! a single-sample image. The layout descriptor lives in the ImageDescription
//! tag of page 0.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult, Limits};
use tiff::tags::Tag;
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::source::reader::{SourceContainer, SourceReader};
use crate::image_pipeline::source::types::{PixelBuffer, SourcePage};

pub struct TiffSource<R: Read + Seek> {
    decoder: Decoder<R>,
}

impl<R: Read + Seek> TiffSource<R> {
    pub fn new(reader: R) -> Result<Self> {
        let decoder = Decoder::new(reader)
            .map_err(|e| ConversionError::InputReadError(e.to_string()))?
            .with_limits(Limits::unlimited());
        Ok(Self { decoder })
    }

    fn seek(&mut self, index: usize) -> Result<()> {
        self.decoder
            .seek_to_image(index)
            .map_err(|e| ConversionError::DecodeError(format!("page {}: {}", index, e)))
    }
}

impl TiffSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ConversionError::InputReadError(format!("{}: {}", path.display(), e))
        })?;
        Self::new(BufReader::new(file))
    }
}

impl<R: Read + Seek> SourceContainer for TiffSource<R> {
    fn descriptor(&mut self) -> Result<String> {
        self.seek(0)?;
        self.decoder
            .get_tag_ascii_string(Tag::ImageDescription)
            .map_err(|e| {
                ConversionError::InputReadError(format!("page 0 has no readable ImageDescription: {}", e))
            })
    }

    fn read_page(&mut self, index: usize) -> Result<SourcePage> {
        self.seek(index)?;

        let color_type = self
            .decoder
            .colortype()
            .map_err(|e| ConversionError::DecodeError(format!("page {}: {}", index, e)))?;
        if !matches!(color_type, ColorType::Gray(_)) {
            return Err(ConversionError::UnsupportedPixelType(format!(
                "page {} has color type {:?}, only single-sample pages are supported",
                index, color_type
            )));
        }

        let (width, height) = self
            .decoder
            .dimensions()
            .map_err(|e| ConversionError::DecodeError(format!("page {}: {}", index, e)))?;

        let decoded = self
            .decoder
            .read_image()
            .map_err(|e| ConversionError::DecodeError(format!("page {}: {}", index, e)))?;

        let pixels = match decoded {
            DecodingResult::U8(v) => PixelBuffer::U8(v),
            DecodingResult::U16(v) => PixelBuffer::U16(v),
            DecodingResult::U32(v) => PixelBuffer::U32(v),
            DecodingResult::U64(v) => PixelBuffer::U64(v),
            DecodingResult::I8(v) => PixelBuffer::I8(v),
            DecodingResult::I16(v) => PixelBuffer::I16(v),
            DecodingResult::I32(v) => PixelBuffer::I32(v),
            DecodingResult::I64(v) => PixelBuffer::I64(v),
            DecodingResult::F32(v) => PixelBuffer::F32(v),
            DecodingResult::F64(v) => PixelBuffer::F64(v),
            #[allow(unreachable_patterns)]
            _ => {
                return Err(ConversionError::UnsupportedPixelType(format!(
                    "page {} uses a sample type without an output mapping",
                    index
                )));
            }
        };

        debug!(page = index, width, height, pixel_type = %pixels.pixel_type(), "Decoded source page");

        Ok(SourcePage {
            index,
            width,
            height,
            pixels,
        })
    }
}

/// Opens source files with [`TiffSource`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TiffSourceReader;

impl SourceReader for TiffSourceReader {
    type Container = TiffSource<BufReader<File>>;

    fn open(&self, path: &Path) -> Result<Self::Container> {
        TiffSource::open(path)
    }
}

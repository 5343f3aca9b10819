//! Source page data types

use std::fmt;
use std::ops::Range;

/// Element type of a single-sample page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelType {
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
}

/// TIFF SampleFormat values
pub const SAMPLE_FORMAT_UINT: u16 = 1;
pub const SAMPLE_FORMAT_INT: u16 = 2;
pub const SAMPLE_FORMAT_IEEEFP: u16 = 3;

impl PixelType {
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            PixelType::Uint8 | PixelType::Int8 => 1,
            PixelType::Uint16 | PixelType::Int16 => 2,
            PixelType::Uint32 | PixelType::Int32 | PixelType::Float32 => 4,
            PixelType::Uint64 | PixelType::Int64 | PixelType::Float64 => 8,
        }
    }

    pub const fn bits_per_sample(self) -> u16 {
        (self.bytes_per_sample() * 8) as u16
    }

    pub const fn sample_format(self) -> u16 {
        match self {
            PixelType::Uint8 | PixelType::Uint16 | PixelType::Uint32 | PixelType::Uint64 => {
                SAMPLE_FORMAT_UINT
            }
            PixelType::Int8 | PixelType::Int16 | PixelType::Int32 | PixelType::Int64 => {
                SAMPLE_FORMAT_INT
            }
            PixelType::Float32 | PixelType::Float64 => SAMPLE_FORMAT_IEEEFP,
        }
    }
}

impl fmt::Display for PixelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PixelType::Uint8 => "uint8",
            PixelType::Uint16 => "uint16",
            PixelType::Uint32 => "uint32",
            PixelType::Uint64 => "uint64",
            PixelType::Int8 => "int8",
            PixelType::Int16 => "int16",
            PixelType::Int32 => "int32",
            PixelType::Int64 => "int64",
            PixelType::Float32 => "float32",
            PixelType::Float64 => "float64",
        };
        f.write_str(name)
    }
}

/// Decoded samples of one page, row-major.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelBuffer {
    U8(Vec<u8>),
    U16(Vec<u16>),
    U32(Vec<u32>),
    U64(Vec<u64>),
    I8(Vec<i8>),
    I16(Vec<i16>),
    I32(Vec<i32>),
    I64(Vec<i64>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl PixelBuffer {
    pub fn pixel_type(&self) -> PixelType {
        match self {
            PixelBuffer::U8(_) => PixelType::Uint8,
            PixelBuffer::U16(_) => PixelType::Uint16,
            PixelBuffer::U32(_) => PixelType::Uint32,
            PixelBuffer::U64(_) => PixelType::Uint64,
            PixelBuffer::I8(_) => PixelType::Int8,
            PixelBuffer::I16(_) => PixelType::Int16,
            PixelBuffer::I32(_) => PixelType::Int32,
            PixelBuffer::I64(_) => PixelType::Int64,
            PixelBuffer::F32(_) => PixelType::Float32,
            PixelBuffer::F64(_) => PixelType::Float64,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PixelBuffer::U8(v) => v.len(),
            PixelBuffer::U16(v) => v.len(),
            PixelBuffer::U32(v) => v.len(),
            PixelBuffer::U64(v) => v.len(),
            PixelBuffer::I8(v) => v.len(),
            PixelBuffer::I16(v) => v.len(),
            PixelBuffer::I32(v) => v.len(),
            PixelBuffer::I64(v) => v.len(),
            PixelBuffer::F32(v) => v.len(),
            PixelBuffer::F64(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Appends the samples in `range` to `out`, little-endian, the byte
    /// order of the output container.
    pub fn extend_le_bytes(&self, range: Range<usize>, out: &mut Vec<u8>) {
        match self {
            PixelBuffer::U8(v) => out.extend_from_slice(&v[range]),
            PixelBuffer::U16(v) => v[range].iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            PixelBuffer::U32(v) => v[range].iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            PixelBuffer::U64(v) => v[range].iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            PixelBuffer::I8(v) => v[range].iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            PixelBuffer::I16(v) => v[range].iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            PixelBuffer::I32(v) => v[range].iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            PixelBuffer::I64(v) => v[range].iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            PixelBuffer::F32(v) => v[range].iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
            PixelBuffer::F64(v) => v[range].iter().for_each(|x| out.extend_from_slice(&x.to_le_bytes())),
        }
    }
}

/// One page of the source container
#[derive(Debug, Clone)]
pub struct SourcePage {
    /// Page index within the source container
    pub index: usize,
    /// Width of the page in pixels
    pub width: u32,
    /// Height of the page in pixels
    pub height: u32,
    /// Decoded single-sample pixel data
    pub pixels: PixelBuffer,
}

impl SourcePage {
    pub fn pixel_type(&self) -> PixelType {
        self.pixels.pixel_type()
    }
}

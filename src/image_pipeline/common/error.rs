use thiserror::Error;

use crate::image_pipeline::descriptor::DescriptorError;

#[derive(Error, Debug)]
pub enum ConversionError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to decode source page: {0}")]
    DecodeError(String),

    #[error("Malformed layout descriptor: {0}")]
    ParseError(#[from] DescriptorError),

    #[error("Inconsistent pyramid layout: {0}")]
    SchemaError(String),

    #[error("Unsupported pixel type: {0}")]
    UnsupportedPixelType(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(u32, u32),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to write output file: {0}")]
    WriteError(String),
}

pub type Result<T> = std::result::Result<T, ConversionError>;

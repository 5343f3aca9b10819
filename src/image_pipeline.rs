//! Image processing pipeline module
//!
//! This module provides a structured approach to converting a multi-page
//! multiplexed source container into a pyramidal OME-TIFF, with separate
//! modules for source reading, descriptor parsing, pyramid indexing, OME
//! metadata, TIFF writing and conversion orchestration.

pub mod common;
pub mod conversions;
pub mod descriptor;
pub mod ome;
pub mod pyramid;
pub mod source;
pub mod tiff;

pub use common::{ConversionError, Result};

pub use source::{PixelBuffer, PixelType, SourceContainer, SourcePage, SourceReader, TiffSource, TiffSourceReader};

pub use descriptor::{ChannelLevelEntry, DescriptorError, PageTable, parse_descriptor};

pub use pyramid::PyramidPlan;

pub use ome::{OmeMetadata, PixelTypePolicy};

pub use tiff::{
    BigTiffWriter, ConversionConfig, ConversionConfigBuilder, PageWriter, TiffCompression,
};

pub use conversions::{
    ConversionStage, NoopProgress, OmeTiffPipeline, ProgressSink, SharedProgress, output_path_for,
};

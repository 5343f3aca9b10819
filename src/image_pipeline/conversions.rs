//! Pipeline conversions module
//!
//! This module contains the orchestration of the pyramidal OME-TIFF
//! conversion and the progress reporting it drives.

mod ome_tiff;
mod progress;
mod pyramid_writer;


pub use ome_tiff::{OUTPUT_SUFFIX, OmeTiffPipeline, PreparedConversion, output_path_for};
pub use progress::{ConversionStage, NoopProgress, ProgressSink, SharedProgress};
pub use pyramid_writer::PyramidWriter;

//! Source container module
//!
//! This module provides read access to the multi-page source container: the
//! embedded layout descriptor and the decoded pixels of each page.

mod reader;
mod tiff_source;
pub mod types;

pub use reader::{SourceContainer, SourceReader};
pub use tiff_source::{TiffSource, TiffSourceReader};
pub use types::{PixelBuffer, PixelType, SourcePage};

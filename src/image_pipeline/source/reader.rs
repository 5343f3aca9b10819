use std::path::Path;

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::source::types::SourcePage;

/// Read access to an opened multi-page source container.
pub trait SourceContainer {
    /// Layout descriptor embedded in the first page.
    fn descriptor(&mut self) -> Result<String>;

    fn read_page(&mut self, index: usize) -> Result<SourcePage>;
}

/// Opens source containers from disk.
pub trait SourceReader {
    type Container: SourceContainer;

    fn open(&self, path: &Path) -> Result<Self::Container>;
}

use crate::image_pipeline::common::error::Result;
use crate::image_pipeline::pyramid::PlanPosition;
use crate::image_pipeline::source::PixelType;

/// Role of a page in the output pyramid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageKind {
    /// Full-resolution page of a channel, a top-level image.
    Base {
        channel_name: String,
        /// ImageDescription content, present only on the first page
        description: Option<String>,
        /// Reduced pages that will follow and link into this page's SubIFDs
        sub_pages: u32,
    },
    /// Reduced-resolution page filling the next SubIFD slot of the current base page.
    Reduced,
}

/// Already-encoded tiles of one page together with its layout.
#[derive(Debug, Clone)]
pub struct PageRequest {
    pub position: PlanPosition,
    pub kind: PageKind,
    pub width: u32,
    pub height: u32,
    pub pixel_type: PixelType,
    pub tile_size: u32,
    /// Compression tag value the tiles were encoded with
    pub compression: u16,
    /// Encoded tiles in row-major tile order
    pub tiles: Vec<Vec<u8>>,
}

/// Appends pages to a pyramidal output container.
pub trait PageWriter {
    fn write_page(&mut self, request: PageRequest) -> Result<()>;

    /// Completes the container; every reserved SubIFD slot must be filled.
    fn finish(&mut self) -> Result<()>;
}

//! OME metadata module
//!
//! This module synthesizes the OME-XML document stored in the first page of
//! the output container.

mod metadata;
mod pixel_type;

#[cfg(test)]
mod tests;

pub(crate) use metadata::escape_non_ascii;
pub use metadata::{DEFAULT_PHYSICAL_SIZE_UM, OME_NAMESPACE, OmeMetadata};
pub use pixel_type::{FALLBACK_PIXEL_TYPE, PixelTypePolicy, ome_pixel_type, resolve_pixel_type};

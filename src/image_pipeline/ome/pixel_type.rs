use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::source::PixelType;

/// Token declared for element types outside the OME mapping when
/// [`PixelTypePolicy::Fallback`] is selected.
pub const FALLBACK_PIXEL_TYPE: &str = "uint8";

/// What to do with an element type that has no OME pixel type token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelTypePolicy {
    /// Abort the conversion with `UnsupportedPixelType`
    #[default]
    Reject,
    /// Declare [`FALLBACK_PIXEL_TYPE`] and write the samples unchanged
    Fallback,
}

/// OME `Pixels/@Type` token for the element types the converter maps.
pub fn ome_pixel_type(pixel_type: PixelType) -> Option<&'static str> {
    match pixel_type {
        PixelType::Uint8 => Some("uint8"),
        PixelType::Uint16 => Some("uint16"),
        PixelType::Float32 => Some("float"),
        PixelType::Float64 => Some("double"),
        PixelType::Uint32
        | PixelType::Uint64
        | PixelType::Int8
        | PixelType::Int16
        | PixelType::Int32
        | PixelType::Int64 => None,
    }
}

pub fn resolve_pixel_type(pixel_type: PixelType, policy: PixelTypePolicy) -> Result<&'static str> {
    match (ome_pixel_type(pixel_type), policy) {
        (Some(token), _) => Ok(token),
        (None, PixelTypePolicy::Fallback) => {
            tracing::warn!(
                %pixel_type,
                fallback = FALLBACK_PIXEL_TYPE,
                "Element type has no OME mapping, declaring fallback type"
            );
            Ok(FALLBACK_PIXEL_TYPE)
        }
        (None, PixelTypePolicy::Reject) => Err(ConversionError::UnsupportedPixelType(format!(
            "{} has no OME pixel type (supported: uint8, uint16, float32, float64)",
            pixel_type
        ))),
    }
}

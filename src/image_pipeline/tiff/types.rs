//! Conversion configuration types

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::ome::{DEFAULT_PHYSICAL_SIZE_UM, PixelTypePolicy};

/// Output tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 256;

/// TIFF compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiffCompression {
    /// No compression (fastest, largest file)
    None,
    /// Deflate compression - fast level (good speed/size balance)
    DeflateFast,
    /// Deflate compression - balanced (default)
    DeflateBalanced,
    /// Deflate compression - best compression (slower)
    DeflateBest,
}

/// Configuration for pyramidal OME-TIFF conversion
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Compression method applied to every tile
    pub compression: TiffCompression,
    /// Tile width and height; must be a non-zero multiple of 16
    pub tile_size: u32,
    /// Physical pixel size in micrometres declared in the OME metadata
    pub physical_size_um: f64,
    /// Handling of element types without an OME pixel type token
    pub pixel_type_policy: PixelTypePolicy,
    /// Whether to validate page dimensions before writing them
    pub validate_dimensions: bool,
    /// Whether to delete the partially written output after a failure
    pub remove_partial_output: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            compression: TiffCompression::DeflateBalanced,
            tile_size: DEFAULT_TILE_SIZE,
            physical_size_um: DEFAULT_PHYSICAL_SIZE_UM,
            pixel_type_policy: PixelTypePolicy::default(),
            validate_dimensions: true,
            remove_partial_output: false,
        }
    }
}

impl ConversionConfig {
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder::default()
    }

    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 || self.tile_size % 16 != 0 {
            return Err(ConversionError::InvalidConfig(format!(
                "tile size must be a non-zero multiple of 16, got {}",
                self.tile_size
            )));
        }
        if !(self.physical_size_um.is_finite() && self.physical_size_um > 0.0) {
            return Err(ConversionError::InvalidConfig(format!(
                "physical pixel size must be positive, got {}",
                self.physical_size_um
            )));
        }
        Ok(())
    }
}

/// Builder for ConversionConfig
#[derive(Default)]
pub struct ConversionConfigBuilder {
    compression: Option<TiffCompression>,
    tile_size: Option<u32>,
    physical_size_um: Option<f64>,
    pixel_type_policy: Option<PixelTypePolicy>,
    validate_dimensions: Option<bool>,
    remove_partial_output: Option<bool>,
}

impl ConversionConfigBuilder {
    pub fn compression(mut self, compression: TiffCompression) -> Self {
        self.compression = Some(compression);
        self
    }

    pub fn tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = Some(tile_size);
        self
    }

    pub fn physical_size_um(mut self, size: f64) -> Self {
        self.physical_size_um = Some(size);
        self
    }

    pub fn pixel_type_policy(mut self, policy: PixelTypePolicy) -> Self {
        self.pixel_type_policy = Some(policy);
        self
    }

    pub fn validate_dimensions(mut self, validate: bool) -> Self {
        self.validate_dimensions = Some(validate);
        self
    }

    pub fn remove_partial_output(mut self, remove: bool) -> Self {
        self.remove_partial_output = Some(remove);
        self
    }

    pub fn build(self) -> ConversionConfig {
        let default = ConversionConfig::default();
        ConversionConfig {
            compression: self.compression.unwrap_or(default.compression),
            tile_size: self.tile_size.unwrap_or(default.tile_size),
            physical_size_um: self.physical_size_um.unwrap_or(default.physical_size_um),
            pixel_type_policy: self.pixel_type_policy.unwrap_or(default.pixel_type_policy),
            validate_dimensions: self.validate_dimensions.unwrap_or(default.validate_dimensions),
            remove_partial_output: self
                .remove_partial_output
                .unwrap_or(default.remove_partial_output),
        }
    }
}

//! Sequences the page writes of a pyramid plan.

use tracing::{debug, info_span};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::conversions::progress::{ConversionStage, ProgressSink};
use crate::image_pipeline::pyramid::{PlanPosition, PyramidPlan};
use crate::image_pipeline::source::{SourceContainer, SourcePage};
use crate::image_pipeline::tiff::tiling::encode_tiles;
use crate::image_pipeline::tiff::{ConversionConfig, PageKind, PageRequest, PageWriter, TileCodec};

pub struct PyramidWriter<'a> {
    config: &'a ConversionConfig,
    codec: &'a dyn TileCodec,
}

impl<'a> PyramidWriter<'a> {
    pub fn new(config: &'a ConversionConfig, codec: &'a dyn TileCodec) -> Self {
        Self { config, codec }
    }

    /// Writes every plan entry in order and returns the number of pages
    /// written. `base_page` is the already decoded level 0 page of the first
    /// channel; `metadata_xml` is attached to it and to no other page.
    pub fn write<S, P>(
        &self,
        plan: &PyramidPlan,
        metadata_xml: &str,
        base_page: SourcePage,
        source: &mut S,
        writer: &mut P,
        sink: &dyn ProgressSink,
    ) -> Result<u64>
    where
        S: SourceContainer + ?Sized,
        P: PageWriter + ?Sized,
    {
        let total = plan.total_units();
        let base_type = base_page.pixel_type();
        let mut base_page = Some(base_page);
        let mut previous: Option<(u32, u32)> = None;
        let mut completed = 0u64;

        for (position, entry) in plan.positions() {
            let _span = info_span!(
                "write_page",
                channel = %entry.channel,
                level = position.level,
                page = entry.page
            )
            .entered();
            sink.on_stage(ConversionStage::Writing {
                channel: position.channel_index,
                level: position.level,
            });

            let decoded = if position.is_first_page() { base_page.take() } else { None };
            let page = match decoded {
                Some(page) => page,
                None => source.read_page(entry.page)?,
            };

            if page.pixels.len() != page.width as usize * page.height as usize {
                return Err(ConversionError::DecodeError(format!(
                    "page {} holds {} samples for a {}x{} image",
                    entry.page,
                    page.pixels.len(),
                    page.width,
                    page.height
                )));
            }
            if page.pixel_type() != base_type {
                return Err(ConversionError::SchemaError(format!(
                    "page {} ({} level {}) is {}, the base page is {}",
                    entry.page,
                    entry.channel,
                    position.level,
                    page.pixel_type(),
                    base_type
                )));
            }
            if self.config.validate_dimensions {
                self.validate_dimensions(&position, &page, previous)?;
            }
            previous = Some((page.width, page.height));

            let kind = if position.is_base() {
                PageKind::Base {
                    channel_name: entry.channel.clone(),
                    description: position.is_first_page().then(|| metadata_xml.to_string()),
                    sub_pages: plan.max_level(),
                }
            } else {
                PageKind::Reduced
            };

            let tiles = encode_tiles(&page, self.config.tile_size, self.codec)?;
            writer.write_page(PageRequest {
                position,
                kind,
                width: page.width,
                height: page.height,
                pixel_type: page.pixel_type(),
                tile_size: self.config.tile_size,
                compression: self.codec.compression_tag(),
                tiles,
            })?;

            completed += 1;
            sink.on_progress(completed, total);
            sink.on_status(&format!("Processing... ({}/{})", completed, total));
        }

        debug!(pages = completed, "All pages written");
        Ok(completed)
    }

    fn validate_dimensions(
        &self,
        position: &PlanPosition,
        page: &SourcePage,
        previous: Option<(u32, u32)>,
    ) -> Result<()> {
        if page.width == 0 || page.height == 0 {
            return Err(ConversionError::InvalidDimensions(page.width, page.height));
        }
        // A reduced level may not be larger than the level above it.
        if let (false, Some((prev_width, prev_height))) = (position.is_base(), previous) {
            if page.width > prev_width || page.height > prev_height {
                return Err(ConversionError::InvalidDimensions(page.width, page.height));
            }
        }
        Ok(())
    }
}

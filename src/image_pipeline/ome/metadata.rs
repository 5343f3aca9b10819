//! OME-XML document for the pyramidal output.
//!
//! The document describes a single image with one Z plane and one timepoint
//! per channel. Each channel owns a contiguous run of `levels_per_channel`
//! top-level IFDs in the output: its full-resolution page followed, in the
//! page sequence, by the reduced pages that hang off it as SubIFDs. The
//! `TiffData/@IFD` of channel `i` is therefore `i * levels_per_channel`, and
//! the page writer emits pages in exactly that order.

use std::borrow::Cow;

use quick_xml::Writer;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use tracing::debug;

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::pyramid::PyramidPlan;

pub const OME_NAMESPACE: &str = "http://www.openmicroscopy.org/Schemas/OME/2016-06";

/// Physical pixel size in micrometres declared when none is configured.
pub const DEFAULT_PHYSICAL_SIZE_UM: f64 = 0.5;

const IMAGE_NAME: &str = "Multipage Image";
const DIMENSION_ORDER: &str = "XYCZT";

#[derive(Debug, Clone, PartialEq)]
pub struct OmeMetadata {
    /// Base level width
    pub size_x: u32,
    /// Base level height
    pub size_y: u32,
    /// Channel names in plan order
    pub channels: Vec<String>,
    pub levels_per_channel: usize,
    /// OME `Pixels/@Type` token
    pub pixel_type: &'static str,
    pub physical_size_um: f64,
}

impl OmeMetadata {
    pub fn new(
        plan: &PyramidPlan,
        width: u32,
        height: u32,
        pixel_type: &'static str,
        physical_size_um: f64,
    ) -> Self {
        Self {
            size_x: width,
            size_y: height,
            channels: plan.channel_names().map(str::to_string).collect(),
            levels_per_channel: plan.levels_per_channel(),
            pixel_type,
            physical_size_um,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// First top-level IFD holding `channel_index`.
    pub fn tiff_data_ifd(&self, channel_index: usize) -> usize {
        channel_index * self.levels_per_channel
    }

    pub fn plane_count(&self) -> usize {
        self.levels_per_channel
    }

    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());

        let mut ome = BytesStart::new("OME");
        push_attr(&mut ome, "xmlns", OME_NAMESPACE);

        let mut image = BytesStart::new("Image");
        push_attr(&mut image, "ID", "Image:0");
        push_attr(&mut image, "Name", IMAGE_NAME);

        let physical_size = self.physical_size_um.to_string();
        let mut pixels = BytesStart::new("Pixels");
        push_attr(&mut pixels, "ID", "Pixels:0");
        push_attr(&mut pixels, "DimensionOrder", DIMENSION_ORDER);
        push_attr(&mut pixels, "Type", self.pixel_type);
        push_attr(&mut pixels, "SizeX", &self.size_x.to_string());
        push_attr(&mut pixels, "SizeY", &self.size_y.to_string());
        push_attr(&mut pixels, "SizeC", &self.channel_count().to_string());
        push_attr(&mut pixels, "SizeZ", "1");
        push_attr(&mut pixels, "SizeT", "1");
        push_attr(&mut pixels, "Interleaved", "false");
        push_attr(&mut pixels, "PhysicalSizeX", &physical_size);
        push_attr(&mut pixels, "PhysicalSizeY", &physical_size);

        let mut events = vec![
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
            Event::Start(ome),
            Event::Start(image),
            Event::Start(pixels),
        ];

        // Schema order: all Channel elements precede TiffData.
        for (index, name) in self.channels.iter().enumerate() {
            let mut channel = BytesStart::new("Channel");
            push_attr(&mut channel, "ID", &format!("Channel:0:{}", index));
            push_attr(&mut channel, "Name", name);
            push_attr(&mut channel, "SamplesPerPixel", "1");
            events.push(Event::Empty(channel));
        }
        for index in 0..self.channel_count() {
            let mut tiff_data = BytesStart::new("TiffData");
            push_attr(&mut tiff_data, "IFD", &self.tiff_data_ifd(index).to_string());
            push_attr(&mut tiff_data, "PlaneCount", &self.plane_count().to_string());
            push_attr(&mut tiff_data, "FirstC", &index.to_string());
            events.push(Event::Empty(tiff_data));
        }

        events.push(Event::End(BytesEnd::new("Pixels")));
        events.push(Event::End(BytesEnd::new("Image")));
        events.push(Event::End(BytesEnd::new("OME")));

        for event in events {
            writer
                .write_event(event)
                .map_err(|e| ConversionError::WriteError(format!("OME-XML serialization: {}", e)))?;
        }

        let xml = String::from_utf8(writer.into_inner())
            .map_err(|e| ConversionError::WriteError(format!("OME-XML serialization: {}", e)))?;
        debug!(bytes = xml.len(), channels = self.channel_count(), "Synthesized OME-XML");
        Ok(xml)
    }
}

/// Adds an attribute whose value is XML-escaped and restricted to ASCII, as
/// required for the TIFF ImageDescription tag.
fn push_attr(element: &mut BytesStart<'_>, key: &str, value: &str) {
    let escaped = ascii_escape(value);
    element.push_attribute(Attribute::from((key.as_bytes(), escaped.as_bytes())));
}

fn ascii_escape(value: &str) -> String {
    escape_non_ascii(&quick_xml::escape::escape(value)).into_owned()
}

/// Replaces every non-ASCII character with a `&#x..;` character reference.
/// TIFF ASCII tags cannot carry anything else.
pub(crate) fn escape_non_ascii(value: &str) -> Cow<'_, str> {
    if value.is_ascii() {
        return Cow::Borrowed(value);
    }
    let mut out = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            out.push_str(&format!("&#x{:X};", c as u32));
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_escape() {
        assert_eq!(ascii_escape("CD3 & \"CD8\""), "CD3 &amp; &quot;CD8&quot;");
        assert_eq!(ascii_escape("Ki-67 µ"), "Ki-67 &#xB5;");
        assert_eq!(ascii_escape("DAPI"), "DAPI");
    }

    #[test]
    fn test_escape_non_ascii_leaves_markup_alone() {
        assert_eq!(escape_non_ascii("CD3 & CD8"), "CD3 & CD8");
        assert_eq!(escape_non_ascii("Ki67 α"), "Ki67 &#x3B1;");
    }
}

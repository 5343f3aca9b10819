//! Descriptor grammar
//!
//! ```text
//! <channels>
//!   <channel id="0" name="DAPI"/>
//!   <channel id="1" name="CD8"/>
//! </channels>
//! <pixels>
//!   <plane x="0" y="0" page="0" channel="0" level="0"/>
//!   <plane x="0" y="0" page="1" channel="0" level="1"/>
//! </pixels>
//! ```
//!
//! Every `name` attribute inside the channel segment declares the next
//! channel. Anything on the `<pixels>` line itself is ignored. A tag in the pixel segment is a plane record when its fourth
//! attribute is named `channel`; its third, fourth and fifth attribute values
//! are then the page index, channel index and level.

use tracing::{debug, instrument};

use crate::image_pipeline::descriptor::error::DescriptorError;
use crate::image_pipeline::descriptor::lexer::{self, Tag};
use crate::image_pipeline::descriptor::types::{ChannelLevelEntry, PageTable};

pub const CHANNELS_START: &str = "<channels>";
pub const CHANNELS_END: &str = "</channels>";
pub const PIXELS_START: &str = "<pixels>";
pub const PIXELS_END: &str = "</pixels>";

const CHANNEL_NAME_ATTRIBUTE: &str = "name";
const DISCRIMINATOR: &str = "channel";

const PAGE_FIELD: usize = 2;
const CHANNEL_FIELD: usize = 3;
const LEVEL_FIELD: usize = 4;

/// Extracts the channel names and the page table from a layout descriptor.
#[instrument(skip(text), fields(len = text.len()))]
pub fn parse_descriptor(text: &str) -> Result<PageTable, DescriptorError> {
    let (channels, channels_line) = segment(text, CHANNELS_START, CHANNELS_END, "channels")?;
    let channel_names: Vec<String> = lexer::tokenize(channels, channels_line)?
        .into_iter()
        .flat_map(|tag| tag.attributes)
        .filter(|attr| attr.name == CHANNEL_NAME_ATTRIBUTE)
        .map(|attr| attr.value)
        .collect();

    let (pixels, pixels_line) = segment(text, PIXELS_START, PIXELS_END, "pixels")?;
    // Records start on the line after the opening marker.
    let pixels = pixels.split_once('\n').map_or("", |(_, rest)| rest);
    let pixels_line = pixels_line + 1;
    let mut records = Vec::new();
    for tag in lexer::tokenize(pixels, pixels_line)? {
        if let Some(record) = plane_record(&tag)? {
            if record.channel >= channel_names.len() {
                return Err(DescriptorError::ChannelOutOfRange {
                    line: tag.line,
                    index: record.channel,
                    declared: channel_names.len(),
                });
            }
            records.push(record);
        }
    }

    records.sort_by_key(|r| (r.channel, r.level));

    let rows = records
        .into_iter()
        .map(|r| ChannelLevelEntry {
            page: r.page,
            channel: channel_names[r.channel].clone(),
            level: r.level,
        })
        .collect::<Vec<_>>();

    debug!(
        channels = channel_names.len(),
        rows = rows.len(),
        "Parsed layout descriptor"
    );

    Ok(PageTable {
        channel_names,
        rows,
    })
}

struct PlaneRecord {
    page: usize,
    channel: usize,
    level: u32,
}

fn plane_record(tag: &Tag) -> Result<Option<PlaneRecord>, DescriptorError> {
    let attrs = &tag.attributes;
    if attrs.len() <= LEVEL_FIELD || attrs[CHANNEL_FIELD].name != DISCRIMINATOR {
        return Ok(None);
    }

    Ok(Some(PlaneRecord {
        page: integer(tag, PAGE_FIELD, "page")?,
        channel: integer(tag, CHANNEL_FIELD, "channel")?,
        level: integer(tag, LEVEL_FIELD, "level")?,
    }))
}

fn integer<T: std::str::FromStr>(
    tag: &Tag,
    position: usize,
    field: &'static str,
) -> Result<T, DescriptorError> {
    let value = &tag.attributes[position].value;
    value
        .trim()
        .parse()
        .map_err(|_| DescriptorError::InvalidInteger {
            line: tag.line,
            field,
            value: value.clone(),
        })
}

/// Returns the text between `start` and the following `end` marker, with the
/// line number on which that text begins.
fn segment<'a>(
    text: &'a str,
    start: &str,
    end: &str,
    name: &'static str,
) -> Result<(&'a str, usize), DescriptorError> {
    let begin = text
        .find(start)
        .map(|i| i + start.len())
        .ok_or(DescriptorError::MissingSegment(name))?;
    let len = text[begin..]
        .find(end)
        .ok_or(DescriptorError::MissingSegment(name))?;
    let line = 1 + text[..begin].matches('\n').count();
    Ok((&text[begin..begin + len], line))
}

//! Pyramid plan: the validated, ordered page layout of the output file.

use std::collections::HashSet;

use tracing::{debug, instrument};

use crate::image_pipeline::common::error::{ConversionError, Result};
use crate::image_pipeline::descriptor::{ChannelLevelEntry, PageTable};

/// All resolution levels of one channel, level 0 first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelPyramid {
    pub name: String,
    pub levels: Vec<ChannelLevelEntry>,
}

/// Where a page sits in the plan and therefore in the output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanPosition {
    /// Zero-based channel index in plan order
    pub channel_index: usize,
    /// Resolution level within the channel
    pub level: u32,
    /// Zero-based write order over the whole plan
    pub ordinal: usize,
}

impl PlanPosition {
    pub fn is_base(&self) -> bool {
        self.level == 0
    }

    /// The very first page of the output, which carries the metadata document.
    pub fn is_first_page(&self) -> bool {
        self.ordinal == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PyramidPlan {
    channels: Vec<ChannelPyramid>,
    max_level: u32,
}

impl PyramidPlan {
    /// Groups a sorted page table by channel and checks that every channel
    /// holds exactly the levels `0..=max_level`.
    #[instrument(skip(table), fields(rows = table.rows.len()))]
    pub fn from_table(table: &PageTable) -> Result<Self> {
        if table.rows.is_empty() {
            return Err(ConversionError::SchemaError(
                "descriptor does not assign any page to a channel".to_string(),
            ));
        }

        let used: HashSet<&str> = table.rows.iter().map(|r| r.channel.as_str()).collect();
        let mut seen = HashSet::new();
        for name in &table.channel_names {
            if used.contains(name.as_str()) && !seen.insert(name.as_str()) {
                return Err(ConversionError::SchemaError(format!(
                    "channel name {:?} is declared more than once",
                    name
                )));
            }
        }

        let mut channels: Vec<ChannelPyramid> = Vec::new();
        for row in &table.rows {
            match channels.last_mut() {
                Some(current) if current.name == row.channel => current.levels.push(row.clone()),
                _ => channels.push(ChannelPyramid {
                    name: row.channel.clone(),
                    levels: vec![row.clone()],
                }),
            }
        }

        let max_level = table.rows.iter().map(|r| r.level).max().unwrap_or(0);

        for channel in &channels {
            let levels: Vec<u32> = channel.levels.iter().map(|e| e.level).collect();
            let complete = levels.len() == max_level as usize + 1
                && levels.iter().zip(0u32..).all(|(&level, expected)| level == expected);
            if !complete {
                return Err(ConversionError::SchemaError(format!(
                    "channel {:?} has levels {:?}, expected 0..={}",
                    channel.name, levels, max_level
                )));
            }
        }

        let plan = Self {
            channels,
            max_level,
        };
        debug!(
            channels = plan.channel_count(),
            max_level = plan.max_level,
            total_units = plan.total_units(),
            "Indexed pyramid"
        );
        Ok(plan)
    }

    pub fn max_level(&self) -> u32 {
        self.max_level
    }

    pub fn levels_per_channel(&self) -> usize {
        self.max_level as usize + 1
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of page writes, one progress unit each.
    pub fn total_units(&self) -> u64 {
        (self.channel_count() * self.levels_per_channel()) as u64
    }

    pub fn channels(&self) -> &[ChannelPyramid] {
        &self.channels
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.name.as_str())
    }

    /// Level 0 of the first channel; its geometry defines the image size.
    pub fn base_entry(&self) -> &ChannelLevelEntry {
        &self.channels[0].levels[0]
    }

    /// Entries in write order: channel-major, level-minor.
    pub fn entries(&self) -> impl Iterator<Item = &ChannelLevelEntry> {
        self.channels.iter().flat_map(|c| c.levels.iter())
    }

    /// Same order as [`entries`](Self::entries), paired with each entry's position.
    pub fn positions(&self) -> impl Iterator<Item = (PlanPosition, &ChannelLevelEntry)> {
        let per_channel = self.levels_per_channel();
        self.channels
            .iter()
            .enumerate()
            .flat_map(move |(channel_index, channel)| {
                channel.levels.iter().map(move |entry| {
                    (
                        PlanPosition {
                            channel_index,
                            level: entry.level,
                            ordinal: channel_index * per_channel + entry.level as usize,
                        },
                        entry,
                    )
                })
            })
    }

    pub fn len(&self) -> usize {
        self.total_units() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

//! Descriptor parsing output types

/// One source page assigned to a channel and pyramid level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelLevelEntry {
    /// Page index in the source container
    pub page: usize,
    /// Channel name
    pub channel: String,
    /// Resolution level, 0 being full resolution
    pub level: u32,
}

/// Channel names and page assignments extracted from a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTable {
    /// Declared channel names, ordered by their declared index
    pub channel_names: Vec<String>,
    /// Rows sorted by (declared channel index, level)
    pub rows: Vec<ChannelLevelEntry>,
}

use crate::image_pipeline::common::error::ConversionError;
use crate::image_pipeline::descriptor::{ChannelLevelEntry, PageTable};
use crate::image_pipeline::pyramid::{PlanPosition, PyramidPlan};

fn table(channels: &[&str], rows: &[(usize, &str, u32)]) -> PageTable {
    PageTable {
        channel_names: channels.iter().map(|c| c.to_string()).collect(),
        rows: rows
            .iter()
            .map(|&(page, channel, level)| ChannelLevelEntry {
                page,
                channel: channel.to_string(),
                level,
            })
            .collect(),
    }
}

/// C channels with L+1 levels each, pages numbered in write order.
fn uniform(channels: usize, max_level: u32) -> PageTable {
    let names: Vec<String> = (0..channels).map(|c| format!("C{c}")).collect();
    let mut rows = Vec::new();
    for (c, name) in names.iter().enumerate() {
        for level in 0..=max_level {
            rows.push(ChannelLevelEntry {
                page: c * (max_level as usize + 1) + level as usize,
                channel: name.clone(),
                level,
            });
        }
    }
    PageTable {
        channel_names: names,
        rows,
    }
}

#[test]
fn test_plan_sizes() {
    for channels in [1usize, 3] {
        for max_level in [0u32, 2] {
            let plan = PyramidPlan::from_table(&uniform(channels, max_level)).unwrap();
            assert_eq!(plan.max_level(), max_level);
            assert_eq!(plan.channel_count(), channels);
            assert_eq!(plan.total_units(), (channels * (max_level as usize + 1)) as u64);
            assert_eq!(plan.positions().count(), plan.len());
            assert_eq!(plan.entries().count(), plan.len());
        }
    }
}

#[test]
fn test_positions_are_channel_major() {
    let plan = PyramidPlan::from_table(&uniform(2, 1)).unwrap();
    let positions: Vec<PlanPosition> = plan.positions().map(|(p, _)| p).collect();
    let order: Vec<(usize, u32, usize)> = positions
        .iter()
        .map(|p| (p.channel_index, p.level, p.ordinal))
        .collect();
    assert_eq!(order, vec![(0, 0, 0), (0, 1, 1), (1, 0, 2), (1, 1, 3)]);
    assert!(positions[0].is_first_page());
    assert!(positions[2].is_base());
    assert!(!positions[2].is_first_page());
}

#[test]
fn test_base_entry_is_first_channel_level_zero() {
    let plan = PyramidPlan::from_table(&table(
        &["DAPI", "CD8"],
        &[(4, "DAPI", 0), (5, "DAPI", 1), (0, "CD8", 0), (1, "CD8", 1)],
    ))
    .unwrap();
    assert_eq!(plan.base_entry().page, 4);
    assert_eq!(plan.channel_names().collect::<Vec<_>>(), vec!["DAPI", "CD8"]);
}

#[test]
fn test_uneven_levels_rejected() {
    let err = PyramidPlan::from_table(&table(
        &["A", "B"],
        &[(0, "A", 0), (1, "A", 1), (2, "B", 0)],
    ))
    .unwrap_err();
    assert!(matches!(err, ConversionError::SchemaError(_)));
}

#[test]
fn test_level_gap_rejected() {
    let err = PyramidPlan::from_table(&table(&["A"], &[(0, "A", 0), (1, "A", 2)])).unwrap_err();
    assert!(matches!(err, ConversionError::SchemaError(_)));
}

#[test]
fn test_duplicate_level_rejected() {
    let err = PyramidPlan::from_table(&table(
        &["A", "B"],
        &[(0, "A", 0), (1, "A", 0), (2, "B", 0), (3, "B", 1)],
    ))
    .unwrap_err();
    assert!(matches!(err, ConversionError::SchemaError(_)));
}

#[test]
fn test_missing_level_zero_rejected() {
    let err = PyramidPlan::from_table(&table(&["A"], &[(0, "A", 1)])).unwrap_err();
    assert!(matches!(err, ConversionError::SchemaError(_)));
}

#[test]
fn test_empty_table_rejected() {
    let err = PyramidPlan::from_table(&table(&["A"], &[])).unwrap_err();
    assert!(matches!(err, ConversionError::SchemaError(_)));
}

#[test]
fn test_duplicate_channel_name_rejected() {
    let err = PyramidPlan::from_table(&table(&["A", "A"], &[(0, "A", 0), (1, "A", 0)])).unwrap_err();
    assert!(matches!(err, ConversionError::SchemaError(_)));
}

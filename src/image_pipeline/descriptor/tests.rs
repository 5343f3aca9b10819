use crate::image_pipeline::descriptor::{DescriptorError, parse_descriptor};

fn descriptor(channels: &[&str], planes: &[(usize, usize, u32)]) -> String {
    let mut text = String::from("<root>\n<channels>\n");
    for (id, name) in channels.iter().enumerate() {
        text.push_str(&format!("<channel id=\"{}\" name=\"{}\"/>\n", id, name));
    }
    text.push_str("</channels>\n<pixels>\n");
    for (page, channel, level) in planes {
        text.push_str(&format!(
            "<plane x=\"0\" y=\"0\" page=\"{}\" channel=\"{}\" level=\"{}\"/>\n",
            page, channel, level
        ));
    }
    text.push_str("</pixels>\n</root>");
    text
}

#[test]
fn test_rows_sorted_by_channel_then_level() {
    let text = descriptor(
        &["DAPI", "CD8"],
        &[(3, 1, 0), (1, 0, 1), (0, 0, 0), (4, 1, 1)],
    );
    let table = parse_descriptor(&text).unwrap();

    assert_eq!(table.channel_names, vec!["DAPI", "CD8"]);
    let rows: Vec<(usize, &str, u32)> = table
        .rows
        .iter()
        .map(|r| (r.page, r.channel.as_str(), r.level))
        .collect();
    assert_eq!(
        rows,
        vec![(0, "DAPI", 0), (1, "DAPI", 1), (3, "CD8", 0), (4, "CD8", 1)]
    );
}

#[test]
fn test_channel_order_follows_declared_index() {
    // CD8 rows come first in the text but DAPI is declared with index 0.
    let text = descriptor(&["DAPI", "CD8"], &[(5, 1, 0), (2, 0, 0)]);
    let table = parse_descriptor(&text).unwrap();
    assert_eq!(table.rows[0].channel, "DAPI");
    assert_eq!(table.rows[1].channel, "CD8");
}

#[test]
fn test_rows_without_channel_discriminator_are_skipped() {
    let text = "<channels><channel name=\"A\"/></channels>\n<pixels>\n\
                <plane x=\"0\" y=\"0\" page=\"0\" channel=\"0\" level=\"0\"/>\n\
                <overview x=\"0\" y=\"0\" page=\"9\" kind=\"label\" level=\"0\"/>\n\
                <short page=\"1\"/>\n\
                </pixels>";
    let table = parse_descriptor(text).unwrap();
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0].page, 0);
}

#[test]
fn test_missing_channel_segment() {
    let text = "<pixels>\n<plane x=\"0\" y=\"0\" page=\"0\" channel=\"0\" level=\"0\"/>\n</pixels>";
    assert_eq!(
        parse_descriptor(text).unwrap_err(),
        DescriptorError::MissingSegment("channels")
    );
}

#[test]
fn test_missing_pixel_segment_end() {
    let text = "<channels><channel name=\"A\"/></channels><pixels>\n";
    assert_eq!(
        parse_descriptor(text).unwrap_err(),
        DescriptorError::MissingSegment("pixels")
    );
}

#[test]
fn test_non_integer_level() {
    let text = "<channels><channel name=\"A\"/></channels>\n<pixels>\n\
                <plane x=\"0\" y=\"0\" page=\"0\" channel=\"0\" level=\"zero\"/>\n</pixels>";
    match parse_descriptor(text).unwrap_err() {
        DescriptorError::InvalidInteger { line, field, value } => {
            assert_eq!(line, 3);
            assert_eq!(field, "level");
            assert_eq!(value, "zero");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_negative_page_is_rejected() {
    let text = descriptor(&["A"], &[]).replace(
        "</pixels>",
        "<plane x=\"0\" y=\"0\" page=\"-1\" channel=\"0\" level=\"0\"/>\n</pixels>",
    );
    assert!(matches!(
        parse_descriptor(&text).unwrap_err(),
        DescriptorError::InvalidInteger { field: "page", .. }
    ));
}

#[test]
fn test_channel_index_out_of_range() {
    let text = descriptor(&["A"], &[(0, 0, 0), (1, 2, 0)]);
    assert!(matches!(
        parse_descriptor(&text).unwrap_err(),
        DescriptorError::ChannelOutOfRange {
            index: 2,
            declared: 1,
            ..
        }
    ));
}

#[test]
fn test_malformed_plane_line() {
    let text = "<channels><channel name=\"A\"/></channels>\n<pixels>\n<plane page=\"0/>\n</pixels>";
    assert!(matches!(
        parse_descriptor(text).unwrap_err(),
        DescriptorError::Malformed { .. }
    ));
}

#[test]
fn test_record_on_pixels_opening_line_is_ignored() {
    let text = "<channels><channel name=\"A\"/></channels>\n\
                <pixels><plane x=\"0\" y=\"0\" page=\"9\" channel=\"0\" level=\"0\"/>\n\
                <plane x=\"0\" y=\"0\" page=\"1\" channel=\"0\" level=\"1\"/>\n\
                </pixels>";
    let table = parse_descriptor(text).unwrap();
    assert_eq!(table.rows.len(), 1);
    assert_eq!((table.rows[0].page, table.rows[0].level), (1, 1));
}

#[test]
fn test_numeric_reference_in_channel_name() {
    let text = descriptor(&["Ki&#45;67", "CD3 &amp; CD8"], &[(0, 0, 0), (1, 1, 0)]);
    let table = parse_descriptor(&text).unwrap();
    assert_eq!(table.channel_names, vec!["Ki-67", "CD3 & CD8"]);
}

#[test]
fn test_text_inside_channel_element() {
    let text = "<channels>\n<channel id=\"0\" name=\"A\">gain < 2</channel>\n\
                <channel id=\"1\" name=\"B\"/>\n</channels>\n<pixels>\n\
                <plane x=\"0\" y=\"0\" page=\"0\" channel=\"1\" level=\"0\"/>\n</pixels>";
    let table = parse_descriptor(text).unwrap();
    assert_eq!(table.channel_names, vec!["A", "B"]);
    assert_eq!(table.rows[0].channel, "B");
}

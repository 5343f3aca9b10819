use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::image_pipeline::descriptor::{ChannelLevelEntry, PageTable};
use crate::image_pipeline::ome::{OME_NAMESPACE, OmeMetadata};
use crate::image_pipeline::pyramid::PyramidPlan;

fn plan(channels: usize, max_level: u32) -> PyramidPlan {
    let names: Vec<String> = (0..channels).map(|c| format!("Marker {c}")).collect();
    let mut rows = Vec::new();
    for name in &names {
        for level in 0..=max_level {
            rows.push(ChannelLevelEntry {
                page: rows.len(),
                channel: name.clone(),
                level,
            });
        }
    }
    PyramidPlan::from_table(&PageTable {
        channel_names: names,
        rows,
    })
    .unwrap()
}

fn attribute(element: &BytesStart, name: &str) -> Option<String> {
    element
        .attributes()
        .map(|a| a.unwrap())
        .find(|a| a.key.as_ref() == name.as_bytes())
        .map(|a| String::from_utf8(a.value.into_owned()).unwrap())
}

/// Elements named `name`, in document order, as attribute lookups.
fn elements(xml: &str, name: &str) -> Vec<BytesStart<'static>> {
    let mut reader = Reader::from_str(xml);
    let mut found = Vec::new();
    loop {
        match reader.read_event().unwrap() {
            Event::Start(e) | Event::Empty(e) if e.name().as_ref() == name.as_bytes() => {
                found.push(e.into_owned())
            }
            Event::Eof => break,
            _ => {}
        }
    }
    found
}

#[test]
fn test_tiff_data_offsets_match_page_layout() {
    for channels in [1usize, 3] {
        for max_level in [0u32, 2] {
            let plan = plan(channels, max_level);
            let xml = OmeMetadata::new(&plan, 1024, 768, "uint16", 0.5).to_xml().unwrap();

            let tiff_data = elements(&xml, "TiffData");
            assert_eq!(tiff_data.len(), channels);
            for (i, element) in tiff_data.iter().enumerate() {
                let ifd: usize = attribute(element, "IFD").unwrap().parse().unwrap();
                let planes: usize = attribute(element, "PlaneCount").unwrap().parse().unwrap();
                assert_eq!(ifd, i * (max_level as usize + 1));
                assert_eq!(planes, max_level as usize + 1);
                assert_eq!(attribute(element, "FirstC").unwrap(), i.to_string());
            }
        }
    }
}

#[test]
fn test_pixels_descriptor() {
    let plan = plan(3, 1);
    let xml = OmeMetadata::new(&plan, 2048, 1536, "float", 0.25).to_xml().unwrap();

    let ome = elements(&xml, "OME");
    assert_eq!(attribute(&ome[0], "xmlns").unwrap(), OME_NAMESPACE);

    let pixels = elements(&xml, "Pixels");
    assert_eq!(pixels.len(), 1);
    let p = &pixels[0];
    assert_eq!(attribute(p, "SizeX").unwrap(), "2048");
    assert_eq!(attribute(p, "SizeY").unwrap(), "1536");
    assert_eq!(attribute(p, "SizeC").unwrap(), "3");
    assert_eq!(attribute(p, "SizeZ").unwrap(), "1");
    assert_eq!(attribute(p, "SizeT").unwrap(), "1");
    assert_eq!(attribute(p, "Type").unwrap(), "float");
    assert_eq!(attribute(p, "Interleaved").unwrap(), "false");
    assert_eq!(attribute(p, "PhysicalSizeX").unwrap(), "0.25");
    assert_eq!(attribute(p, "DimensionOrder").unwrap(), "XYCZT");
}

#[test]
fn test_channels_in_plan_order_before_tiff_data() {
    let plan = plan(3, 0);
    let xml = OmeMetadata::new(&plan, 10, 10, "uint8", 0.5).to_xml().unwrap();

    let channels = elements(&xml, "Channel");
    let ids: Vec<String> = channels.iter().map(|c| attribute(c, "ID").unwrap()).collect();
    let names: Vec<String> = channels.iter().map(|c| attribute(c, "Name").unwrap()).collect();
    assert_eq!(ids, vec!["Channel:0:0", "Channel:0:1", "Channel:0:2"]);
    assert_eq!(names, vec!["Marker 0", "Marker 1", "Marker 2"]);

    let last_channel = xml.rfind("<Channel ").unwrap();
    let first_tiff_data = xml.find("<TiffData ").unwrap();
    assert!(last_channel < first_tiff_data);
}

#[test]
fn test_document_is_ascii() {
    let plan = plan(1, 0);
    let mut metadata = OmeMetadata::new(&plan, 8, 8, "uint8", 0.5);
    metadata.channels = vec!["CD3 & Ki-67 (µm)".to_string()];
    let xml = metadata.to_xml().unwrap();
    assert!(xml.is_ascii());
    assert!(xml.contains("Name=\"CD3 &amp; Ki-67 (&#xB5;m)\""));
}

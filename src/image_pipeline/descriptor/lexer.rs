//! Tokenizer for the markup fragments found inside the layout descriptor.
//!
//! Only start and empty-element tags are produced. Closing tags, comments,
//! processing instructions and character data are skipped. Attribute order
//! is preserved because plane records are identified by position. Segments
//! are fragments, so unbalanced end tags are tolerated.

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::image_pipeline::descriptor::error::DescriptorError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attributes: Vec<Attribute>,
    /// 1-based line of the opening `<`
    pub line: usize,
}

/// Splits `text` into tags. `first_line` is the line number of the first
/// byte of `text` within the whole descriptor.
pub fn tokenize(text: &str, first_line: usize) -> Result<Vec<Tag>, DescriptorError> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().check_end_names = false;

    let line_at = |pos: usize| {
        let end = pos.min(text.len());
        first_line + text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count()
    };

    let mut tags = Vec::new();
    loop {
        let start = reader.buffer_position() as usize;
        let element = match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => e,
            Ok(Event::Eof) => break,
            Ok(_) => continue,
            Err(e) => return Err(malformed(line_at(reader.error_position() as usize), e)),
        };

        // A stray `<` in character data reads as a nameless tag.
        let name = String::from_utf8_lossy(element.name().as_ref()).into_owned();
        if name.is_empty() {
            continue;
        }

        let line = line_at(start);
        let attributes = element
            .attributes()
            .map(|attr| -> Result<Attribute, DescriptorError> {
                let attr = attr.map_err(|e| malformed(line, e))?;
                let value = attr.unescape_value().map_err(|e| malformed(line, e))?;
                Ok(Attribute {
                    name: String::from_utf8_lossy(attr.key.as_ref()).into_owned(),
                    value: value.into_owned(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tags.push(Tag {
            name,
            attributes,
            line,
        });
    }
    Ok(tags)
}

fn malformed(line: usize, reason: impl ToString) -> DescriptorError {
    DescriptorError::Malformed {
        line,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(tag: &Tag) -> Vec<&str> {
        tag.attributes.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn test_attributes_keep_order() {
        let tags = tokenize(r#"<plane a="1" b = '2' page="7"/>"#, 1).unwrap();
        assert_eq!(tags.len(), 1);
        assert_eq!(tags[0].name, "plane");
        assert_eq!(names(&tags[0]), vec!["a", "b", "page"]);
        assert_eq!(tags[0].attributes[1].value, "2");
    }

    #[test]
    fn test_skips_closing_tags_and_comments() {
        let text = "<a x=\"1\">text</a>\n<!-- <b y=\"2\"/> -->\n<c z=\"3\"/>";
        let tags = tokenize(text, 10).unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].line, 10);
        assert_eq!(tags[1].name, "c");
        assert_eq!(tags[1].line, 12);
    }

    #[test]
    fn test_unterminated_value_is_malformed() {
        let err = tokenize("\n<plane page=\"3/>", 1).unwrap_err();
        assert!(matches!(err, DescriptorError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_missing_equals_is_malformed() {
        let err = tokenize("<plane page \"3\"/>", 1).unwrap_err();
        assert!(matches!(err, DescriptorError::Malformed { line: 1, .. }));
    }

    #[test]
    fn test_entities_are_unescaped() {
        let tags = tokenize(r#"<channel name="CD3 &amp; CD8"/>"#, 1).unwrap();
        assert_eq!(tags[0].attributes[0].value, "CD3 & CD8");
    }

    #[test]
    fn test_character_references_are_decoded() {
        let tags = tokenize(r#"<channel name="Ki&#45;67"/>"#, 1).unwrap();
        assert_eq!(tags[0].attributes[0].value, "Ki-67");
    }

    #[test]
    fn test_stray_angle_bracket_in_text_is_ignored() {
        let text = "<channel id=\"0\" name=\"A\"/>\n<channel id=\"1\" name=\"B\">gain < 2</channel>\n<channel id=\"2\" name=\"C\"/>";
        let tags = tokenize(text, 1).unwrap();
        let names: Vec<&str> = tags.iter().map(|t| t.attributes[1].value.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(tags[1].line, 2);
        assert_eq!(tags[2].line, 3);
    }
}

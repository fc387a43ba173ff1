//! Streaming collection of record elements from the XML exports.
//! Records may be interleaved with any other elements and keep their text verbatim.

use crate::error::Result;
use quick_xml::errors::IllFormedError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// One record element: its attributes and its character data.
#[derive(Debug, Clone, Default, PartialEq)]
pub(super) struct Element {
    attributes: Vec<(String, String)>,
    pub text: String,
}

impl Element {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Collect every `<tag>` element of the document in order.
/// The way this works is by reading events with text trimming off, so the
/// character data of a record is kept exactly as written. Any ill-formed XML
/// fails the whole document.
pub(super) fn collect_elements(content: &str, tag: &str) -> Result<Vec<Element>> {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut elements = Vec::new();
    let mut current: Option<Element> = None;
    let mut depth = 0usize;
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                if current.is_some() {
                    depth += 1;
                } else if e.local_name().as_ref() == tag.as_bytes() {
                    current = Some(read_attributes(&reader, &e)?);
                }
            }
            Event::Empty(e) => {
                if current.is_none() && e.local_name().as_ref() == tag.as_bytes() {
                    elements.push(read_attributes(&reader, &e)?);
                }
            }
            Event::Text(e) => {
                if let Some(element) = current.as_mut() {
                    element.text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(element) = current.as_mut() {
                    element.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Event::End(_) => {
                if depth > 0 {
                    depth -= 1;
                } else if let Some(element) = current.take() {
                    elements.push(element);
                }
            }
            Event::Eof => {
                if current.is_some() {
                    let missing = IllFormedError::MissingEndTag(tag.to_string());
                    return Err(quick_xml::Error::IllFormed(missing).into());
                }
                break;
            }
            _ => {}
        }
    }
    Ok(elements)
}

fn read_attributes(reader: &Reader<&[u8]>, start: &BytesStart<'_>) -> Result<Element> {
    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.decode_and_unescape_value(reader.decoder())?.into_owned();
        attributes.push((key, value));
    }
    Ok(Element {
        attributes,
        text: String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    /// Ensure records interleaved with other elements are all collected.
    #[test]
    fn collects_interleaved_records() {
        let xml = r#"<?xml version="1.0"?><packet><chat no="1">a</chat><thread thread="1"/><chat no="2">b</chat></packet>"#;
        let elements = collect_elements(xml, "chat").unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].attribute("no"), Some("1"));
        assert_eq!(elements[1].text, "b");
    }

    /// Ensure character data keeps surrounding whitespace and entities are decoded.
    #[test]
    fn keeps_text_verbatim() {
        let xml = r#"<i><d p="x">  a &amp; b  </d><d p="y"/></i>"#;
        let elements = collect_elements(xml, "d").unwrap();
        assert_eq!(elements[0].text, "  a & b  ");
        assert_eq!(elements[1].attribute("p"), Some("y"));
        assert_eq!(elements[1].text, "");
    }

    /// Ensure mismatched or missing end tags fail the document.
    #[test]
    fn rejects_ill_formed_documents() {
        assert!(matches!(
            collect_elements("<i><d p=\"1\">x</i>", "d"),
            Err(Error::Xml(_))
        ));
        assert!(matches!(
            collect_elements("<i><d p=\"1\">x", "d"),
            Err(Error::Xml(_))
        ));
    }
}

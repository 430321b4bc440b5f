//! XML transformer.
//!
//! Elements are read with a `quick-xml` event reader into the document tree.
//! An element that has only text (no attributes, no child elements) becomes a
//! text node, so `<value>18</value>` and `"value": 18` look the same to the
//! binding layer. Anything richer stays an [`Element`] with its attributes,
//! children and trimmed text kept apart.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::{DecodeError, Document, Element, Format, Node, Transformer};

/// Decodes XML bodies.
///
/// Element and attribute names keep their namespace prefixes as written;
/// `xmlns` declarations are not reported as attributes.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlTransformer;

impl Transformer for XmlTransformer {
    fn format(&self) -> Format {
        Format::Xml
    }

    fn decode(&self, text: &str) -> Result<Document, DecodeError> {
        parse_xml(text, false, Format::Xml)
    }
}

struct Frame {
    name: String,
    element: Element,
    text: String,
}

impl Frame {
    /// Appends a trimmed text fragment, separated from earlier fragments by a space.
    fn push_text(&mut self, fragment: &str) {
        if fragment.is_empty() {
            return;
        }
        if !self.text.is_empty() {
            self.text.push(' ');
        }
        self.text.push_str(fragment);
    }

    fn finish(self) -> (String, Node) {
        let Frame {
            name,
            mut element,
            text,
        } = self;
        if element.attributes.is_empty() && element.children.is_empty() {
            return (name, Node::Text(text));
        }
        if !text.is_empty() {
            element.text = Some(text);
        }
        (name, Node::Element(element))
    }
}

/// Parses `text` into a document named after its root element.
///
/// With `strip_prefixes`, element and attribute names are reduced to their
/// local part (`atom:link` becomes `link`). Errors are reported against
/// `format`.
pub(crate) fn parse_xml(text: &str, strip_prefixes: bool, format: Format) -> Result<Document, DecodeError> {
    let malformed = |message: String| DecodeError::new(format, message);

    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Frame> = Vec::new();
    let mut root: Option<(String, Node)> = None;

    loop {
        let event = reader.read_event().map_err(|e| {
            malformed(format!("{e} at byte {}", reader.buffer_position()))
        })?;
        let finished = match event {
            Event::Start(e) => {
                stack.push(open(&e, strip_prefixes).map_err(malformed)?);
                None
            }
            Event::Empty(e) => Some(open(&e, strip_prefixes).map_err(malformed)?),
            Event::End(e) => {
                let name = qualified(e.name().as_ref(), e.local_name().as_ref(), strip_prefixes);
                match stack.pop() {
                    Some(frame) if frame.name == name => Some(frame),
                    Some(frame) => {
                        return Err(malformed(format!(
                            "expected </{}>, found </{name}>",
                            frame.name
                        )))
                    }
                    None => return Err(malformed(format!("unexpected </{name}>"))),
                }
            }
            Event::Text(e) => {
                let text = e.unescape().map_err(|e| malformed(e.to_string()))?;
                if let Some(frame) = stack.last_mut() {
                    frame.push_text(&text);
                }
                None
            }
            Event::CData(e) => {
                if let Some(frame) = stack.last_mut() {
                    frame.text.push_str(&String::from_utf8_lossy(&e));
                }
                None
            }
            Event::Eof => break,
            _ => None,
        };

        let Some(frame) = finished else { continue };
        let (name, node) = frame.finish();
        match stack.last_mut() {
            Some(parent) => parent.element.children.push((name, node)),
            None if root.is_some() => {
                return Err(malformed(format!("second root element <{name}>")));
            }
            None => root = Some((name, node)),
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(format!("unclosed element <{}>", open.name)));
    }
    let (name, node) = root.ok_or_else(|| malformed("no root element".to_string()))?;
    Ok(Document::named(name, node))
}

fn open(start: &BytesStart<'_>, strip_prefixes: bool) -> Result<Frame, String> {
    let name = qualified(start.name().as_ref(), start.local_name().as_ref(), strip_prefixes);
    let mut element = Element::default();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| e.to_string())?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let key = qualified(key, attr.key.local_name().as_ref(), strip_prefixes);
        let value = attr.unescape_value().map_err(|e| e.to_string())?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(Frame {
        name,
        element,
        text: String::new(),
    })
}

fn qualified(full: &[u8], local: &[u8], strip_prefixes: bool) -> String {
    let bytes = if strip_prefixes { local } else { full };
    String::from_utf8_lossy(bytes).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AliasMap, Entity, FieldBinding, TransformError, TransformExt};

    #[derive(Debug, Default, PartialEq)]
    struct Status {
        message: String,
        value: u32,
    }

    impl Entity for Status {
        const TYPE_NAME: &'static str = "Status";

        fn bindings() -> Vec<FieldBinding<Self>> {
            vec![
                FieldBinding::text("message", |s, v| s.message = v),
                FieldBinding::parsed("value", |s, v| s.value = v),
            ]
        }
    }

    #[test]
    fn test_element_and_attribute_forms_bind_equally() {
        let as_elements = r#"<?xml version="1.0" encoding="UTF-8"?>
<geonames>
  <status>
    <message>the daily limit of 30000 credits has been exceeded</message>
    <value>18</value>
  </status>
</geonames>"#;
        let as_attributes = r#"<geonames>
  <status message="the daily limit of 30000 credits has been exceeded" value="18"/>
</geonames>"#;

        let from_elements: Vec<Status> = XmlTransformer
            .transform(as_elements, &AliasMap::root("geonames/status"))
            .unwrap();
        let attribute_alias = AliasMap::builder()
            .root_key("geonames/status")
            .attribute("Status", "message")
            .attribute("Status", "value")
            .build();
        let from_attributes: Vec<Status> = XmlTransformer.transform(as_attributes, &attribute_alias).unwrap();

        assert_eq!(from_elements.len(), 1);
        assert_eq!(from_elements, from_attributes);
        assert_eq!(from_elements[0].value, 18);
    }

    #[test]
    fn test_repeated_siblings_yield_each_entity() {
        let body = "<list><status><value>1</value></status><status><value>2</value></status></list>";
        let statuses: Vec<Status> = XmlTransformer.transform(body, &AliasMap::root("status")).unwrap();
        assert_eq!(statuses.iter().map(|s| s.value).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_unresolved_root_is_empty() {
        let body = "<geonames><status><value>1</value></status></geonames>";
        let statuses: Vec<Status> = XmlTransformer.transform(body, &AliasMap::root("geonames/error")).unwrap();
        assert!(statuses.is_empty());
    }

    #[test]
    fn test_text_only_elements_become_text_nodes() {
        let doc = XmlTransformer
            .decode(r#"<a><b>x &amp; y</b><c/><d k="v">t</d><e><![CDATA[<raw>]]></e></a>"#)
            .unwrap();
        assert_eq!(doc.root_name(), Some("a"));
        let root = doc.root().as_element().unwrap();
        assert_eq!(root.child("b"), Some(&Node::Text("x & y".to_string())));
        assert_eq!(root.child("c"), Some(&Node::Text(String::new())));
        let d = root.child("d").and_then(Node::as_element).unwrap();
        assert_eq!(d.attribute("k"), Some("v"));
        assert_eq!(d.text.as_deref(), Some("t"));
        assert_eq!(root.child("e").and_then(Node::as_text), Some("<raw>"));
    }

    #[test]
    fn test_mixed_content_text_is_space_separated() {
        let doc = XmlTransformer.decode("<p>Hello <b>x</b> world</p>").unwrap();
        let p = doc.root().as_element().unwrap();
        assert_eq!(p.text.as_deref(), Some("Hello world"));
        assert_eq!(p.child("b").and_then(Node::as_text), Some("x"));
    }

    #[test]
    fn test_root_named_like_its_children_yields_the_children() {
        let body = "<status><status><value>1</value></status><status><value>2</value></status></status>";
        let statuses: Vec<Status> = XmlTransformer.transform(body, &AliasMap::root("status")).unwrap();
        assert_eq!(statuses.iter().map(|s| s.value).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_prefixes_kept_and_xmlns_skipped() {
        let doc = XmlTransformer
            .decode(r#"<r xmlns="urn:a" xmlns:g="urn:g"><g:pt g:lat="1"/></r>"#)
            .unwrap();
        let root = doc.root().as_element().unwrap();
        assert!(root.attributes.is_empty());
        let pt = root.child("g:pt").and_then(Node::as_element).unwrap();
        assert_eq!(pt.attribute("g:lat"), Some("1"));

        let stripped = parse_xml(r#"<r xmlns:g="urn:g"><g:pt g:lat="1"/></r>"#, true, Format::Xml).unwrap();
        let pt = stripped.root().as_element().unwrap().child("pt").and_then(Node::as_element).unwrap();
        assert_eq!(pt.attribute("lat"), Some("1"));
    }

    #[test]
    fn test_malformed_documents_are_decode_errors() {
        for body in ["<a><b></a>", "<a>", "", "<a/><b/>"] {
            let err = XmlTransformer
                .transform::<Status>(body, &AliasMap::root("a"))
                .unwrap_err();
            assert!(
                matches!(err, TransformError::Decode(ref e) if e.format == Format::Xml),
                "{body:?} gave {err:?}"
            );
        }
    }
}

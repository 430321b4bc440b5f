//! YAML transformer.

use serde_yaml::Value;

use crate::{DecodeError, Document, Element, Format, Node, Transformer};

/// Decodes YAML bodies with `serde_yaml`.
///
/// Mappings become elements and sequences become lists. Non-string keys are
/// rendered as text (`1: a` has a child named `"1"`), and tags are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlTransformer;

impl Transformer for YamlTransformer {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn decode(&self, text: &str) -> Result<Document, DecodeError> {
        let value: Value =
            serde_yaml::from_str(text).map_err(|e| DecodeError::new(Format::Yaml, e.to_string()))?;
        Ok(Document::new(to_node(value)))
    }
}

fn to_node(value: Value) -> Node {
    match value {
        Value::Null => Node::Null,
        Value::Sequence(items) => Node::List(items.into_iter().map(to_node).collect()),
        Value::Mapping(map) => Node::Element(Element {
            children: map
                .into_iter()
                .map(|(key, value)| (key_text(key), to_node(value)))
                .collect(),
            ..Default::default()
        }),
        Value::Tagged(tagged) => to_node(tagged.value),
        scalar => Node::Text(scalar_text(&scalar).unwrap_or_default()),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn key_text(key: Value) -> String {
    match key {
        Value::Tagged(tagged) => key_text(tagged.value),
        Value::Null => String::new(),
        other => scalar_text(&other).unwrap_or_else(|| {
            serde_yaml::to_string(&other)
                .map(|s| s.trim_end().to_string())
                .unwrap_or_default()
        }),
    }
}

//! JSON transformer.

use crate::{DecodeError, Document, Format, Node, Transformer};

/// Decodes JSON bodies with `serde_json`.
///
/// Objects become elements, arrays become lists and every scalar becomes
/// text, so `"productId": 7515478` and `"productId": "7515478"` bind the same.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTransformer;

impl Transformer for JsonTransformer {
    fn format(&self) -> Format {
        Format::Json
    }

    fn decode(&self, text: &str) -> Result<Document, DecodeError> {
        let value: serde_json::Value =
            serde_json::from_str(text).map_err(|e| DecodeError::new(Format::Json, e.to_string()))?;
        Ok(Document::new(Node::from_json(value)))
    }
}

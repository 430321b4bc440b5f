//! Format-neutral document tree.
//!
//! Every transformer decodes its input into a [`Document`]. JSON objects and
//! YAML mappings become [`Element`]s whose children are their members; XML
//! elements keep their attributes separately from their child elements so the
//! alias map can choose between the two. Scalars of every format are
//! [`Node::Text`] in their canonical textual form.

use serde_json::{Map, Value};

/// A decoded document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    root_name: Option<String>,
    root: Node,
}

impl Document {
    /// Creates an anonymous document (JSON, YAML).
    pub fn new(root: Node) -> Self {
        Self {
            root_name: None,
            root,
        }
    }

    /// Creates a document whose root carries a name (the XML root element).
    pub fn named(name: impl Into<String>, root: Node) -> Self {
        Self {
            root_name: Some(name.into()),
            root,
        }
    }

    /// Returns the root element's name, if the format has one.
    pub fn root_name(&self) -> Option<&str> {
        self.root_name.as_deref()
    }

    /// Returns the root node.
    pub fn root(&self) -> &Node {
        &self.root
    }
}

/// One node of a decoded document.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// JSON `null`, YAML `~`.
    Null,
    /// Any scalar: strings, numbers, booleans, XML text-only elements.
    Text(String),
    /// An ordered sequence.
    List(Vec<Node>),
    /// A structured node with named children and, for XML, attributes.
    Element(Element),
}

impl Node {
    /// Returns the node's text: the scalar itself, or the text content of an
    /// element that has no child elements.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Element(e) if e.children.is_empty() => e.text.as_deref(),
            _ => None,
        }
    }

    /// Returns the node as an element.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns `true` for [`Node::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Expands the node into collection items.
    ///
    /// Lists yield their items (nested lists are flattened), `Null` yields
    /// nothing, anything else yields itself.
    pub fn items(&self) -> Vec<&Node> {
        match self {
            Self::Null => Vec::new(),
            Self::List(items) => items.iter().flat_map(Node::items).collect(),
            other => vec![other],
        }
    }

    /// Converts a JSON value into a node.
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Text(b.to_string()),
            Value::Number(n) => Self::Text(n.to_string()),
            Value::String(s) => Self::Text(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Element(Element {
                children: map
                    .into_iter()
                    .map(|(k, v)| (k, Self::from_json(v)))
                    .collect(),
                ..Default::default()
            }),
        }
    }

    /// Renders the node as JSON.
    ///
    /// Attributes are written as `@name` members and mixed text as `#text`;
    /// repeated child names collapse into arrays.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Null => Value::Null,
            Self::Text(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(Node::to_json).collect()),
            Self::Element(e) => {
                let mut map = Map::new();
                for (name, value) in &e.attributes {
                    map.insert(format!("@{name}"), Value::String(value.clone()));
                }
                for (name, _) in &e.children {
                    if map.contains_key(name) {
                        continue;
                    }
                    let mut same: Vec<Value> = e
                        .children
                        .iter()
                        .filter(|(n, _)| n == name)
                        .map(|(_, child)| child.to_json())
                        .collect();
                    let value = if same.len() == 1 {
                        same.remove(0)
                    } else {
                        Value::Array(same)
                    };
                    map.insert(name.clone(), value);
                }
                if let Some(text) = &e.text {
                    map.insert("#text".to_string(), Value::String(text.clone()));
                }
                Value::Object(map)
            }
        }
    }
}

/// A structured node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    /// XML attributes in document order. Always empty for JSON and YAML.
    pub attributes: Vec<(String, String)>,
    /// Named children in document order. Names may repeat (XML siblings).
    pub children: Vec<(String, Node)>,
    /// Text content of an XML element that also has attributes or children.
    pub text: Option<String>,
}

impl Element {
    /// Returns every child named `name`, expanding list-valued children.
    pub fn children_named(&self, name: &str) -> Vec<&Node> {
        self.children
            .iter()
            .filter(|(n, _)| n == name)
            .flat_map(|(_, node)| node.items())
            .collect()
    }

    /// Returns the first child named `name`, as stored.
    pub fn child(&self, name: &str) -> Option<&Node> {
        self.children
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, node)| node)
    }

    /// Returns the value of the attribute named `name`.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

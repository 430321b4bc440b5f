//! Alias maps: where entities live in a document and how their fields are read.
//!
//! An [`AliasMap`] has two independent parts:
//!
//! 1. An optional **root key**: a `/`-separated path to the node (or nodes)
//!    holding the entity collection. `None` means "the whole document".
//! 2. **Per-type binding modes**: for each entity type identifier, which fields
//!    are read from attributes and which from child elements. Two explicit
//!    maps; a field absent from both is read from child elements.
//!
//! Alias maps are immutable once built and can be shared across threads.
//!
//! ```rust,ignore
//! let alias = AliasMap::builder()
//!     .root_key("geonames/status")
//!     .attribute("Status", "message")
//!     .attribute("Status", "value")
//!     .build();
//! ```

use std::collections::{BTreeMap, BTreeSet};

use crate::{Document, Node};

/// Where a field's value is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindingMode {
    /// From a child element (or JSON/YAML member) with the field's name.
    Element,
    /// From an attribute of the entity's own element.
    Attribute,
}

/// Declarative description of the entity root and field binding modes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasMap {
    root_key: Option<String>,
    element_bindings: BTreeMap<String, BTreeSet<String>>,
    attribute_bindings: BTreeMap<String, BTreeSet<String>>,
}

impl AliasMap {
    /// An alias that treats the whole decoded document as the entity root.
    pub fn whole_document() -> Self {
        Self::default()
    }

    /// An alias rooted at `key`, with every field bound to elements.
    ///
    /// See [`AliasMap::resolve_root`] for how the key's first segment is
    /// matched against the document's root element.
    pub fn root(key: impl Into<String>) -> Self {
        Self::builder().root_key(key).build()
    }

    /// Starts building an alias.
    pub fn builder() -> AliasMapBuilder {
        AliasMapBuilder::default()
    }

    /// Returns the root key, if any.
    pub fn root_key(&self) -> Option<&str> {
        self.root_key.as_deref()
    }

    /// Returns how `field` of entity type `type_name` is read.
    pub fn binding_mode_for(&self, type_name: &str, field: &str) -> BindingMode {
        let declared = self
            .attribute_bindings
            .get(type_name)
            .is_some_and(|fields| fields.contains(field));
        if declared {
            BindingMode::Attribute
        } else {
            BindingMode::Element
        }
    }

    /// Returns every field name with a declared mode for `type_name`.
    pub fn declared_fields<'a>(&'a self, type_name: &str) -> impl Iterator<Item = &'a str> + 'a {
        let elements = self.element_bindings.get(type_name).into_iter().flatten();
        let attributes = self.attribute_bindings.get(type_name).into_iter().flatten();
        elements.chain(attributes).map(String::as_str)
    }

    /// Locates the entity nodes in `document`.
    ///
    /// - No root key: the document root, expanded if it is a list.
    /// - Otherwise each path segment descends into children of that name,
    ///   flattening lists along the way. The first segment may name the
    ///   document's own root element (XML); when that root also has children
    ///   of the same name, the segment selects those children instead.
    /// - A path that matches nothing yields an empty vector.
    pub fn resolve_root<'d>(&self, document: &'d Document) -> Vec<&'d Node> {
        let segments: Vec<&str> = self
            .root_key
            .as_deref()
            .unwrap_or_default()
            .split('/')
            .filter(|s| !s.is_empty())
            .collect();

        let mut remaining = segments.as_slice();
        if let (Some(first), Some(root_name)) = (remaining.first(), document.root_name()) {
            let shadowed = document
                .root()
                .as_element()
                .is_some_and(|root| !root.children_named(first).is_empty());
            if *first == root_name && !shadowed {
                remaining = &remaining[1..];
            }
        }

        let mut current = document.root().items();
        for segment in remaining {
            current = current
                .into_iter()
                .filter_map(Node::as_element)
                .flat_map(|element| element.children_named(segment))
                .collect();
            if current.is_empty() {
                break;
            }
        }
        current
    }

    /// Returns a copy of `self` with `defaults` filled in.
    ///
    /// `self` wins wherever both declare something: its root key if set, and
    /// its binding mode for any field it declares in either map.
    pub fn merged_with(&self, defaults: &AliasMap) -> AliasMap {
        let mut merged = self.clone();
        if merged.root_key.is_none() {
            merged.root_key = defaults.root_key.clone();
        }
        for (target, source) in [
            (&mut merged.element_bindings, &defaults.element_bindings),
            (&mut merged.attribute_bindings, &defaults.attribute_bindings),
        ] {
            for (type_name, fields) in source {
                for field in fields {
                    let declared = self.declared_fields(type_name).any(|f| f == field);
                    if !declared {
                        target
                            .entry(type_name.clone())
                            .or_default()
                            .insert(field.clone());
                    }
                }
            }
        }
        merged
    }
}

/// Builder for [`AliasMap`]. A later declaration for the same field replaces
/// an earlier one.
#[derive(Debug, Clone, Default)]
#[must_use = "call `build()` to obtain an AliasMap"]
pub struct AliasMapBuilder {
    map: AliasMap,
}

impl AliasMapBuilder {
    /// Sets the root key.
    pub fn root_key(mut self, key: impl Into<String>) -> Self {
        self.map.root_key = Some(key.into());
        self
    }

    /// Declares that `field` of `type_name` is read from a child element.
    pub fn element(mut self, type_name: impl Into<String>, field: impl Into<String>) -> Self {
        let (type_name, field) = (type_name.into(), field.into());
        if let Some(fields) = self.map.attribute_bindings.get_mut(&type_name) {
            fields.remove(&field);
        }
        self.map
            .element_bindings
            .entry(type_name)
            .or_default()
            .insert(field);
        self
    }

    /// Declares that `field` of `type_name` is read from an attribute.
    pub fn attribute(mut self, type_name: impl Into<String>, field: impl Into<String>) -> Self {
        let (type_name, field) = (type_name.into(), field.into());
        if let Some(fields) = self.map.element_bindings.get_mut(&type_name) {
            fields.remove(&field);
        }
        self.map
            .attribute_bindings
            .entry(type_name)
            .or_default()
            .insert(field);
        self
    }

    /// Finishes the alias.
    pub fn build(self) -> AliasMap {
        self.map
    }
}

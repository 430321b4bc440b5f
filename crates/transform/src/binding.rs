//! Explicit field-binding tables for target entity types.
//!
//! Every type a transformer can produce implements [`Entity`]: a stable type
//! identifier (used by [`AliasMap`] per-type declarations) and a table of
//! [`FieldBinding`]s naming each document field and how to store it.
//!
//! ```rust,ignore
//! #[derive(Debug, Default)]
//! struct Product {
//!     product_id: u64,
//!     product_name: String,
//! }
//!
//! impl Entity for Product {
//!     const TYPE_NAME: &'static str = "Product";
//!
//!     fn bindings() -> Vec<FieldBinding<Self>> {
//!         vec![
//!             FieldBinding::parsed("productId", |p, v| p.product_id = v),
//!             FieldBinding::text("productName", |p, v| p.product_name = v),
//!         ]
//!     }
//! }
//! ```
//!
//! ## Field policy
//!
//! Entities are always fully constructed. A field whose source is missing,
//! has the wrong shape, or fails coercion keeps its `Default` value and the
//! failure is logged at `debug`. No entity is ever dropped from a sequence
//! because of a field.
//!
//! Table consistency (duplicate field names, alias declarations naming
//! unknown fields) is checked by [`BindingTable::new`] before any document
//! is touched.

use std::str::FromStr;

use tracing::debug;

use crate::errors::FieldError;
use crate::{AliasMap, BindingError, BindingMode, Node};

/// A type that can be produced by a transformer.
pub trait Entity: Default + Sized + 'static {
    /// Identifier used for this type in [`AliasMap`] declarations.
    const TYPE_NAME: &'static str;

    /// Returns the type's binding table.
    fn bindings() -> Vec<FieldBinding<Self>>;
}

/// The raw value found for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSource<'a> {
    /// Child nodes with the field's name (lists already expanded).
    Nodes(Vec<&'a Node>),
    /// An attribute value.
    Attribute(&'a str),
}

type BindFn<T> = Box<dyn Fn(&mut T, &FieldSource<'_>, &AliasMap) -> Result<(), FieldError> + Send + Sync>;
type CheckFn = fn(&AliasMap, &mut Vec<&'static str>) -> Result<(), BindingError>;

/// How one named document field is stored on an entity of type `T`.
pub struct FieldBinding<T> {
    name: &'static str,
    bind: BindFn<T>,
    nested: Option<CheckFn>,
}

impl<T> std::fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldBinding")
            .field("name", &self.name)
            .field("nested", &self.nested.is_some())
            .finish()
    }
}

impl<T: 'static> FieldBinding<T> {
    /// Binds a text field.
    pub fn text(name: &'static str, set: fn(&mut T, String)) -> Self {
        Self {
            name,
            bind: Box::new(move |entity: &mut T, source: &FieldSource<'_>, _: &AliasMap| {
                set(entity, scalar(source)?.to_string());
                Ok(())
            }),
            nested: None,
        }
    }

    /// Binds a field parsed from text with [`FromStr`] (numbers, booleans, ...).
    ///
    /// Surrounding whitespace is ignored, so `"7515478"` and `" 18 "` both
    /// coerce to integers.
    pub fn parsed<V>(name: &'static str, set: fn(&mut T, V)) -> Self
    where
        V: FromStr + 'static,
        V::Err: std::fmt::Display,
    {
        Self {
            name,
            bind: Box::new(move |entity: &mut T, source: &FieldSource<'_>, _: &AliasMap| {
                let raw = scalar(source)?.trim();
                let value = raw.parse::<V>().map_err(|e| FieldError::Coercion {
                    value: raw.to_string(),
                    target: std::any::type_name::<V>(),
                    message: e.to_string(),
                })?;
                set(entity, value);
                Ok(())
            }),
            nested: None,
        }
    }

    /// Binds every occurrence of a repeated text field.
    pub fn texts(name: &'static str, set: fn(&mut T, Vec<String>)) -> Self {
        Self {
            name,
            bind: Box::new(move |entity: &mut T, source: &FieldSource<'_>, _: &AliasMap| {
                let values = match source {
                    FieldSource::Attribute(value) => vec![value.to_string()],
                    FieldSource::Nodes(nodes) => nodes
                        .iter()
                        .filter_map(|n| n.as_text())
                        .map(str::to_string)
                        .collect(),
                };
                set(entity, values);
                Ok(())
            }),
            nested: None,
        }
    }

    /// Binds a nested entity from the first matching node.
    pub fn entity<E: Entity>(name: &'static str, set: fn(&mut T, E)) -> Self {
        Self {
            name,
            bind: Box::new(move |entity: &mut T, source: &FieldSource<'_>, alias: &AliasMap| {
                let node = structured(source)?
                    .first()
                    .copied()
                    .ok_or(FieldError::NotStructured)?;
                set(entity, BindingTable::<E>::unchecked().bind(node, alias));
                Ok(())
            }),
            nested: Some(BindingTable::<E>::check),
        }
    }

    /// Binds every matching node as a nested entity.
    pub fn entities<E: Entity>(name: &'static str, set: fn(&mut T, Vec<E>)) -> Self {
        Self {
            name,
            bind: Box::new(move |entity: &mut T, source: &FieldSource<'_>, alias: &AliasMap| {
                let table = BindingTable::<E>::unchecked();
                let items = structured(source)?
                    .iter()
                    .map(|node| table.bind(node, alias))
                    .collect();
                set(entity, items);
                Ok(())
            }),
            nested: Some(BindingTable::<E>::check),
        }
    }

    /// Returns the document field name.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

fn scalar<'a>(source: &FieldSource<'a>) -> Result<&'a str, FieldError> {
    match source {
        FieldSource::Attribute(value) => Ok(value),
        FieldSource::Nodes(nodes) => nodes
            .first()
            .and_then(|n| n.as_text())
            .ok_or(FieldError::NotScalar),
    }
}

fn structured<'s, 'a>(source: &'s FieldSource<'a>) -> Result<&'s [&'a Node], FieldError> {
    match source {
        FieldSource::Nodes(nodes) => Ok(nodes),
        FieldSource::Attribute(_) => Err(FieldError::NotStructured),
    }
}

/// A validated binding table for entity type `T`.
#[derive(Debug)]
pub struct BindingTable<T> {
    fields: Vec<FieldBinding<T>>,
}

impl<T: Entity> BindingTable<T> {
    /// Builds the table for `T` and checks it against `alias`.
    ///
    /// Nested entity types are checked recursively.
    ///
    /// # Errors
    ///
    /// - [`BindingError::DuplicateField`] if `T` binds a field name twice.
    /// - [`BindingError::UnknownField`] if `alias` declares a mode for a field
    ///   that `T` (or a nested type) does not bind.
    pub fn new(alias: &AliasMap) -> Result<Self, BindingError> {
        Self::check(alias, &mut Vec::new())?;
        Ok(Self::unchecked())
    }

    fn unchecked() -> Self {
        Self {
            fields: T::bindings(),
        }
    }

    fn check(alias: &AliasMap, visited: &mut Vec<&'static str>) -> Result<(), BindingError> {
        if visited.contains(&T::TYPE_NAME) {
            return Ok(());
        }
        visited.push(T::TYPE_NAME);

        let fields = T::bindings();
        for (i, field) in fields.iter().enumerate() {
            if fields[..i].iter().any(|f| f.name == field.name) {
                return Err(BindingError::DuplicateField {
                    type_name: T::TYPE_NAME,
                    field: field.name.to_string(),
                });
            }
        }
        if let Some(unknown) = alias
            .declared_fields(T::TYPE_NAME)
            .find(|declared| !fields.iter().any(|f| f.name == *declared))
        {
            return Err(BindingError::UnknownField {
                type_name: T::TYPE_NAME.to_string(),
                field: unknown.to_string(),
            });
        }
        for check in fields.iter().filter_map(|f| f.nested) {
            check(alias, visited)?;
        }
        Ok(())
    }

    /// Returns the bound field names in table order.
    pub fn field_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }

    /// Constructs one entity from `node`.
    ///
    /// Scalar and null nodes produce `T::default()`.
    pub fn bind(&self, node: &Node, alias: &AliasMap) -> T {
        let mut entity = T::default();
        let Some(element) = node.as_element() else {
            debug!(type_name = T::TYPE_NAME, "Entity root is not structured; using defaults");
            return entity;
        };

        for field in &self.fields {
            let source = match alias.binding_mode_for(T::TYPE_NAME, field.name) {
                BindingMode::Element => {
                    let nodes = element.children_named(field.name);
                    if nodes.is_empty() {
                        continue;
                    }
                    FieldSource::Nodes(nodes)
                }
                BindingMode::Attribute => match element.attribute(field.name) {
                    Some(value) => FieldSource::Attribute(value),
                    None => continue,
                },
            };
            if let Err(e) = (field.bind)(&mut entity, &source, alias) {
                debug!(
                    type_name = T::TYPE_NAME,
                    field = field.name,
                    error = %e,
                    "Field left at default"
                );
            }
        }
        entity
    }
}

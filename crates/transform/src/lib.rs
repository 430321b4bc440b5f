//! Alias-driven extraction of typed entities from response bodies.
//!
//! A transformer decodes a body (JSON, XML, YAML or an Atom feed) into a
//! format-neutral [`Document`]; an [`AliasMap`] locates the entity nodes in
//! it; a [`BindingTable`] turns each node into a caller type implementing
//! [`Entity`].
//!
//! ```rust,ignore
//! use transform::{AliasMap, Format, TransformExt};
//!
//! let products: Vec<Product> = Format::Json
//!     .transformer()
//!     .transform(body, &AliasMap::root("product"))?;
//! ```
//!
//! ## Architectural Layer
//!
//! **Domain (pure).** No I/O. Operates on text already retrieved by the
//! `exchange` dispatcher.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`document`] | `Document`, `Node`, `Element` |
//! | [`alias`] | `AliasMap`, `AliasMapBuilder`, `BindingMode` |
//! | [`binding`] | `Entity`, `FieldBinding`, `BindingTable` |
//! | [`transformer`] | The `Transformer` port and `TransformExt` |
//! | [`format`] | `Format` selection |
//! | [`json`] / [`xml`] / [`yaml`] / [`atom`] | Format transformers |
//! | [`errors`] | `DecodeError`, `BindingError`, `TransformError` |

pub mod alias;
pub mod atom;
pub mod binding;
pub mod document;
pub mod errors;
pub mod format;
pub mod json;
pub mod transformer;
pub mod xml;
pub mod yaml;

pub use alias::{AliasMap, AliasMapBuilder, BindingMode};
pub use atom::{AtomCategory, AtomEntry, AtomFeed, AtomLink, AtomPerson, AtomTransformer};
pub use binding::{BindingTable, Entity, FieldBinding, FieldSource};
pub use document::{Document, Element, Node};
pub use errors::{BindingError, DecodeError, TransformError};
pub use format::{Format, UnknownFormat};
pub use json::JsonTransformer;
pub use transformer::{TransformExt, Transformer};
pub use xml::XmlTransformer;
pub use yaml::YamlTransformer;

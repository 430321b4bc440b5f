//! Atom (RFC 4287) feeds.
//!
//! [`AtomTransformer`] is the XML transformer with three differences:
//!
//! - namespace prefixes are stripped, so `atom:entry` binds as `entry`;
//! - the root element must be `feed`;
//! - link and category metadata are read from attributes by default (see
//!   [`AtomTransformer::conventions`]), which callers may override.
//!
//! The built-in entities cover the common subset of the format. Use
//! `AliasMap::whole_document()` to get one [`AtomFeed`], or
//! `AliasMap::root("entry")` to get the entries directly.

use crate::xml::parse_xml;
use crate::{AliasMap, DecodeError, Document, Entity, FieldBinding, Format, Transformer};

/// Decodes Atom feeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct AtomTransformer;

impl Transformer for AtomTransformer {
    fn format(&self) -> Format {
        Format::Atom
    }

    fn decode(&self, text: &str) -> Result<Document, DecodeError> {
        let document = parse_xml(text, true, Format::Atom)?;
        match document.root_name() {
            Some("feed") => Ok(document),
            other => Err(DecodeError::new(
                Format::Atom,
                format!("root element is <{}>, expected <feed>", other.unwrap_or_default()),
            )),
        }
    }

    fn conventions(&self) -> Option<AliasMap> {
        let links = ["href", "rel", "type", "hreflang", "title", "length"]
            .into_iter()
            .fold(AliasMap::builder(), |b, field| b.attribute(AtomLink::TYPE_NAME, field));
        let alias = ["term", "scheme", "label"]
            .into_iter()
            .fold(links, |b, field| b.attribute(AtomCategory::TYPE_NAME, field))
            .build();
        Some(alias)
    }
}

/// `<feed>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomFeed {
    pub id: String,
    pub title: String,
    pub subtitle: String,
    pub updated: String,
    pub links: Vec<AtomLink>,
    pub authors: Vec<AtomPerson>,
    pub categories: Vec<AtomCategory>,
    pub entries: Vec<AtomEntry>,
}

impl Entity for AtomFeed {
    const TYPE_NAME: &'static str = "AtomFeed";

    fn bindings() -> Vec<FieldBinding<Self>> {
        vec![
            FieldBinding::text("id", |f, v| f.id = v),
            FieldBinding::text("title", |f, v| f.title = v),
            FieldBinding::text("subtitle", |f, v| f.subtitle = v),
            FieldBinding::text("updated", |f, v| f.updated = v),
            FieldBinding::entities("link", |f, v| f.links = v),
            FieldBinding::entities("author", |f, v| f.authors = v),
            FieldBinding::entities("category", |f, v| f.categories = v),
            FieldBinding::entities("entry", |f, v| f.entries = v),
        ]
    }
}

/// `<entry>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomEntry {
    pub id: String,
    pub title: String,
    pub summary: String,
    /// Text content only; structured (`type="xhtml"`) content is left empty.
    pub content: String,
    pub updated: String,
    pub published: String,
    pub links: Vec<AtomLink>,
    pub authors: Vec<AtomPerson>,
    pub categories: Vec<AtomCategory>,
}

impl Entity for AtomEntry {
    const TYPE_NAME: &'static str = "AtomEntry";

    fn bindings() -> Vec<FieldBinding<Self>> {
        vec![
            FieldBinding::text("id", |e, v| e.id = v),
            FieldBinding::text("title", |e, v| e.title = v),
            FieldBinding::text("summary", |e, v| e.summary = v),
            FieldBinding::text("content", |e, v| e.content = v),
            FieldBinding::text("updated", |e, v| e.updated = v),
            FieldBinding::text("published", |e, v| e.published = v),
            FieldBinding::entities("link", |e, v| e.links = v),
            FieldBinding::entities("author", |e, v| e.authors = v),
            FieldBinding::entities("category", |e, v| e.categories = v),
        ]
    }
}

/// `<link>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomLink {
    pub href: String,
    pub rel: String,
    /// The `type` attribute.
    pub media_type: String,
    pub hreflang: String,
    pub title: String,
    pub length: Option<u64>,
}

impl Entity for AtomLink {
    const TYPE_NAME: &'static str = "AtomLink";

    fn bindings() -> Vec<FieldBinding<Self>> {
        vec![
            FieldBinding::text("href", |l, v| l.href = v),
            FieldBinding::text("rel", |l, v| l.rel = v),
            FieldBinding::text("type", |l, v| l.media_type = v),
            FieldBinding::text("hreflang", |l, v| l.hreflang = v),
            FieldBinding::text("title", |l, v| l.title = v),
            FieldBinding::parsed("length", |l, v| l.length = Some(v)),
        ]
    }
}

/// `<author>` / `<contributor>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomPerson {
    pub name: String,
    pub uri: String,
    pub email: String,
}

impl Entity for AtomPerson {
    const TYPE_NAME: &'static str = "AtomPerson";

    fn bindings() -> Vec<FieldBinding<Self>> {
        vec![
            FieldBinding::text("name", |p, v| p.name = v),
            FieldBinding::text("uri", |p, v| p.uri = v),
            FieldBinding::text("email", |p, v| p.email = v),
        ]
    }
}

/// `<category>`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AtomCategory {
    pub term: String,
    pub scheme: String,
    pub label: String,
}

impl Entity for AtomCategory {
    const TYPE_NAME: &'static str = "AtomCategory";

    fn bindings() -> Vec<FieldBinding<Self>> {
        vec![
            FieldBinding::text("term", |c, v| c.term = v),
            FieldBinding::text("scheme", |c, v| c.scheme = v),
            FieldBinding::text("label", |c, v| c.label = v),
        ]
    }
}

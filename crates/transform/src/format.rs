//! Supported document formats.

use std::fmt;
use std::str::FromStr;

use exchange::ContentType;
use serde::{Deserialize, Serialize};

use crate::{AtomTransformer, JsonTransformer, Transformer, XmlTransformer, YamlTransformer};

static JSON: JsonTransformer = JsonTransformer;
static XML: XmlTransformer = XmlTransformer;
static YAML: YamlTransformer = YamlTransformer;
static ATOM: AtomTransformer = AtomTransformer;

/// A document format a [`Transformer`] can decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Xml,
    Yaml,
    Atom,
}

impl Format {
    /// Every supported format.
    pub const ALL: [Format; 4] = [Format::Json, Format::Xml, Format::Yaml, Format::Atom];

    /// Returns the lowercase name used in configuration and on the command line.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Xml => "xml",
            Self::Yaml => "yaml",
            Self::Atom => "atom",
        }
    }

    /// Returns the shared transformer for this format.
    pub fn transformer(self) -> &'static dyn Transformer {
        match self {
            Self::Json => &JSON,
            Self::Xml => &XML,
            Self::Yaml => &YAML,
            Self::Atom => &ATOM,
        }
    }

    /// Guesses the format from a response `Content-Type`.
    ///
    /// Structured-syntax suffixes are honoured: `application/hal+json` is
    /// JSON, `application/rss+xml` is XML. Returns `None` for anything that is
    /// not a document type.
    pub fn from_content_type(content_type: &ContentType) -> Option<Format> {
        match content_type {
            ContentType::ApplicationJson => Some(Self::Json),
            ContentType::ApplicationXml | ContentType::TextXml => Some(Self::Xml),
            ContentType::ApplicationAtomXml => Some(Self::Atom),
            ContentType::ApplicationYaml => Some(Self::Yaml),
            ContentType::Other(mime) if mime.ends_with("+json") => Some(Self::Json),
            ContentType::Other(mime) if mime.ends_with("+xml") => Some(Self::Xml),
            ContentType::Other(mime) if mime.ends_with("+yaml") => Some(Self::Yaml),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown format name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown format '{0}'; expected one of json, xml, yaml, atom")]
pub struct UnknownFormat(pub String);

impl FromStr for Format {
    type Err = UnknownFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownFormat(s.to_string()))
    }
}

//! Shared value types for describing requests and responses.
//!
//! ## Contents
//!
//! - [`Verb`]: the HTTP methods supported by descriptors.
//! - [`Encoding`]: text (UTF-8) versus raw binary transfer.
//! - [`ContentType`]: request/response media types.
//! - [`Timestamp`]: UTC wall-clock time stamped onto envelopes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Verbs
// ---------------------------------------------------------------------------

/// HTTP method of a [`crate::RequestDescriptor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verb {
    /// `GET`: parameters travel in the query string.
    Get,
    /// `POST`: carries a body.
    Post,
    /// `PUT`: carries a body.
    Put,
    /// `DELETE`: parameters travel in the query string.
    Delete,
}

impl Verb {
    /// Returns the method token as sent on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// Returns `true` for verbs that may carry a request body.
    pub fn allows_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Verb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            other => Err(format!("unsupported verb '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Character or binary transfer mode for a request and its response.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// UTF-8 text. Text bodies are labelled `charset=UTF-8`.
    #[default]
    Utf8,
    /// Raw bytes. Responses are requested as `application/octet-stream`.
    Binary,
}

// ---------------------------------------------------------------------------
// Content types
// ---------------------------------------------------------------------------

/// Media type of a request body or a response.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// `text/plain`
    TextPlain,
    /// `text/html`
    TextHtml,
    /// `text/xml`
    TextXml,
    /// `application/json`
    ApplicationJson,
    /// `application/xml`
    ApplicationXml,
    /// `application/atom+xml`
    ApplicationAtomXml,
    /// `application/x-yaml`
    ApplicationYaml,
    /// `application/octet-stream`
    ApplicationOctetStream,
    /// `application/x-www-form-urlencoded`
    FormUrlEncoded,
    /// `multipart/form-data`
    MultipartFormData,
    /// `image/jpeg`
    ImageJpeg,
    /// `image/png`
    ImagePng,
    /// Any other media type, stored verbatim (without parameters).
    Other(String),
}

impl ContentType {
    /// Returns the bare MIME type (no parameters).
    pub fn as_mime(&self) -> &str {
        match self {
            Self::TextPlain => "text/plain",
            Self::TextHtml => "text/html",
            Self::TextXml => "text/xml",
            Self::ApplicationJson => "application/json",
            Self::ApplicationXml => "application/xml",
            Self::ApplicationAtomXml => "application/atom+xml",
            Self::ApplicationYaml => "application/x-yaml",
            Self::ApplicationOctetStream => "application/octet-stream",
            Self::FormUrlEncoded => "application/x-www-form-urlencoded",
            Self::MultipartFormData => "multipart/form-data",
            Self::ImageJpeg => "image/jpeg",
            Self::ImagePng => "image/png",
            Self::Other(mime) => mime,
        }
    }

    /// Parses a `Content-Type` header value, ignoring parameters such as `charset`.
    pub fn from_mime(value: &str) -> Self {
        let mime = value
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match mime.as_str() {
            "text/plain" => Self::TextPlain,
            "text/html" => Self::TextHtml,
            "text/xml" => Self::TextXml,
            "application/json" => Self::ApplicationJson,
            "application/xml" => Self::ApplicationXml,
            "application/atom+xml" => Self::ApplicationAtomXml,
            "application/x-yaml" | "application/yaml" | "text/yaml" | "text/x-yaml" => {
                Self::ApplicationYaml
            }
            "application/octet-stream" => Self::ApplicationOctetStream,
            "application/x-www-form-urlencoded" => Self::FormUrlEncoded,
            "multipart/form-data" => Self::MultipartFormData,
            "image/jpeg" => Self::ImageJpeg,
            "image/png" => Self::ImagePng,
            _ => Self::Other(mime),
        }
    }

    /// Returns `true` if bodies of this type are character data.
    ///
    /// Textual bodies sent with [`Encoding::Utf8`] get a `charset=UTF-8` parameter.
    pub fn is_textual(&self) -> bool {
        match self {
            Self::TextPlain
            | Self::TextHtml
            | Self::TextXml
            | Self::ApplicationJson
            | Self::ApplicationXml
            | Self::ApplicationAtomXml
            | Self::ApplicationYaml
            | Self::FormUrlEncoded => true,
            Self::Other(mime) => mime.starts_with("text/"),
            _ => false,
        }
    }

    /// Renders the `Content-Type` header value for the given encoding.
    pub fn header_value(&self, encoding: Encoding) -> String {
        if encoding == Encoding::Utf8 && self.is_textual() {
            format!("{}; charset=UTF-8", self.as_mime())
        } else {
            self.as_mime().to_string()
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_mime())
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

/// A UTC wall-clock timestamp.
///
/// Wraps [`chrono::DateTime<Utc>`] so callers never depend on `chrono` types
/// directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Returns the current UTC time as a [`Timestamp`].
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Creates a [`Timestamp`] from a [`DateTime<Utc>`].
    pub fn from_utc(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }

    /// Returns the underlying [`DateTime<Utc>`].
    pub fn as_datetime(self) -> DateTime<Utc> {
        self.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_parses_case_insensitively() {
        assert_eq!("delete".parse::<Verb>().unwrap(), Verb::Delete);
        assert_eq!("Post".parse::<Verb>().unwrap(), Verb::Post);
        assert!("PATCH".parse::<Verb>().is_err());
    }

    #[test]
    fn test_only_post_and_put_carry_bodies() {
        assert!(Verb::Post.allows_body());
        assert!(Verb::Put.allows_body());
        assert!(!Verb::Get.allows_body());
        assert!(!Verb::Delete.allows_body());
    }

    #[test]
    fn test_content_type_ignores_parameters() {
        assert_eq!(
            ContentType::from_mime("application/json; charset=ISO-8859-1"),
            ContentType::ApplicationJson
        );
        assert_eq!(
            ContentType::from_mime("Application/Vnd.Custom+Json"),
            ContentType::Other("application/vnd.custom+json".to_string())
        );
    }

    #[test]
    fn test_header_value_adds_charset_for_text_only() {
        assert_eq!(
            ContentType::TextPlain.header_value(Encoding::Utf8),
            "text/plain; charset=UTF-8"
        );
        assert_eq!(ContentType::TextPlain.header_value(Encoding::Binary), "text/plain");
        assert_eq!(ContentType::ImageJpeg.header_value(Encoding::Utf8), "image/jpeg");
    }
}

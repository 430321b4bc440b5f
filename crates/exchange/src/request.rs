//! Immutable request descriptors.
//!
//! A [`RequestDescriptor`] is built once through a verb/body-specific factory
//! and never changes afterwards. The body is a closed [`Body`] enum fixed by
//! the factory; the [`RequestBuilder`] only exposes the optional arguments
//! (parameters, headers, encoding, content type), so a descriptor can never
//! hold more than one body variant.
//!
//! ```rust,ignore
//! let request = RequestDescriptor::get("http://api.zappos.com/Product/7515478", 80)
//!     .param("key", "fdb3c385a8d2")
//!     .build()?;
//!
//! let upload = RequestDescriptor::post_multipart(
//!     "http://localhost/all/fileUpload/file",
//!     9800,
//!     [("Message 1", BodyPart::text("The content of Message 1")),
//!      ("file", BodyPart::file("/tmp/1.jpg"))],
//! )
//! .content_type(ContentType::ImageJpeg)
//! .build()?;
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use url::Url;

use crate::{ContentType, Encoding, RequestError, Verb};

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Ordered name/value request parameters.
///
/// Duplicate names are allowed and insertion order is preserved when the
/// query string or form body is produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParams(Vec<(String, String)>);

impl RequestParams {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.push((name.into(), value.into()));
        self
    }

    /// Appends a parameter, consuming and returning `self`.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add(name, value);
        self
    }

    /// Iterates parameters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of parameters (duplicates counted).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Encodes the parameters as `application/x-www-form-urlencoded`.
    pub fn to_form_urlencoded(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RequestParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

/// One named part of a multipart body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyPart {
    /// An inline text part.
    Text {
        /// Part content.
        value: String,
        /// Part media type; `text/plain` when `None`.
        content_type: Option<ContentType>,
    },
    /// A part whose bytes are read from a file at dispatch time.
    File {
        /// File to upload. Its file name is sent as the part's file name.
        path: PathBuf,
        /// Part media type; falls back to the multipart body's file content
        /// type, then to `application/octet-stream`.
        content_type: Option<ContentType>,
    },
}

impl BodyPart {
    /// Creates a text part.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text {
            value: value.into(),
            content_type: None,
        }
    }

    /// Creates a file part.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File {
            path: path.into(),
            content_type: None,
        }
    }

    /// Sets the part's media type.
    #[must_use]
    pub fn with_content_type(self, content_type: ContentType) -> Self {
        match self {
            Self::Text { value, .. } => Self::Text {
                value,
                content_type: Some(content_type),
            },
            Self::File { path, .. } => Self::File {
                path,
                content_type: Some(content_type),
            },
        }
    }
}

/// Discriminant of a [`Body`], for inspection without matching on payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyKind {
    /// No body.
    None,
    /// Inline text message.
    Message,
    /// Single file.
    File,
    /// Multipart form.
    Multipart,
    /// Serialised object.
    Object,
}

/// The body of a request. Exactly one variant is active.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    /// No body. For `POST`/`PUT`, request parameters become a form body.
    #[default]
    None,
    /// An inline text message.
    Message {
        /// Message content.
        text: String,
        /// Declared media type.
        content_type: ContentType,
    },
    /// The bytes of a single file.
    File {
        /// File to send.
        path: PathBuf,
        /// Declared media type.
        content_type: ContentType,
    },
    /// A `multipart/form-data` body, parts in insertion order.
    Multipart {
        /// Named parts.
        parts: Vec<(String, BodyPart)>,
        /// Default media type for file parts that do not declare one.
        file_content_type: Option<ContentType>,
    },
    /// An object already serialised to the default (JSON) format.
    Object {
        /// Serialised form of the caller's object.
        value: serde_json::Value,
    },
}

impl Body {
    /// Creates a text message body.
    pub fn message(text: impl Into<String>, content_type: ContentType) -> Self {
        Self::Message {
            text: text.into(),
            content_type,
        }
    }

    /// Creates a file body.
    pub fn file(path: impl Into<PathBuf>, content_type: ContentType) -> Self {
        Self::File {
            path: path.into(),
            content_type,
        }
    }

    /// Creates a multipart body.
    pub fn multipart<N: Into<String>>(parts: impl IntoIterator<Item = (N, BodyPart)>) -> Self {
        Self::Multipart {
            parts: parts.into_iter().map(|(n, p)| (n.into(), p)).collect(),
            file_content_type: None,
        }
    }

    /// Serialises `object` to JSON and wraps it as an object body.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Serialize`] if `object` cannot be represented as JSON.
    pub fn object<T: Serialize + ?Sized>(object: &T) -> Result<Self, RequestError> {
        let value = serde_json::to_value(object).map_err(|e| RequestError::Serialize {
            message: e.to_string(),
        })?;
        Ok(Self::Object { value })
    }

    /// Returns which variant is active.
    pub fn kind(&self) -> BodyKind {
        match self {
            Self::None => BodyKind::None,
            Self::Message { .. } => BodyKind::Message,
            Self::File { .. } => BodyKind::File,
            Self::Multipart { .. } => BodyKind::Multipart,
            Self::Object { .. } => BodyKind::Object,
        }
    }

    /// Returns the declared media type of the body, if it has one.
    pub fn content_type(&self) -> Option<ContentType> {
        match self {
            Self::None => None,
            Self::Message { content_type, .. } | Self::File { content_type, .. } => {
                Some(content_type.clone())
            }
            Self::Multipart { .. } => Some(ContentType::MultipartFormData),
            Self::Object { .. } => Some(ContentType::ApplicationJson),
        }
    }

    fn override_content_type(&mut self, new: ContentType) {
        match self {
            Self::Message { content_type, .. } | Self::File { content_type, .. } => {
                *content_type = new;
            }
            Self::Multipart {
                file_content_type, ..
            } => *file_content_type = Some(new),
            Self::None | Self::Object { .. } => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Descriptor
// ---------------------------------------------------------------------------

/// An immutable description of one HTTP request.
///
/// Built via the verb/body factories ([`RequestDescriptor::get`],
/// [`RequestDescriptor::post_message`], ...) and [`RequestBuilder::build`].
/// Safe to share across threads and to dispatch any number of times.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    base_url: Url,
    verb: Verb,
    encoding: Encoding,
    params: RequestParams,
    headers: Vec<(String, String)>,
    body: Body,
}

impl RequestDescriptor {
    /// Starts a `GET` request.
    pub fn get(target: impl Into<String>, port: u16) -> RequestBuilder {
        RequestBuilder::new(Verb::Get, target.into(), port, Body::None)
    }

    /// Starts a `DELETE` request.
    pub fn delete(target: impl Into<String>, port: u16) -> RequestBuilder {
        RequestBuilder::new(Verb::Delete, target.into(), port, Body::None)
    }

    /// Starts a `POST` request with the given body.
    pub fn post(target: impl Into<String>, port: u16, body: Body) -> RequestBuilder {
        RequestBuilder::new(Verb::Post, target.into(), port, body)
    }

    /// Starts a `PUT` request with the given body.
    pub fn put(target: impl Into<String>, port: u16, body: Body) -> RequestBuilder {
        RequestBuilder::new(Verb::Put, target.into(), port, body)
    }

    /// Starts a request with an arbitrary verb and body.
    ///
    /// [`RequestBuilder::build`] rejects bodies on verbs that cannot carry one.
    pub fn builder(verb: Verb, target: impl Into<String>, port: u16, body: Body) -> RequestBuilder {
        RequestBuilder::new(verb, target.into(), port, body)
    }

    /// Starts a `POST` carrying a raw text message.
    pub fn post_message(
        target: impl Into<String>,
        port: u16,
        message: impl Into<String>,
        content_type: ContentType,
    ) -> RequestBuilder {
        Self::post(target, port, Body::message(message, content_type))
    }

    /// Starts a `POST` carrying the bytes of `path`.
    pub fn post_file(
        target: impl Into<String>,
        port: u16,
        path: impl AsRef<Path>,
        content_type: ContentType,
    ) -> RequestBuilder {
        Self::post(target, port, Body::file(path.as_ref(), content_type))
    }

    /// Starts a `POST` carrying a multipart form.
    pub fn post_multipart<N: Into<String>>(
        target: impl Into<String>,
        port: u16,
        parts: impl IntoIterator<Item = (N, BodyPart)>,
    ) -> RequestBuilder {
        Self::post(target, port, Body::multipart(parts))
    }

    /// Starts a `POST` carrying `object` serialised as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Serialize`] if `object` cannot be serialised.
    pub fn post_object<T: Serialize + ?Sized>(
        target: impl Into<String>,
        port: u16,
        object: &T,
    ) -> Result<RequestBuilder, RequestError> {
        Ok(Self::post(target, port, Body::object(object)?))
    }

    /// Returns the HTTP method.
    pub fn verb(&self) -> Verb {
        self.verb
    }

    /// Returns the transfer encoding.
    pub fn encoding(&self) -> Encoding {
        self.encoding
    }

    /// Returns the request parameters in insertion order.
    pub fn params(&self) -> &RequestParams {
        &self.params
    }

    /// Returns the caller-supplied headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns a copy with each of `defaults` added unless a header of the
    /// same name (case-insensitive) is already set.
    pub fn with_default_headers<'a>(
        &self,
        defaults: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> RequestDescriptor {
        let mut request = self.clone();
        for (name, value) in defaults {
            if !self.headers.iter().any(|(n, _)| n.eq_ignore_ascii_case(name)) {
                request.headers.push((name.to_string(), value.to_string()));
            }
        }
        request
    }

    /// Returns the body.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Returns the target with the port applied and without request parameters.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns `true` if the parameters travel in the query string.
    ///
    /// They always do for `GET`/`DELETE`. For `POST`/`PUT` they do unless the
    /// body is [`Body::None`], in which case they form the body.
    pub fn params_in_query(&self) -> bool {
        !self.verb.allows_body() || self.body.kind() != BodyKind::None
    }

    /// Returns the URL to request, including query parameters when applicable.
    pub fn url(&self) -> Url {
        let mut url = self.base_url.clone();
        if self.params_in_query() && !self.params.is_empty() {
            url.query_pairs_mut().extend_pairs(self.params.iter());
        }
        url
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Collects the optional arguments of a request before validation.
///
/// Created by the [`RequestDescriptor`] factories. The verb and body variant
/// are fixed at creation.
#[derive(Debug, Clone)]
#[must_use = "call `build()` to obtain a RequestDescriptor"]
pub struct RequestBuilder {
    verb: Verb,
    target: String,
    port: u16,
    encoding: Encoding,
    params: RequestParams,
    headers: Vec<(String, String)>,
    body: Body,
}

impl RequestBuilder {
    fn new(verb: Verb, target: String, port: u16, body: Body) -> Self {
        Self {
            verb,
            target,
            port,
            encoding: Encoding::default(),
            params: RequestParams::new(),
            headers: Vec::new(),
            body,
        }
    }

    /// Appends one request parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.add(name, value);
        self
    }

    /// Appends every parameter in `params`, keeping their order.
    pub fn params(mut self, params: RequestParams) -> Self {
        self.params.0.extend(params.0);
        self
    }

    /// Appends one header. Headers here override the dispatcher's defaults.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Appends several headers.
    pub fn headers<N: Into<String>, V: Into<String>>(
        mut self,
        headers: impl IntoIterator<Item = (N, V)>,
    ) -> Self {
        self.headers
            .extend(headers.into_iter().map(|(n, v)| (n.into(), v.into())));
        self
    }

    /// Sets the transfer encoding (default [`Encoding::Utf8`]).
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Overrides the body's media type.
    ///
    /// For multipart bodies this is the default type of file parts. Has no
    /// effect on empty or object bodies.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.body.override_content_type(content_type);
        self
    }

    /// Validates the arguments and produces the descriptor.
    ///
    /// # Errors
    ///
    /// - [`RequestError::EmptyTarget`] / [`RequestError::InvalidTarget`] for a bad target.
    /// - [`RequestError::InvalidPort`] for port `0`.
    /// - [`RequestError::BodyNotAllowed`] for a `GET`/`DELETE` with a body.
    pub fn build(self) -> Result<RequestDescriptor, RequestError> {
        let target = self.target.trim();
        if target.is_empty() {
            return Err(RequestError::EmptyTarget);
        }
        if self.port == 0 {
            return Err(RequestError::InvalidPort { port: self.port });
        }
        if !self.verb.allows_body() && self.body.kind() != BodyKind::None {
            return Err(RequestError::BodyNotAllowed { verb: self.verb });
        }

        let absolute = if target.contains("://") {
            target.to_string()
        } else {
            format!("http://{target}")
        };
        let mut base_url = Url::parse(&absolute).map_err(|e| RequestError::InvalidTarget {
            target: self.target.clone(),
            reason: e.to_string(),
        })?;
        base_url
            .set_port(Some(self.port))
            .map_err(|()| RequestError::InvalidTarget {
                target: self.target.clone(),
                reason: "target cannot carry a port".to_string(),
            })?;

        Ok(RequestDescriptor {
            base_url,
            verb: self.verb,
            encoding: self.encoding,
            params: self.params,
            headers: self.headers,
            body: self.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_defaults_to_utf8_and_no_body() {
        let request = RequestDescriptor::get("http://localhost/all/account", 9800)
            .build()
            .unwrap();
        assert_eq!(request.verb(), Verb::Get);
        assert_eq!(request.encoding(), Encoding::Utf8);
        assert_eq!(request.body().kind(), BodyKind::None);
        assert_eq!(request.url().as_str(), "http://localhost:9800/all/account");
    }

    #[test]
    fn test_get_params_preserve_order_and_duplicates() {
        let request = RequestDescriptor::get("http://where.yahooapis.com/geocode", 8080)
            .param("q", "1600 Pennsylvania Avenue")
            .param("flag", "a")
            .param("flag", "b")
            .build()
            .unwrap();
        assert_eq!(request.params().len(), 3);
        assert_eq!(
            request.url().as_str(),
            "http://where.yahooapis.com:8080/geocode?q=1600+Pennsylvania+Avenue&flag=a&flag=b"
        );
    }

    #[test]
    fn test_existing_query_in_target_is_kept() {
        let request = RequestDescriptor::get("http://localhost/fileUpload/file?ownerId=111", 9800)
            .param("groupId", "111")
            .build()
            .unwrap();
        assert_eq!(request.url().query(), Some("ownerId=111&groupId=111"));
    }

    #[test]
    fn test_missing_scheme_defaults_to_http() {
        let request = RequestDescriptor::get("localhost/testresting/rest/hello", 8080)
            .build()
            .unwrap();
        assert_eq!(request.url().scheme(), "http");
        assert_eq!(request.url().port(), Some(8080));
    }

    #[test]
    fn test_empty_target_is_rejected() {
        let result = RequestDescriptor::get("  ", 80).build();
        assert!(matches!(result, Err(RequestError::EmptyTarget)));
    }

    #[test]
    fn test_port_zero_is_rejected() {
        let result = RequestDescriptor::get("http://localhost", 0).build();
        assert!(matches!(result, Err(RequestError::InvalidPort { port: 0 })));
    }

    #[test]
    fn test_unparseable_target_is_rejected() {
        let result = RequestDescriptor::get("http://exa mple.com", 80).build();
        assert!(matches!(result, Err(RequestError::InvalidTarget { .. })));
    }

    #[test]
    fn test_body_on_get_is_rejected() {
        let result = RequestDescriptor::builder(
            Verb::Get,
            "http://localhost",
            80,
            Body::message("hi", ContentType::TextPlain),
        )
        .build();
        assert!(matches!(
            result,
            Err(RequestError::BodyNotAllowed { verb: Verb::Get })
        ));
    }

    #[test]
    fn test_multipart_body_is_the_only_active_variant() {
        let request = RequestDescriptor::post_multipart(
            "http://localhost/all/fileUpload/file",
            9800,
            [
                ("Message 1", BodyPart::text("The content of Message 1")),
                ("file", BodyPart::file("/tmp/1.jpg")),
            ],
        )
        .content_type(ContentType::ImageJpeg)
        .build()
        .unwrap();

        assert_eq!(request.body().kind(), BodyKind::Multipart);
        match request.body() {
            Body::Multipart {
                parts,
                file_content_type,
            } => {
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[0].0, "Message 1");
                assert_eq!(file_content_type, &Some(ContentType::ImageJpeg));
            }
            other => panic!("expected multipart body, got {other:?}"),
        }
        assert_eq!(request.body().content_type(), Some(ContentType::MultipartFormData));
    }

    #[test]
    fn test_post_params_form_the_body_only_without_explicit_body() {
        let form = RequestDescriptor::post("http://localhost/form", 80, Body::None)
            .param("a", "1")
            .build()
            .unwrap();
        assert!(!form.params_in_query());
        assert_eq!(form.url().query(), None);

        let message = RequestDescriptor::post_message("http://localhost/m", 80, "hi", ContentType::TextPlain)
            .param("a", "1")
            .build()
            .unwrap();
        assert!(message.params_in_query());
        assert_eq!(message.url().query(), Some("a=1"));
    }

    #[test]
    fn test_post_object_serialises_at_construction() {
        #[derive(Serialize)]
        struct House {
            street: String,
            number: u32,
        }

        let request = RequestDescriptor::post_object(
            "http://localhost/post/jsonobject",
            8080,
            &House {
                street: "My Avenue".to_string(),
                number: 33,
            },
        )
        .unwrap()
        .build()
        .unwrap();

        match request.body() {
            Body::Object { value } => {
                assert_eq!(value["street"], "My Avenue");
                assert_eq!(value["number"], 33);
            }
            other => panic!("expected object body, got {other:?}"),
        }
    }

    #[test]
    fn test_content_type_override_keeps_variant() {
        let request = RequestDescriptor::post_file("http://localhost/post/file", 80, "/tmp/a.png", ContentType::ImageJpeg)
            .content_type(ContentType::ImagePng)
            .build()
            .unwrap();
        assert_eq!(request.body().kind(), BodyKind::File);
        assert_eq!(request.body().content_type(), Some(ContentType::ImagePng));
    }

    #[test]
    fn test_form_urlencoding_escapes_values() {
        let params: RequestParams = [("facets", "[\"brandNameFacet\"]"), ("q", "a b")]
            .into_iter()
            .collect();
        assert_eq!(
            params.to_form_urlencoded(),
            "facets=%5B%22brandNameFacet%22%5D&q=a+b"
        );
    }

    #[test]
    fn test_default_headers_do_not_override_request_headers() {
        let request = RequestDescriptor::get("localhost", 8080)
            .header("accept", "text/csv")
            .build()
            .unwrap()
            .with_default_headers([("Accept", "application/json"), ("X-Client", "restform")]);
        assert_eq!(
            request.headers(),
            &[
                ("accept".to_string(), "text/csv".to_string()),
                ("X-Client".to_string(), "restform".to_string()),
            ]
        );
    }
}

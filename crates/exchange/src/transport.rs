//! The transport port.
//!
//! The dispatcher never speaks HTTP itself. It lowers a
//! [`crate::RequestDescriptor`] to a [`WireRequest`] and hands it to a
//! [`Transport`]; infrastructure crates implement the trait over a real
//! client, tests implement it with an in-memory fake.

use url::Url;

use crate::{ConnectionConfig, TransportError, Verb};

/// Sends one fully-encoded request and returns the raw response.
///
/// Implementations must be safe to call from several threads at once and must
/// not retry: one call is one round trip. Non-2xx statuses are returned as
/// ordinary [`WireResponse`]s; only failures to complete the exchange are errors.
pub trait Transport: Send + Sync {
    /// Performs the round trip.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] for connection, DNS, timeout and protocol failures.
    fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        (**self).send(request)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        (**self).send(request)
    }
}

/// A request lowered to wire form.
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    /// HTTP method.
    pub verb: Verb,
    /// Absolute URL including port and query string.
    pub url: Url,
    /// Final header list (defaults merged with caller headers).
    pub headers: Vec<(String, String)>,
    /// Encoded body.
    pub body: WireBody,
    /// Per-request proxy and timeout overrides.
    pub connection: Option<ConnectionConfig>,
}

impl WireRequest {
    /// Returns the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// An encoded request body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WireBody {
    /// No body.
    #[default]
    Empty,
    /// A single byte payload; its media type is in the `Content-Type` header.
    Bytes(Vec<u8>),
    /// Multipart parts. The transport owns boundary generation and framing.
    Multipart(Vec<WirePart>),
}

/// One part of a multipart wire body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WirePart {
    /// Form field name.
    pub name: String,
    /// File name for file parts.
    pub file_name: Option<String>,
    /// Part media type.
    pub content_type: String,
    /// Part content.
    pub data: Vec<u8>,
}

/// The raw result of a successful round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireResponse {
    /// HTTP status code, any value including non-2xx.
    pub status: u16,
    /// Response headers in the order received.
    pub headers: Vec<(String, String)>,
    /// Fully buffered body.
    pub body: Vec<u8>,
}

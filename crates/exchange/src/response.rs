//! Immutable capture of one HTTP response.

use std::sync::OnceLock;

use crate::{ContentType, Encoding, RequestDescriptor, RequestId, Timestamp, WireResponse};

/// Number of characters of body text shown by the `Display` impl.
const DISPLAY_PREVIEW_CHARS: usize = 256;

/// The response to exactly one dispatched [`RequestDescriptor`].
///
/// Carries the real status code whatever it is; a `406 Not Acceptable` is
/// data here, not an error. The body is kept as raw bytes and decoded to text
/// on first access to [`ResponseEnvelope::body_as_text`], using the charset of
/// the `Content-Type` header (UTF-8 when absent).
#[derive(Debug, Clone)]
pub struct ResponseEnvelope {
    request_id: RequestId,
    request: RequestDescriptor,
    status_code: u16,
    headers: Vec<(String, String)>,
    raw_body: Vec<u8>,
    text: OnceLock<String>,
    received_at: Timestamp,
}

impl ResponseEnvelope {
    /// Wraps a transport response together with its originating request.
    pub fn from_wire(request_id: RequestId, request: RequestDescriptor, wire: WireResponse) -> Self {
        Self {
            request_id,
            request,
            status_code: wire.status,
            headers: wire.headers,
            raw_body: wire.body,
            text: OnceLock::new(),
            received_at: Timestamp::now(),
        }
    }

    /// Returns the identifier assigned when the request was dispatched.
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Returns the descriptor this response answers.
    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    /// Returns the HTTP status code.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status_code)
    }

    /// Returns all response headers in the order received.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Returns the first header named `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the parsed `Content-Type`, if present.
    pub fn content_type(&self) -> Option<ContentType> {
        self.header("content-type").map(ContentType::from_mime)
    }

    /// Returns the `charset` parameter of `Content-Type`, if present.
    pub fn charset(&self) -> Option<&str> {
        self.header("content-type")?
            .split(';')
            .skip(1)
            .filter_map(|param| param.split_once('='))
            .find(|(k, _)| k.trim().eq_ignore_ascii_case("charset"))
            .map(|(_, v)| v.trim().trim_matches('"'))
    }

    /// Returns the body bytes exactly as received.
    pub fn raw_body(&self) -> &[u8] {
        &self.raw_body
    }

    /// Returns the body decoded as text.
    ///
    /// Decoded once and cached.
    pub fn body_as_text(&self) -> &str {
        self.text
            .get_or_init(|| decode_text(&self.raw_body, self.charset()))
    }

    /// Alias of [`ResponseEnvelope::body_as_text`].
    pub fn response_string(&self) -> &str {
        self.body_as_text()
    }

    /// Returns the body length in bytes.
    pub fn length(&self) -> usize {
        self.raw_body.len()
    }

    /// Alias of [`ResponseEnvelope::length`].
    pub fn response_length(&self) -> usize {
        self.length()
    }

    /// Returns when the response was captured.
    pub fn received_at(&self) -> Timestamp {
        self.received_at
    }
}

impl std::fmt::Display for ResponseEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} -> {} ({} bytes)",
            self.request.verb(),
            self.request.url(),
            self.status_code,
            self.length()
        )?;
        if self.request.encoding() == Encoding::Binary || self.raw_body.is_empty() {
            return Ok(());
        }
        let text = self.body_as_text();
        let preview: String = text.chars().take(DISPLAY_PREVIEW_CHARS).collect();
        if preview.len() < text.len() {
            write!(f, ": {preview}...")
        } else {
            write!(f, ": {preview}")
        }
    }
}

fn decode_text(body: &[u8], charset: Option<&str>) -> String {
    let body = body.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(body);
    match charset.map(str::to_ascii_lowercase).as_deref() {
        Some("iso-8859-1" | "latin1" | "latin-1" | "us-ascii" | "ascii") => {
            body.iter().map(|&b| char::from(b)).collect()
        }
        Some("utf-8" | "utf8") | None => String::from_utf8_lossy(body).into_owned(),
        Some(other) => {
            tracing::debug!(charset = other, "Unsupported charset; decoding as UTF-8");
            String::from_utf8_lossy(body).into_owned()
        }
    }
}

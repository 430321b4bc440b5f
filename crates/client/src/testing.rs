//! In-memory transport for unit tests.

use std::sync::Mutex;

use exchange::{Transport, TransportError, TransportErrorKind, WireRequest, WireResponse};

/// Records every request and answers each with the same scripted reply.
pub(crate) struct FakeTransport {
    sent: Mutex<Vec<WireRequest>>,
    reply: Result<WireResponse, TransportError>,
}

impl FakeTransport {
    pub(crate) fn replying(status: u16, content_type: &str, body: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reply: Ok(WireResponse {
                status,
                headers: vec![("Content-Type".to_string(), content_type.to_string())],
                body: body.as_bytes().to_vec(),
            }),
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reply: Err(TransportError::new(
                TransportErrorKind::Connect,
                "http://localhost:1/",
                "connection refused",
            )),
        }
    }

    pub(crate) fn sent(&self) -> Vec<WireRequest> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for FakeTransport {
    fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        self.sent.lock().unwrap().push(request);
        self.reply.clone()
    }
}

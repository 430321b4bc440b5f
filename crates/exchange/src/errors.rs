//! Error types for request construction and dispatch.
//!
//! The taxonomy separates three caller-visible outcomes:
//!
//! - [`RequestError`]: the descriptor could not be built (bad target, port,
//!   body/verb mismatch). Nothing was sent.
//! - [`DispatchError`]: the round trip failed. Wraps [`TransportError`] for
//!   connection, DNS and timeout failures.
//! - A non-2xx status is **not** an error. It arrives as an ordinary
//!   [`crate::ResponseEnvelope`] and callers branch on its status code.

use std::path::PathBuf;

use thiserror::Error;

use crate::Verb;

// ---------------------------------------------------------------------------
// Construction errors
// ---------------------------------------------------------------------------

/// Errors raised while building a [`crate::RequestDescriptor`].
#[derive(Debug, Error)]
pub enum RequestError {
    /// The target was empty or whitespace.
    #[error("Request target must not be empty")]
    EmptyTarget,

    /// The target could not be parsed as an absolute URL.
    #[error("Invalid request target '{target}': {reason}")]
    InvalidTarget {
        /// The target exactly as supplied by the caller.
        target: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// Port `0` is not addressable.
    #[error("Port must be in 1..=65535, got {port}")]
    InvalidPort {
        /// The rejected port.
        port: u16,
    },

    /// A body was supplied for a verb that does not carry one.
    #[error("{verb} requests cannot carry a body")]
    BodyNotAllowed {
        /// The offending verb.
        verb: Verb,
    },

    /// The object supplied to an object-body factory could not be serialised.
    #[error("Request object could not be serialised: {message}")]
    Serialize {
        /// Serialiser diagnostic.
        message: String,
    },
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

/// Classification of a transport-level failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The connection could not be established (refused, DNS failure, proxy unreachable).
    Connect,
    /// The connect or read timeout elapsed.
    Timeout,
    /// The exchange started but failed mid-flight (reset, malformed framing, body read).
    Protocol,
    /// The transport could not be configured for this request (bad proxy URL, TLS setup).
    Configuration,
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Protocol => "protocol",
            Self::Configuration => "configuration",
        };
        f.write_str(s)
    }
}

/// A failure reported by a [`crate::Transport`] implementation.
///
/// Always surfaced to the caller; the core never retries.
#[derive(Debug, Clone, Error)]
#[error("Transport {kind} failure for {url}: {message}")]
pub struct TransportError {
    /// What went wrong.
    pub kind: TransportErrorKind,
    /// The URL being requested when the failure occurred.
    pub url: String,
    /// Transport diagnostic.
    pub message: String,
}

impl TransportError {
    /// Creates a [`TransportError`].
    pub fn new(kind: TransportErrorKind, url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            message: message.into(),
        }
    }

    /// Returns `true` if the failure was a timeout.
    pub fn is_timeout(&self) -> bool {
        self.kind == TransportErrorKind::Timeout
    }
}

// ---------------------------------------------------------------------------
// Dispatch errors
// ---------------------------------------------------------------------------

/// Errors returned by [`crate::Dispatcher::dispatch`].
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The transport failed to complete the round trip.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A file named by a file or multipart body could not be read.
    ///
    /// Detected before anything is sent.
    #[error("Body file '{}' could not be read: {source}", path.display())]
    UnreadableBody {
        /// The file path from the descriptor.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The object body could not be encoded.
    #[error("Object body could not be encoded: {message}")]
    Encode {
        /// Serialiser diagnostic.
        message: String,
    },
}

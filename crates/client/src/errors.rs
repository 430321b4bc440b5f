//! Error types for the facade.

use std::path::PathBuf;

use exchange::{DispatchError, RequestError, TransportError};
use thiserror::Error;
use transform::TransformError;

/// A [`crate::ClientConfig`] could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        /// The path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configuration text is not valid TOML for [`crate::ClientConfig`].
    #[error("Invalid client configuration: {message}")]
    Parse {
        /// Deserializer diagnostic, including the offending key when known.
        message: String,
    },
}

/// Errors returned by [`crate::RestClient`] operations.
///
/// A non-2xx response is not an error; typed operations transform whatever
/// body came back.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request descriptor could not be built.
    #[error(transparent)]
    Request(#[from] RequestError),

    /// The HTTP client could not be constructed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The round trip failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// The response body could not be turned into entities.
    #[error(transparent)]
    Transform(#[from] TransformError),

    /// No transformer matches the response `Content-Type`.
    #[error("Cannot pick a transformer for content type {}", content_type.as_deref().unwrap_or("<none>"))]
    FormatUnknown {
        /// The response `Content-Type` header, if any.
        content_type: Option<String>,
    },

    /// Configuration loading failed.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

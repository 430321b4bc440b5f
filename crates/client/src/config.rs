//! Client-wide settings.

use std::collections::BTreeMap;
use std::path::Path;

use exchange::ConnectionConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ConfigError;

/// Port used when neither the caller nor the configuration names one.
pub const DEFAULT_PORT: u16 = 80;

/// Settings shared by every request a [`crate::RestClient`] sends.
///
/// ```toml
/// default_port = 8080
///
/// [connection]
/// proxy_host = "localhost"
/// proxy_port = 3128
/// read_timeout_ms = 15000
///
/// [default_headers]
/// User-Agent = "restform-demo"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Proxy and timeout settings applied to every dispatch.
    pub connection: ConnectionConfig,

    /// Port for requests built without an explicit port.
    pub default_port: u16,

    /// Headers added to requests the client builds. A header set on the
    /// request itself wins.
    pub default_headers: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            default_port: DEFAULT_PORT,
            default_headers: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    /// Parses a TOML document. Missing keys keep their defaults.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed TOML, unknown keys or wrong value
    /// types.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::Parse {
            message: e.to_string(),
        })
    }

    /// Reads and parses the TOML file at `path`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Read`] if the file cannot be read, otherwise as for
    /// [`ClientConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "Loaded client configuration");
        Ok(config)
    }

    /// Adds a default header.
    #[must_use]
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.insert(name.into(), value.into());
        self
    }

    /// Sets the default port.
    #[must_use]
    pub fn with_default_port(mut self, port: u16) -> Self {
        self.default_port = port;
        self
    }

    /// Sets the connection settings.
    #[must_use]
    pub fn with_connection(mut self, connection: ConnectionConfig) -> Self {
        self.connection = connection;
        self
    }
}

//! Transport-level connection settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Proxy and timeout settings for one dispatch.
///
/// Every field is optional; an absent field means "use the transport's
/// default". Timeouts are (de)serialised as integer milliseconds:
///
/// ```toml
/// proxy_host = "localhost"
/// proxy_port = 8888
/// connect_timeout_ms = 2000
/// read_timeout_ms = 15000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionConfig {
    /// Proxy host name. Ignored unless `proxy_port` is also set.
    pub proxy_host: Option<String>,

    /// Proxy port.
    pub proxy_port: Option<u16>,

    /// Maximum time to establish the connection.
    #[serde(rename = "connect_timeout_ms", with = "millis")]
    pub connect_timeout: Option<Duration>,

    /// Maximum time to wait for the response once connected.
    #[serde(rename = "read_timeout_ms", with = "millis")]
    pub read_timeout: Option<Duration>,
}

impl ConnectionConfig {
    /// Routes requests through an HTTP proxy.
    #[must_use]
    pub fn with_proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.proxy_host = Some(host.into());
        self.proxy_port = Some(port);
        self
    }

    /// Sets the connect timeout.
    #[must_use]
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets the read timeout.
    #[must_use]
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    /// Returns `http://host:port` when both proxy fields are set.
    pub fn proxy_url(&self) -> Option<String> {
        match (&self.proxy_host, self.proxy_port) {
            (Some(host), Some(port)) if !host.is_empty() => Some(format!("http://{host}:{port}")),
            _ => None,
        }
    }

    /// Returns `true` when no setting deviates from the transport defaults.
    pub fn is_default(&self) -> bool {
        self.proxy_url().is_none() && self.connect_timeout.is_none() && self.read_timeout.is_none()
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(d) => serializer.serialize_some(&(d.as_millis() as u64)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}

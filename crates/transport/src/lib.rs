//! HTTP transport for restform.
//!
//! [`ReqwestTransport`] implements the [`exchange::Transport`] port over
//! `reqwest::blocking`. It sends exactly what the dispatcher lowered: no
//! retries, no redirects beyond reqwest's default policy, no caching.
//!
//! ## Architectural Layer
//!
//! **Infrastructure adapter.** The only crate in the workspace that opens
//! sockets. Constructing a blocking client inside an async runtime panics in
//! reqwest; async callers must use `spawn_blocking`.
//!
//! ## Connection settings
//!
//! The transport is built with a base [`ConnectionConfig`]. A request that
//! carries its own config gets a dedicated client when its proxy or connect
//! timeout differ from the base; the read timeout is applied per request.

use std::error::Error as _;
use std::time::Instant;

use exchange::{
    ConnectionConfig, Transport, TransportError, TransportErrorKind, Verb, WireBody, WirePart,
    WireRequest, WireResponse,
};
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use reqwest::Method;
use tracing::{debug, trace};

const USER_AGENT: &str = concat!("restform/", env!("CARGO_PKG_VERSION"));

/// [`Transport`] over a shared `reqwest::blocking::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base: ConnectionConfig,
}

impl ReqwestTransport {
    /// Creates a transport with no proxy and no timeouts.
    ///
    /// # Errors
    ///
    /// [`TransportErrorKind::Configuration`] if the TLS backend cannot be
    /// initialised.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_connection(ConnectionConfig::default())
    }

    /// Creates a transport whose shared client uses `base`.
    ///
    /// # Errors
    ///
    /// [`TransportErrorKind::Configuration`] if the proxy address is invalid
    /// or the client cannot be built.
    pub fn with_connection(base: ConnectionConfig) -> Result<Self, TransportError> {
        let client = build_client(&base)?;
        Ok(Self { client, base })
    }

    /// Returns the base connection settings.
    pub fn connection(&self) -> &ConnectionConfig {
        &self.base
    }

    fn client_for(&self, connection: Option<&ConnectionConfig>) -> Result<Client, TransportError> {
        match connection {
            Some(c) if c.proxy_url() != self.base.proxy_url() || c.connect_timeout != self.base.connect_timeout => {
                debug!(proxy = ?c.proxy_url(), connect_timeout = ?c.connect_timeout, "Building per-request client");
                build_client(c)
            }
            _ => Ok(self.client.clone()),
        }
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
        let WireRequest {
            verb,
            url,
            headers,
            body,
            connection,
        } = request;
        let target = url.to_string();
        let client = self.client_for(connection.as_ref())?;

        let multipart = matches!(body, WireBody::Multipart(_));
        let mut builder = client.request(method(verb), url);
        for (name, value) in &headers {
            // reqwest sets the multipart Content-Type with its boundary.
            if multipart && name.eq_ignore_ascii_case("content-type") {
                debug!(url = %target, content_type = %value, "Skipping caller Content-Type on multipart body");
                continue;
            }
            builder = builder.header(name.as_str(), value.as_str());
        }
        let read_timeout = connection
            .as_ref()
            .and_then(|c| c.read_timeout)
            .or(self.base.read_timeout);
        if let Some(timeout) = read_timeout {
            builder = builder.timeout(timeout);
        }
        builder = match body {
            WireBody::Empty => builder,
            WireBody::Bytes(bytes) => builder.body(bytes),
            WireBody::Multipart(parts) => builder.multipart(form(parts, &target)?),
        };

        let started = Instant::now();
        let response = builder.send().map_err(|e| classify(&e, &target))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes().map_err(|e| classify(&e, &target))?.to_vec();
        trace!(
            url = %target,
            status,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "HTTP exchange complete"
        );

        Ok(WireResponse { status, headers, body })
    }
}

fn build_client(config: &ConnectionConfig) -> Result<Client, TransportError> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = config.connect_timeout {
        builder = builder.connect_timeout(timeout);
    }
    if let Some(proxy_url) = config.proxy_url() {
        let proxy = reqwest::Proxy::all(&proxy_url).map_err(|e| {
            TransportError::new(TransportErrorKind::Configuration, proxy_url.as_str(), e.to_string())
        })?;
        builder = builder.proxy(proxy);
    }
    builder
        .build()
        .map_err(|e| TransportError::new(TransportErrorKind::Configuration, "", describe(&e)))
}

fn method(verb: Verb) -> Method {
    match verb {
        Verb::Get => Method::GET,
        Verb::Post => Method::POST,
        Verb::Put => Method::PUT,
        Verb::Delete => Method::DELETE,
    }
}

fn form(parts: Vec<WirePart>, target: &str) -> Result<Form, TransportError> {
    parts.into_iter().try_fold(Form::new(), |form, part| {
        let mut body = Part::bytes(part.data)
            .mime_str(&part.content_type)
            .map_err(|e| {
                TransportError::new(
                    TransportErrorKind::Configuration,
                    target,
                    format!("part '{}': {e}", part.name),
                )
            })?;
        if let Some(file_name) = part.file_name {
            body = body.file_name(file_name);
        }
        Ok(form.part(part.name, body))
    })
}

fn classify(error: &reqwest::Error, target: &str) -> TransportError {
    let kind = if error.is_timeout() {
        TransportErrorKind::Timeout
    } else if error.is_connect() {
        TransportErrorKind::Connect
    } else if error.is_builder() {
        TransportErrorKind::Configuration
    } else {
        TransportErrorKind::Protocol
    };
    TransportError::new(kind, target, describe(error))
}

/// Flattens an error and its sources into one line.
fn describe(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

//! Fluent typed requests.

use std::marker::PhantomData;

use exchange::{Body, Encoding, RequestDescriptor, Transport, Verb};
use transform::{AliasMap, Entity, Format, TransformExt};

use crate::{ClientError, RestClient};

/// A typed request under construction; see [`RestClient::fetch`].
///
/// ```rust,ignore
/// let products: Vec<Product> = client
///     .fetch::<Product>("api.zappos.com/Search")
///     .param("term", "boots")
///     .alias(AliasMap::root("results"))
///     .format(Format::Json)
///     .send()?;
/// ```
///
/// Without [`Fetch::format`] the format is taken from the response
/// `Content-Type`.
#[must_use = "call `send()` to perform the request"]
pub struct Fetch<'c, T, E> {
    client: &'c RestClient<T>,
    target: String,
    port: Option<u16>,
    verb: Verb,
    body: Body,
    encoding: Encoding,
    params: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    alias: AliasMap,
    format: Option<Format>,
    entity: PhantomData<fn() -> E>,
}

impl<'c, T: Transport, E: Entity> Fetch<'c, T, E> {
    pub(crate) fn new(client: &'c RestClient<T>, target: String) -> Self {
        Self {
            client,
            target,
            port: None,
            verb: Verb::Get,
            body: Body::None,
            encoding: Encoding::default(),
            params: Vec::new(),
            headers: Vec::new(),
            alias: AliasMap::whole_document(),
            format: None,
            entity: PhantomData,
        }
    }

    /// Sets the port (default: the client's configured default port).
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the verb (default `GET`).
    pub fn verb(mut self, verb: Verb) -> Self {
        self.verb = verb;
        self
    }

    /// Sets the body. Only `POST` and `PUT` accept one.
    pub fn body(mut self, body: Body) -> Self {
        self.body = body;
        self
    }

    /// Sets the transfer encoding.
    pub fn encoding(mut self, encoding: Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Appends a request parameter.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// Appends a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the alias (default: whole document).
    pub fn alias(mut self, alias: AliasMap) -> Self {
        self.alias = alias;
        self
    }

    /// Forces the body format instead of using the response `Content-Type`.
    pub fn format(mut self, format: Format) -> Self {
        self.format = Some(format);
        self
    }

    /// Builds, dispatches and transforms.
    ///
    /// # Errors
    ///
    /// [`ClientError::Request`] for invalid arguments, and otherwise as for
    /// [`RestClient::fetch_entities`] or [`RestClient::transform_response`].
    pub fn send(self) -> Result<Vec<E>, ClientError> {
        let port = self.port.unwrap_or(self.client.config().default_port);
        let request = RequestDescriptor::builder(self.verb, self.target, port, self.body)
            .encoding(self.encoding)
            .params(self.params.into_iter().collect())
            .headers(self.headers)
            .build()?;

        match self.format {
            Some(format) => self.client.fetch_entities(&request, format, &self.alias),
            None => {
                let envelope = self.client.execute(&request)?;
                self.client.transform_response(&envelope, &self.alias)
            }
        }
    }
}

impl<T, E> std::fmt::Debug for Fetch<'_, T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetch")
            .field("target", &self.target)
            .field("port", &self.port)
            .field("verb", &self.verb)
            .field("format", &self.format)
            .finish_non_exhaustive()
    }
}

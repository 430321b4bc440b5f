//! The [`RestClient`] facade.

use exchange::{
    Body, DispatchError, Dispatcher, RequestDescriptor, RequestParams, ResponseEnvelope, Transport, Verb,
};
use serde::Serialize;
use tracing::{debug, info};
use transform::{AliasMap, Entity, Format, TransformExt};
use transport::ReqwestTransport;

use crate::{ClientConfig, ClientError, Fetch};

/// One-call REST operations over a [`Transport`].
///
/// Every operation performs exactly one round trip. Typed operations
/// transform the body whatever the status code; check
/// [`ResponseEnvelope::status_code`] through [`RestClient::get_with`] when the
/// distinction matters.
#[derive(Debug)]
pub struct RestClient<T = ReqwestTransport> {
    dispatcher: Dispatcher<T>,
    config: ClientConfig,
}

impl RestClient<ReqwestTransport> {
    /// Creates a client with default settings over HTTP.
    ///
    /// # Errors
    ///
    /// [`ClientError::Transport`] if the HTTP client cannot be built.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_config(ClientConfig::default())
    }

    /// Creates a client over HTTP using `config`.
    ///
    /// # Errors
    ///
    /// [`ClientError::Transport`] if the HTTP client cannot be built (for
    /// example, an invalid proxy address).
    pub fn with_config(config: ClientConfig) -> Result<Self, ClientError> {
        let transport = ReqwestTransport::with_connection(config.connection.clone())?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> RestClient<T> {
    /// Creates a client over any transport.
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(transport),
            config,
        }
    }

    /// Returns the client settings.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the underlying dispatcher.
    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    /// `GET target:port` with no parameters.
    ///
    /// # Errors
    ///
    /// [`ClientError::Request`] for an invalid target or port,
    /// [`ClientError::Dispatch`] if the round trip fails.
    pub fn get(&self, target: &str, port: u16) -> Result<ResponseEnvelope, ClientError> {
        let request = RequestDescriptor::get(target, port).build()?;
        self.get_with(&request)
    }

    /// Dispatches a prepared descriptor of any verb.
    ///
    /// Configured default headers are added where the descriptor does not set
    /// the same header.
    ///
    /// # Errors
    ///
    /// [`ClientError::Dispatch`] if the round trip fails.
    pub fn get_with(&self, request: &RequestDescriptor) -> Result<ResponseEnvelope, ClientError> {
        Ok(self.execute(request)?)
    }

    /// `GET` and transform a JSON body.
    ///
    /// `root_key` locates the entity collection; `None` binds the whole
    /// document as one entity.
    ///
    /// # Errors
    ///
    /// As for [`RestClient::fetch_entities`].
    pub fn get_by_json<E: Entity>(
        &self,
        target: &str,
        port: u16,
        params: RequestParams,
        root_key: Option<&str>,
    ) -> Result<Vec<E>, ClientError> {
        let alias = root_key.map_or_else(AliasMap::whole_document, AliasMap::root);
        let request = RequestDescriptor::get(target, port).params(params).build()?;
        self.fetch_entities(&request, Format::Json, &alias)
    }

    /// `GET` and transform an XML body.
    ///
    /// # Errors
    ///
    /// As for [`RestClient::fetch_entities`].
    pub fn get_by_xml<E: Entity>(
        &self,
        target: &str,
        port: u16,
        params: RequestParams,
        alias: &AliasMap,
    ) -> Result<Vec<E>, ClientError> {
        let request = RequestDescriptor::get(target, port).params(params).build()?;
        self.fetch_entities(&request, Format::Xml, alias)
    }

    /// Dispatches `request` and transforms a YAML body.
    ///
    /// # Errors
    ///
    /// As for [`RestClient::fetch_entities`].
    pub fn rest_by_yaml<E: Entity>(
        &self,
        request: &RequestDescriptor,
        alias: &AliasMap,
    ) -> Result<Vec<E>, ClientError> {
        self.fetch_entities(request, Format::Yaml, alias)
    }

    /// Dispatches `request` and transforms an Atom feed.
    ///
    /// # Errors
    ///
    /// As for [`RestClient::fetch_entities`].
    pub fn rest_by_atom<E: Entity>(
        &self,
        request: &RequestDescriptor,
        alias: &AliasMap,
    ) -> Result<Vec<E>, ClientError> {
        self.fetch_entities(request, Format::Atom, alias)
    }

    /// `POST` `object` serialized as JSON.
    ///
    /// # Errors
    ///
    /// [`ClientError::Request`] if `object` cannot be serialized or the
    /// target is invalid, [`ClientError::Dispatch`] if the round trip fails.
    pub fn post_as_json<O: Serialize + ?Sized>(
        &self,
        target: &str,
        port: u16,
        object: &O,
    ) -> Result<ResponseEnvelope, ClientError> {
        let request = RequestDescriptor::post_object(target, port, object)?.build()?;
        self.get_with(&request)
    }

    /// Dispatches `request` and transforms the body as `format`.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Dispatch`] if the round trip fails.
    /// - [`ClientError::Transform`] if the body is malformed or `E`'s
    ///   bindings conflict with `alias`.
    pub fn fetch_entities<E: Entity>(
        &self,
        request: &RequestDescriptor,
        format: Format,
        alias: &AliasMap,
    ) -> Result<Vec<E>, ClientError> {
        let envelope = self.execute(request)?;
        let entities = format.transformer().transform_envelope::<E>(&envelope, alias)?;
        debug!(
            request_id = %envelope.request_id(),
            format = %format,
            type_name = E::TYPE_NAME,
            count = entities.len(),
            "Transformed response"
        );
        Ok(entities)
    }

    /// Transforms an already received response, picking the format from its
    /// `Content-Type`.
    ///
    /// # Errors
    ///
    /// [`ClientError::FormatUnknown`] if the content type names no supported
    /// format, otherwise as for [`transform::TransformExt::transform`].
    pub fn transform_response<E: Entity>(
        &self,
        envelope: &ResponseEnvelope,
        alias: &AliasMap,
    ) -> Result<Vec<E>, ClientError> {
        let format = envelope
            .content_type()
            .as_ref()
            .and_then(Format::from_content_type)
            .ok_or_else(|| ClientError::FormatUnknown {
                content_type: envelope.header("content-type").map(str::to_string),
            })?;
        Ok(format.transformer().transform_envelope(envelope, alias)?)
    }

    /// Starts a typed request for `target`.
    pub fn fetch<E: Entity>(&self, target: impl Into<String>) -> Fetch<'_, T, E> {
        Fetch::new(self, target.into())
    }

    /// Starts a descriptor using the configured default port.
    pub fn request(&self, verb: Verb, target: impl Into<String>, body: Body) -> exchange::RequestBuilder {
        RequestDescriptor::builder(verb, target, self.config.default_port, body)
    }

    pub(crate) fn execute(&self, request: &RequestDescriptor) -> Result<ResponseEnvelope, DispatchError> {
        let defaults = self
            .config
            .default_headers
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()));
        let request = request.with_default_headers(defaults);
        let envelope = self
            .dispatcher
            .dispatch(&request, Some(&self.config.connection))?;
        info!(
            request_id = %envelope.request_id(),
            status = envelope.status_code(),
            bytes = envelope.length(),
            "Request completed"
        );
        Ok(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeTransport;
    use exchange::{ContentType, Encoding};
    use transform::FieldBinding;

    #[derive(Debug, Default, PartialEq)]
    struct Product {
        product_id: u64,
        product_name: String,
    }

    impl Entity for Product {
        const TYPE_NAME: &'static str = "Product";

        fn bindings() -> Vec<FieldBinding<Self>> {
            vec![
                FieldBinding::parsed("productId", |p, v| p.product_id = v),
                FieldBinding::text("productName", |p, v| p.product_name = v),
            ]
        }
    }

    #[derive(Debug, Default, PartialEq)]
    struct Status {
        message: String,
        value: u32,
    }

    impl Entity for Status {
        const TYPE_NAME: &'static str = "Status";

        fn bindings() -> Vec<FieldBinding<Self>> {
            vec![
                FieldBinding::text("message", |s, v| s.message = v),
                FieldBinding::parsed("value", |s, v| s.value = v),
            ]
        }
    }

    const PRODUCTS: &str = r#"{"product":[{"productId":"7515478","productName":"Gigi"}],"statusCode":"200"}"#;

    fn client(transport: &FakeTransport) -> RestClient<&FakeTransport> {
        RestClient::with_transport(transport, ClientConfig::default())
    }

    #[test]
    fn test_get_by_json_binds_products() {
        let transport = FakeTransport::replying(200, "application/json", PRODUCTS);
        let params: RequestParams = [("term", "boots"), ("key", "k")].into_iter().collect();
        let products: Vec<Product> = client(&transport)
            .get_by_json("api.example.com/Search.jsonp", 80, params, Some("product"))
            .unwrap();

        assert_eq!(products[0].product_id, 7515478);
        let sent = transport.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].url.query(), Some("term=boots&key=k"));
    }

    #[test]
    fn test_get_by_xml_with_attribute_alias() {
        let body = r#"<geonames><status message="limit exceeded" value="18"/></geonames>"#;
        let transport = FakeTransport::replying(200, "text/xml", body);
        let alias = AliasMap::builder()
            .root_key("geonames/status")
            .attribute("Status", "message")
            .attribute("Status", "value")
            .build();
        let statuses: Vec<Status> = client(&transport)
            .get_by_xml("ws.geonames.org/postalCodeSearch", 80, RequestParams::new(), &alias)
            .unwrap();
        assert_eq!(
            statuses,
            vec![Status {
                message: "limit exceeded".to_string(),
                value: 18
            }]
        );
    }

    #[test]
    fn test_error_status_body_is_still_transformed() {
        let transport = FakeTransport::replying(500, "application/json", r#"{"err":"824"}"#);
        let products: Vec<Product> = client(&transport)
            .get_by_json("localhost", 8080, RequestParams::new(), Some("product"))
            .unwrap();
        assert!(products.is_empty());
    }

    #[test]
    fn test_406_is_returned_as_envelope() {
        let transport = FakeTransport::replying(406, "text/plain", "Not Acceptable");
        let envelope = client(&transport).get("localhost/strict", 8080).unwrap();
        assert_eq!(envelope.status_code(), 406);
        assert_eq!(envelope.body_as_text(), "Not Acceptable");
    }

    #[test]
    fn test_transport_failure_is_dispatch_error() {
        let transport = FakeTransport::failing();
        let err = client(&transport).get("localhost", 8080).unwrap_err();
        assert!(matches!(err, ClientError::Dispatch(DispatchError::Transport(_))));
        assert_eq!(transport.sent().len(), 1);
    }

    #[test]
    fn test_post_as_json_sends_serialized_object() {
        let transport = FakeTransport::replying(201, "application/json", "{}");
        let envelope = client(&transport)
            .post_as_json("localhost/items", 8080, &serde_json::json!({"name": "Gigi"}))
            .unwrap();
        assert_eq!(envelope.status_code(), 201);

        let sent = transport.sent();
        assert_eq!(sent[0].verb, Verb::Post);
        assert_eq!(sent[0].header("content-type"), Some("application/json; charset=UTF-8"));
        assert_eq!(sent[0].body, exchange::WireBody::Bytes(br#"{"name":"Gigi"}"#.to_vec()));
    }

    #[test]
    fn test_rest_by_yaml_and_atom() {
        let yaml = FakeTransport::replying(200, "application/x-yaml", "product:\n  productId: 3\n");
        let request = RequestDescriptor::get("localhost/p.yaml", 8080).build().unwrap();
        let products: Vec<Product> = client(&yaml)
            .rest_by_yaml(&request, &AliasMap::root("product"))
            .unwrap();
        assert_eq!(products[0].product_id, 3);

        let atom = FakeTransport::replying(
            200,
            "application/atom+xml",
            "<feed xmlns=\"http://www.w3.org/2005/Atom\"><title>T</title></feed>",
        );
        let feeds: Vec<transform::AtomFeed> = client(&atom)
            .rest_by_atom(&request, &AliasMap::whole_document())
            .unwrap();
        assert_eq!(feeds[0].title, "T");
    }

    #[test]
    fn test_transform_response_uses_content_type() {
        let transport = FakeTransport::replying(200, "application/json; charset=UTF-8", PRODUCTS);
        let client = client(&transport);
        let envelope = client.get("localhost", 8080).unwrap();
        let products: Vec<Product> = client
            .transform_response(&envelope, &AliasMap::root("product"))
            .unwrap();
        assert_eq!(products.len(), 1);

        let transport = FakeTransport::replying(200, "image/png", "");
        let client = RestClient::with_transport(&transport, ClientConfig::default());
        let envelope = client.get("localhost", 8080).unwrap();
        let err = client
            .transform_response::<Product>(&envelope, &AliasMap::root("product"))
            .unwrap_err();
        assert!(matches!(err, ClientError::FormatUnknown { content_type: Some(ref ct) } if ct == "image/png"));
    }

    #[test]
    fn test_default_headers_and_connection_are_applied() {
        let transport = FakeTransport::replying(200, "text/plain", "ok");
        let config = ClientConfig::default()
            .with_default_header("X-Api-Key", "secret")
            .with_default_header("Accept", "application/json")
            .with_connection(exchange::ConnectionConfig::default().with_proxy("proxy", 3128));
        let client = RestClient::with_transport(&transport, config);
        let request = RequestDescriptor::get("localhost", 8080)
            .header("Accept", "text/csv")
            .encoding(Encoding::Binary)
            .build()
            .unwrap();
        client.get_with(&request).unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0].header("x-api-key"), Some("secret"));
        assert_eq!(sent[0].header("accept"), Some("text/csv"));
        assert_eq!(
            sent[0].connection.as_ref().and_then(|c| c.proxy_url()).as_deref(),
            Some("http://proxy:3128")
        );
    }

    #[test]
    fn test_request_uses_default_port() {
        let transport = FakeTransport::replying(200, "text/plain", "ok");
        let client = RestClient::with_transport(&transport, ClientConfig::default().with_default_port(9090));
        let request = client
            .request(Verb::Post, "localhost/notes", Body::message("hi", ContentType::TextPlain))
            .build()
            .unwrap();
        assert_eq!(request.base_url().port(), Some(9090));
    }

    #[test]
    fn test_malformed_body_is_transform_error() {
        let transport = FakeTransport::replying(200, "application/json", "{oops");
        let err = client(&transport)
            .get_by_json::<Product>("localhost", 8080, RequestParams::new(), None)
            .unwrap_err();
        assert!(matches!(err, ClientError::Transform(_)));
    }
}

//! Executes request descriptors against a [`Transport`].

use std::path::Path;
use std::time::Instant;

use tracing::{debug, info, info_span, warn};

use crate::{
    Body, BodyPart, ConnectionConfig, ContentType, DispatchError, Encoding, RequestDescriptor,
    RequestId, ResponseEnvelope, Transport, WireBody, WirePart, WireRequest,
};

/// Turns one [`RequestDescriptor`] into one [`ResponseEnvelope`].
///
/// The dispatcher owns its transport explicitly; there is no process-wide
/// client. It keeps no state between calls, so a shared `Dispatcher` may be
/// used from several threads, and dispatching the same descriptor twice
/// issues two independent round trips.
#[derive(Debug, Clone)]
pub struct Dispatcher<T> {
    transport: T,
}

impl<T: Transport> Dispatcher<T> {
    /// Creates a dispatcher over `transport`.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Sends `request` and captures the response.
    ///
    /// Blocks the calling thread until the transport returns. Any status code
    /// (including 4xx/5xx) yields `Ok`.
    ///
    /// # Errors
    ///
    /// - [`DispatchError::UnreadableBody`] if a file body cannot be read; nothing is sent.
    /// - [`DispatchError::Encode`] if an object body cannot be encoded; nothing is sent.
    /// - [`DispatchError::Transport`] if the round trip fails. Not retried.
    pub fn dispatch(
        &self,
        request: &RequestDescriptor,
        connection: Option<&ConnectionConfig>,
    ) -> Result<ResponseEnvelope, DispatchError> {
        let request_id = RequestId::new_random();
        let span = info_span!(
            "dispatch",
            request_id = %request_id,
            verb = %request.verb(),
            url = %request.base_url(),
        );
        let _entered = span.enter();

        let wire = encode_request(request, connection)?;
        debug!(
            headers = wire.headers.len(),
            body = ?body_summary(&wire.body),
            "Sending request"
        );

        let started = Instant::now();
        let response = self.transport.send(wire).map_err(|e| {
            warn!(kind = %e.kind, error = %e.message, "Transport failure");
            e
        })?;
        info!(
            status = response.status,
            bytes = response.body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Response received"
        );

        Ok(ResponseEnvelope::from_wire(request_id, request.clone(), response))
    }
}

/// Lowers a descriptor to its wire form without sending it.
///
/// - `GET`/`DELETE`: parameters become the query string.
/// - `POST`/`PUT` with [`Body::None`]: parameters become a form body.
/// - Other bodies are encoded per variant; parameters stay in the query string.
/// - Default `Content-Type`, `Accept` and `Accept-Charset` headers are derived
///   from the body and encoding; caller headers with the same name replace them.
/// - Multipart bodies get no `Content-Type` here. The transport owns it,
///   boundary included, and drops a caller-supplied one.
///
/// # Errors
///
/// See [`Dispatcher::dispatch`].
pub fn encode_request(
    request: &RequestDescriptor,
    connection: Option<&ConnectionConfig>,
) -> Result<WireRequest, DispatchError> {
    let encoding = request.encoding();
    let (body, content_type) = encode_body(request)?;

    let mut headers = Vec::new();
    if let Some(content_type) = content_type {
        headers.push(("Content-Type".to_string(), content_type.header_value(encoding)));
    }
    match encoding {
        Encoding::Utf8 => headers.push(("Accept-Charset".to_string(), "UTF-8".to_string())),
        Encoding::Binary => headers.push((
            "Accept".to_string(),
            ContentType::ApplicationOctetStream.as_mime().to_string(),
        )),
    }

    let caller = request.headers();
    headers.retain(|(name, _)| !caller.iter().any(|(c, _)| c.eq_ignore_ascii_case(name)));
    headers.extend(caller.iter().cloned());

    Ok(WireRequest {
        verb: request.verb(),
        url: request.url(),
        headers,
        body,
        connection: connection.filter(|c| !c.is_default()).cloned(),
    })
}

fn encode_body(request: &RequestDescriptor) -> Result<(WireBody, Option<ContentType>), DispatchError> {
    match request.body() {
        Body::None => {
            if request.params_in_query() || request.params().is_empty() {
                Ok((WireBody::Empty, None))
            } else {
                Ok((
                    WireBody::Bytes(request.params().to_form_urlencoded().into_bytes()),
                    Some(ContentType::FormUrlEncoded),
                ))
            }
        }
        Body::Message { text, content_type } => {
            Ok((WireBody::Bytes(text.clone().into_bytes()), Some(content_type.clone())))
        }
        Body::File { path, content_type } => {
            Ok((WireBody::Bytes(read_file(path)?), Some(content_type.clone())))
        }
        Body::Multipart {
            parts,
            file_content_type,
        } => {
            let parts = parts
                .iter()
                .map(|(name, part)| encode_part(name, part, file_content_type.as_ref()))
                .collect::<Result<Vec<_>, _>>()?;
            // The transport supplies Content-Type with the boundary.
            Ok((WireBody::Multipart(parts), None))
        }
        Body::Object { value } => {
            let bytes = serde_json::to_vec(value).map_err(|e| DispatchError::Encode {
                message: e.to_string(),
            })?;
            Ok((WireBody::Bytes(bytes), Some(ContentType::ApplicationJson)))
        }
    }
}

fn encode_part(
    name: &str,
    part: &BodyPart,
    file_content_type: Option<&ContentType>,
) -> Result<WirePart, DispatchError> {
    match part {
        BodyPart::Text {
            value,
            content_type,
        } => Ok(WirePart {
            name: name.to_string(),
            file_name: None,
            content_type: content_type
                .as_ref()
                .unwrap_or(&ContentType::TextPlain)
                .as_mime()
                .to_string(),
            data: value.clone().into_bytes(),
        }),
        BodyPart::File { path, content_type } => Ok(WirePart {
            name: name.to_string(),
            file_name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
            content_type: content_type
                .as_ref()
                .or(file_content_type)
                .unwrap_or(&ContentType::ApplicationOctetStream)
                .as_mime()
                .to_string(),
            data: read_file(path)?,
        }),
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, DispatchError> {
    std::fs::read(path).map_err(|source| DispatchError::UnreadableBody {
        path: path.to_path_buf(),
        source,
    })
}

fn body_summary(body: &WireBody) -> String {
    match body {
        WireBody::Empty => "empty".to_string(),
        WireBody::Bytes(bytes) => format!("{} bytes", bytes.len()),
        WireBody::Multipart(parts) => format!("{} parts", parts.len()),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::Mutex;

    use super::*;
    use crate::{BodyPart, TransportError, TransportErrorKind, Verb, WireResponse};

    /// Records every request and answers with a scripted result.
    struct FakeTransport {
        sent: Mutex<Vec<WireRequest>>,
        reply: Result<WireResponse, TransportError>,
    }

    impl FakeTransport {
        fn answering(status: u16, body: &str) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                reply: Ok(WireResponse {
                    status,
                    headers: vec![("Content-Type".to_string(), "text/plain".to_string())],
                    body: body.as_bytes().to_vec(),
                }),
            }
        }

        fn failing(kind: TransportErrorKind) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                reply: Err(TransportError::new(kind, "http://localhost:1/", "connection refused")),
            }
        }

        fn sent(&self) -> Vec<WireRequest> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl Transport for FakeTransport {
        fn send(&self, request: WireRequest) -> Result<WireResponse, TransportError> {
            self.sent.lock().unwrap().push(request);
            self.reply.clone()
        }
    }

    fn get(target: &str) -> RequestDescriptor {
        RequestDescriptor::get(target, 8080).build().unwrap()
    }

    #[test]
    fn test_not_acceptable_status_is_returned_not_raised() {
        let dispatcher = Dispatcher::new(FakeTransport::answering(406, ""));
        let response = dispatcher
            .dispatch(&get("http://localhost/testresting/rest/hello/octet"), None)
            .unwrap();
        assert_eq!(response.status_code(), 406);
        assert!(!response.is_success());
    }

    #[test]
    fn test_transport_failure_is_surfaced_once_without_retry() {
        let dispatcher = Dispatcher::new(FakeTransport::failing(TransportErrorKind::Connect));
        let result = dispatcher.dispatch(&get("http://localhost/down"), None);
        match result {
            Err(DispatchError::Transport(e)) => assert_eq!(e.kind, TransportErrorKind::Connect),
            other => panic!("expected transport error, got {other:?}"),
        }
        assert_eq!(dispatcher.transport().sent().len(), 1);
    }

    #[test]
    fn test_each_dispatch_is_an_independent_round_trip() {
        let dispatcher = Dispatcher::new(FakeTransport::answering(200, "ok"));
        let request = get("http://localhost/hello");
        let first = dispatcher.dispatch(&request, None).unwrap();
        let second = dispatcher.dispatch(&request, None).unwrap();
        assert_eq!(dispatcher.transport().sent().len(), 2);
        assert_ne!(first.request_id(), second.request_id());
        assert_eq!(first.request(), &request);
    }

    #[test]
    fn test_get_sends_params_in_query_with_utf8_defaults() {
        let request = RequestDescriptor::get("http://api.zappos.com/Search", 80)
            .param("key", "abc")
            .param("facets", "[\"brandNameFacet\"]")
            .build()
            .unwrap();
        let wire = encode_request(&request, None).unwrap();
        assert_eq!(wire.verb, Verb::Get);
        assert_eq!(
            wire.url.query(),
            Some("key=abc&facets=%5B%22brandNameFacet%22%5D")
        );
        assert_eq!(wire.body, WireBody::Empty);
        assert_eq!(wire.header("accept-charset"), Some("UTF-8"));
        assert_eq!(wire.header("content-type"), None);
    }

    #[test]
    fn test_binary_encoding_requests_octet_stream() {
        let request = RequestDescriptor::get("http://localhost/octet", 8080)
            .encoding(Encoding::Binary)
            .build()
            .unwrap();
        let wire = encode_request(&request, None).unwrap();
        assert_eq!(wire.header("Accept"), Some("application/octet-stream"));
        assert_eq!(wire.header("Accept-Charset"), None);
    }

    #[test]
    fn test_caller_headers_win_over_defaults() {
        let request = RequestDescriptor::post_message("http://localhost/post", 8080, "{}", ContentType::ApplicationJson)
            .encoding(Encoding::Binary)
            .header("accept", "application/json")
            .header("content-type", "application/vnd.api+json")
            .build()
            .unwrap();
        let wire = encode_request(&request, None).unwrap();
        let accepts: Vec<_> = wire
            .headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case("accept"))
            .collect();
        assert_eq!(accepts.len(), 1);
        assert_eq!(wire.header("Accept"), Some("application/json"));
        assert_eq!(wire.header("Content-Type"), Some("application/vnd.api+json"));
    }

    #[test]
    fn test_post_without_body_sends_form() {
        let request = RequestDescriptor::post("http://localhost/form", 8080, Body::None)
            .param("street", "My Avenue")
            .param("number", "33")
            .build()
            .unwrap();
        let wire = encode_request(&request, None).unwrap();
        assert_eq!(wire.url.query(), None);
        assert_eq!(wire.body, WireBody::Bytes(b"street=My+Avenue&number=33".to_vec()));
        assert_eq!(
            wire.header("Content-Type"),
            Some("application/x-www-form-urlencoded; charset=UTF-8")
        );
    }

    #[test]
    fn test_message_body_is_labelled_with_charset() {
        let request = RequestDescriptor::post_message("http://localhost/post", 8080, "hello", ContentType::TextPlain)
            .build()
            .unwrap();
        let wire = encode_request(&request, None).unwrap();
        assert_eq!(wire.body, WireBody::Bytes(b"hello".to_vec()));
        assert_eq!(wire.header("Content-Type"), Some("text/plain; charset=UTF-8"));
    }

    #[test]
    fn test_file_body_is_read_at_dispatch() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Berlin\nParis\n").unwrap();

        let request = RequestDescriptor::put(
            "http://localhost/post/file",
            8080,
            Body::file(file.path(), ContentType::TextPlain),
        )
        .build()
        .unwrap();
        let wire = encode_request(&request, None).unwrap();
        assert_eq!(wire.verb, Verb::Put);
        assert_eq!(wire.body, WireBody::Bytes(b"Berlin\nParis\n".to_vec()));
    }

    #[test]
    fn test_missing_file_fails_before_sending() {
        let dispatcher = Dispatcher::new(FakeTransport::answering(200, ""));
        let request = RequestDescriptor::post_file(
            "http://localhost/post/imagefile",
            8080,
            "/definitely/not/here.png",
            ContentType::ImagePng,
        )
        .encoding(Encoding::Binary)
        .build()
        .unwrap();
        let result = dispatcher.dispatch(&request, None);
        assert!(matches!(result, Err(DispatchError::UnreadableBody { .. })));
        assert!(dispatcher.transport().sent().is_empty());
    }

    #[test]
    fn test_multipart_parts_are_encoded_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("1.jpg");
        std::fs::write(&image, [0xFF, 0xD8, 0xFF]).unwrap();

        let request = RequestDescriptor::post_multipart(
            "http://localhost/all/fileUpload/file",
            9800,
            [
                ("Message 1", BodyPart::text("The content of Message 1")),
                ("file", BodyPart::file(&image)),
            ],
        )
        .content_type(ContentType::ImageJpeg)
        .build()
        .unwrap();
        let wire = encode_request(&request, None).unwrap();

        assert_eq!(wire.header("Content-Type"), None);
        match wire.body {
            WireBody::Multipart(parts) => {
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[0].name, "Message 1");
                assert_eq!(parts[0].content_type, "text/plain");
                assert_eq!(parts[0].file_name, None);
                assert_eq!(parts[1].name, "file");
                assert_eq!(parts[1].file_name.as_deref(), Some("1.jpg"));
                assert_eq!(parts[1].content_type, "image/jpeg");
                assert_eq!(parts[1].data, vec![0xFF, 0xD8, 0xFF]);
            }
            other => panic!("expected multipart body, got {other:?}"),
        }
    }

    #[test]
    fn test_object_body_is_json() {
        let request = RequestDescriptor::post_object(
            "http://localhost/post/jsonobject",
            8080,
            &serde_json::json!({"street": "My Avenue", "number": 33}),
        )
        .unwrap()
        .build()
        .unwrap();
        let wire = encode_request(&request, None).unwrap();
        assert_eq!(
            wire.header("Content-Type"),
            Some("application/json; charset=UTF-8")
        );
        match wire.body {
            WireBody::Bytes(bytes) => {
                let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
                assert_eq!(value["number"], 33);
            }
            other => panic!("expected byte body, got {other:?}"),
        }
    }

    #[test]
    fn test_default_connection_config_is_not_forwarded() {
        let request = get("http://localhost/hello");
        let wire = encode_request(&request, Some(&ConnectionConfig::default())).unwrap();
        assert_eq!(wire.connection, None);

        let proxied = ConnectionConfig::default().with_proxy("localhost", 8888);
        let wire = encode_request(&request, Some(&proxied)).unwrap();
        assert_eq!(wire.connection, Some(proxied));
    }
}

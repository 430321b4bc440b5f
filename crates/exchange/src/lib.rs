//! Request/response domain for restform.
//!
//! This crate describes HTTP exchanges and executes them through a transport
//! port. It never speaks HTTP itself: infrastructure crates implement
//! [`Transport`]; the [`Dispatcher`] lowers descriptors to wire form and wraps
//! what comes back.
//!
//! ## Architectural Layer
//!
//! **Domain + port definitions.** No HTTP client dependency. Tests substitute
//! an in-memory [`Transport`].
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`request`] | `RequestDescriptor`, `RequestBuilder`, `Body`, `BodyPart`, `RequestParams` |
//! | [`config`] | `ConnectionConfig` (proxy, timeouts) |
//! | [`transport`] | The `Transport` port and its wire types |
//! | [`dispatch`] | `Dispatcher` and request lowering |
//! | [`response`] | `ResponseEnvelope` |
//! | [`types`] | `Verb`, `Encoding`, `ContentType`, `Timestamp` |
//! | [`identifiers`] | `RequestId` |
//! | [`errors`] | `RequestError`, `TransportError`, `DispatchError` |

pub mod config;
pub mod dispatch;
pub mod errors;
pub mod identifiers;
pub mod request;
pub mod response;
pub mod transport;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use config::ConnectionConfig;
pub use dispatch::{encode_request, Dispatcher};
pub use errors::{DispatchError, RequestError, TransportError, TransportErrorKind};
pub use identifiers::RequestId;
pub use request::{Body, BodyKind, BodyPart, RequestBuilder, RequestDescriptor, RequestParams};
pub use response::ResponseEnvelope;
pub use transport::{Transport, WireBody, WirePart, WireRequest, WireResponse};
pub use types::{ContentType, Encoding, Timestamp, Verb};

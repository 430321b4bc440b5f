//! One-call typed REST operations.
//!
//! [`RestClient`] composes the `exchange` dispatcher, the reqwest-backed
//! `transport` adapter and the `transform` transformers:
//!
//! ```rust,ignore
//! use client::RestClient;
//! use exchange::RequestParams;
//!
//! let client = RestClient::new()?;
//! let params: RequestParams = [("term", "boots"), ("key", api_key)].into_iter().collect();
//! let products: Vec<Product> =
//!     client.get_by_json("api.zappos.com/Search", 80, params, Some("results"))?;
//! ```
//!
//! ## Architectural Layer
//!
//! **Facade.** Adds no behaviour of its own beyond applying [`ClientConfig`]
//! (default port, default headers, connection settings) to each request.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`client`] | `RestClient` |
//! | [`fetch`] | `Fetch` builder |
//! | [`config`] | `ClientConfig` and TOML loading |
//! | [`errors`] | `ClientError`, `ConfigError` |

pub mod client;
pub mod config;
pub mod errors;
pub mod fetch;

#[cfg(test)]
mod testing;

pub use client::RestClient;
pub use config::{ClientConfig, DEFAULT_PORT};
pub use errors::{ClientError, ConfigError};
pub use fetch::Fetch;

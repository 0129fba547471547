//! Async client core for the WooCommerce REST API.
//!
//! # Overview
//! Builds authenticated requests against a store's `wp-json/<version>`
//! namespace and hands them to a pluggable transport. The client composes
//! URLs, flattens query parameters, attaches bearer-token and JSON headers,
//! and returns the transport's response untouched.
//!
//! # Design
//! - `Client` holds an immutable `ClientConfig`; it is cheap to clone and safe
//!   to share across tasks.
//! - Request assembly (`build_request`) is separate from dispatch, so the
//!   exact options a transport will see can be inspected without I/O.
//! - `Transport` is the only I/O seam. `UreqTransport` is the default.
//! - Errors from the transport are passed through, never classified. The
//!   default `UreqTransport` turns 4xx/5xx into `ureq::Error::StatusCode`,
//!   which drops the store's JSON error body; build the client with
//!   `UreqTransport::new().status_as_error(false)` to read it from the
//!   returned `HttpResponse` instead.
//!
//! ```no_run
//! # async fn run() -> woocommerce_core::Result<()> {
//! use woocommerce_core::{Client, ClientConfig};
//!
//! let client = Client::new(ClientConfig::new("https://shop.example.com").with_token("jwt"))?;
//! let response = client.get("products", None).await?;
//! println!("{}", response.body);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod params;
pub mod platform;
pub mod transport;

#[cfg(test)]
pub(crate) mod test_utils;

pub use client::Client;
pub use config::{ApiVersion, ClientConfig, TokenPolicy, TransportOverrides};
pub use error::{BoxError, Error, Result};
pub use http::{HttpMethod, HttpResponse, RequestOptions};
pub use params::{flatten_params, query_pairs, Params};
pub use platform::{HostPlatform, Platform, SandboxedPlatform};
pub use transport::{Transport, UreqTransport};

//! The pluggable HTTP transport and its default ureq implementation.
//!
//! # Design
//! The client never touches the network itself. It hands a finished
//! `RequestOptions` to a `Transport` and returns whatever comes back. The
//! default `UreqTransport` runs ureq's blocking agent on tokio's blocking
//! pool so callers still get a future and never block the async executor.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::BoxError;
use crate::http::{HttpResponse, RequestOptions};
use crate::params::query_pairs;

/// Executes an assembled request.
///
/// Implementations own everything below the request options: connections,
/// TLS, redirects, status handling. Whatever error they return reaches the
/// caller unchanged inside `Error::Transport`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RequestOptions) -> Result<HttpResponse, BoxError>;
}

/// Blocking ureq agent driven from tokio's blocking thread pool.
///
/// Must be used from within a tokio runtime. Non-2xx responses are reported
/// as `ureq::Error::StatusCode` unless [`status_as_error`](Self::status_as_error)
/// is turned off. A numeric `maxRedirects` override is honored.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    status_as_error: bool,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    /// Agent that reports 4xx/5xx responses as `ureq::Error::StatusCode`.
    ///
    /// That error carries only the status code; the store's JSON error body
    /// (`code`, `message`) is discarded. Use `status_as_error(false)` to get
    /// such responses back as an `HttpResponse` with the body intact.
    pub fn new() -> Self {
        Self {
            agent: agent(true, None, None),
            status_as_error: true,
        }
    }

    /// Choose whether 4xx/5xx responses are errors (the default) or data.
    pub fn status_as_error(mut self, enabled: bool) -> Self {
        self.agent = agent(enabled, None, None);
        self.status_as_error = enabled;
        self
    }

    fn execute(&self, options: RequestOptions) -> Result<HttpResponse, BoxError> {
        let mut url = Url::parse(&options.url)?;
        let pairs = query_pairs(&options.query);
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }

        let max_redirects = options
            .extra
            .get("maxRedirects")
            .and_then(Value::as_u64)
            .map(|n| u32::try_from(n).unwrap_or(u32::MAX));
        let agent = match (options.timeout(), max_redirects) {
            (None, None) => self.agent.clone(),
            (timeout, redirects) => agent(self.status_as_error, timeout, redirects),
        };

        let mut builder = ureq::http::Request::builder()
            .method(options.method.as_str())
            .uri(url.as_str());
        for (name, value) in &options.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        debug!(method = %options.method, url = %url, "sending request");
        let mut response = match options.body {
            Some(body) => agent.run(builder.body(body)?)?,
            None => agent.run(builder.body(())?)?,
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let bytes = response.body_mut().read_to_vec()?;
        let body = decode_body(bytes, &options.encoding)?;

        debug!(status, "received response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn send(&self, request: RequestOptions) -> Result<HttpResponse, BoxError> {
        let transport = self.clone();
        tokio::task::spawn_blocking(move || transport.execute(request)).await?
    }
}

fn agent(status_as_error: bool, timeout: Option<Duration>, max_redirects: Option<u32>) -> ureq::Agent {
    let mut config = ureq::Agent::config_builder()
        .http_status_as_error(status_as_error)
        .timeout_global(timeout);
    if let Some(max_redirects) = max_redirects {
        config = config.max_redirects(max_redirects);
    }
    config.build().new_agent()
}

/// Decode a response body according to the configured response encoding.
fn decode_body(bytes: Vec<u8>, encoding: &str) -> Result<String, BoxError> {
    match encoding.to_ascii_lowercase().as_str() {
        "utf8" | "utf-8" => Ok(String::from_utf8(bytes)?),
        "latin1" | "binary" => Ok(bytes.into_iter().map(char::from).collect()),
        other => Err(format!("unsupported response encoding `{other}`").into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_body_decodes() {
        let body = decode_body("café".as_bytes().to_vec(), "utf8").unwrap();
        assert_eq!(body, "café");
    }

    #[test]
    fn utf8_accepts_dashed_spelling() {
        assert_eq!(decode_body(b"ok".to_vec(), "UTF-8").unwrap(), "ok");
    }

    #[test]
    fn invalid_utf8_is_an_error() {
        assert!(decode_body(vec![0xff, 0xfe], "utf8").is_err());
    }

    #[test]
    fn latin1_maps_bytes_to_chars() {
        let body = decode_body(vec![0x63, 0x61, 0x66, 0xe9], "latin1").unwrap();
        assert_eq!(body, "café");
    }

    #[test]
    fn unknown_encoding_is_an_error() {
        let err = decode_body(b"x".to_vec(), "ucs2").unwrap_err();
        assert!(err.to_string().contains("ucs2"));
    }
}

//! Request builder and dispatcher for the WooCommerce REST API.
//!
//! # Design
//! `Client` owns a validated `ClientConfig` and never mutates it, so a single
//! client can be shared across tasks. Every call goes through the same two
//! steps: `build_request` turns the configuration, endpoint, body and
//! parameters into a `RequestOptions`, then the transport executes it. The
//! response, or the transport's error, is returned without interpretation.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{headers, HttpMethod, HttpResponse, RequestOptions, JSON, JSON_UTF8};
use crate::params::{flatten_params, Params};
use crate::platform::{HostPlatform, Platform, USER_AGENT};
use crate::transport::{Transport, UreqTransport};

/// Client for a single WooCommerce store.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    platform: Arc<dyn Platform>,
}

impl Client {
    /// Build a client that sends requests through [`UreqTransport`].
    ///
    /// Fails with `Error::Configuration` when `config` has no usable `url`,
    /// or when its token policy demands a token that is not set.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::with_transport(config, UreqTransport::new())
    }

    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transport: Arc::new(transport),
            platform: Arc::new(HostPlatform),
        })
    }

    /// Replace the platform consulted for the `User-Agent` header.
    pub fn with_platform(mut self, platform: impl Platform + 'static) -> Self {
        self.platform = Arc::new(platform);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Compose `base/prefix/version/endpoint`.
    ///
    /// The base URL's trailing slashes collapse to exactly one separator. When
    /// a port override is configured, `:port` is written right after the host
    /// (replacing any port already there). Every other byte of the composed
    /// URL stays as it was, including path segments that repeat the hostname.
    pub fn build_url(&self, endpoint: &str) -> Result<String> {
        let base = self.config.url.trim().trim_end_matches('/');
        let composed = format!(
            "{base}/{}/{}/{endpoint}",
            self.config.api_prefix, self.config.version
        );

        match self.config.port {
            Some(port) => splice_port(base, &composed, port),
            None => Ok(composed),
        }
    }

    /// Assemble the options for one request without sending it.
    ///
    /// A `None` or JSON `null` body produces a request with neither a body nor
    /// a `Content-Type`. Transport overrides are applied last and win.
    pub fn build_request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
        params: Option<&Params>,
    ) -> Result<RequestOptions> {
        let url = self.build_url(endpoint)?;

        let mut request_headers = BTreeMap::new();
        request_headers.insert(headers::ACCEPT.to_string(), JSON.to_string());
        if self.platform.exposes_process_identity() {
            request_headers.insert(headers::USER_AGENT.to_string(), USER_AGENT.to_string());
        }
        if let Some(token) = self.config.bearer_token() {
            request_headers.insert(headers::AUTHORIZATION.to_string(), format!("Bearer {token}"));
        }

        let body = match body {
            Some(value) if !value.is_null() => {
                request_headers.insert(headers::CONTENT_TYPE.to_string(), JSON_UTF8.to_string());
                Some(serde_json::to_string(value)?)
            }
            _ => None,
        };

        let options = RequestOptions {
            method,
            url,
            headers: request_headers,
            query: params.map(flatten_params).unwrap_or_default(),
            body,
            timeout_ms: self
                .config
                .timeout
                .map(|timeout| u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX)),
            encoding: self.config.encoding.clone(),
            extra: Params::new(),
        };
        debug!(method = %options.method, url = %options.url, "assembled request");

        options.apply_overrides(&self.config.transport_overrides)
    }

    /// Assemble a request and hand it to the transport.
    pub async fn request(
        &self,
        method: HttpMethod,
        endpoint: &str,
        body: Option<&Value>,
        params: Option<&Params>,
    ) -> Result<HttpResponse> {
        let options = self.build_request(method, endpoint, body, params)?;
        debug!(method = %options.method, url = %options.url, "dispatching request");
        self.transport.send(options).await.map_err(Error::Transport)
    }

    pub async fn get(&self, endpoint: &str, params: Option<&Params>) -> Result<HttpResponse> {
        self.request(HttpMethod::Get, endpoint, None, params).await
    }

    pub async fn post<B>(&self, endpoint: &str, data: &B, params: Option<&Params>) -> Result<HttpResponse>
    where
        B: Serialize + ?Sized,
    {
        let data = serde_json::to_value(data)?;
        self.request(HttpMethod::Post, endpoint, Some(&data), params).await
    }

    pub async fn put<B>(&self, endpoint: &str, data: &B, params: Option<&Params>) -> Result<HttpResponse>
    where
        B: Serialize + ?Sized,
    {
        let data = serde_json::to_value(data)?;
        self.request(HttpMethod::Put, endpoint, Some(&data), params).await
    }

    pub async fn delete(&self, endpoint: &str, params: Option<&Params>) -> Result<HttpResponse> {
        self.request(HttpMethod::Delete, endpoint, None, params).await
    }

    pub async fn options(&self, endpoint: &str, params: Option<&Params>) -> Result<HttpResponse> {
        self.request(HttpMethod::Options, endpoint, None, params).await
    }
}

/// Insert `:port` after the host of `composed`, whose leading bytes are `base`.
///
/// `url` confirms the base has a host; the authority span itself is located
/// in the raw text so nothing outside it is normalized.
fn splice_port(base: &str, composed: &str, port: u16) -> Result<String> {
    let parsed = Url::parse(base)?;
    if parsed.host_str().is_none() {
        return Err(Error::Configuration(format!("url `{base}` cannot carry a port")));
    }
    let authority_start = base
        .find("://")
        .map(|i| i + 3)
        .ok_or_else(|| Error::Configuration(format!("url `{base}` has no authority")))?;

    let rest = &base[authority_start..];
    let authority_len = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..authority_len];

    // Skip userinfo; an IPv6 host may contain ':' inside its brackets.
    let host_start = authority.rfind('@').map_or(0, |i| i + 1);
    let host_and_port = &authority[host_start..];
    let host_len = if host_and_port.starts_with('[') {
        host_and_port.find(']').map_or(host_and_port.len(), |i| i + 1)
    } else {
        host_and_port.find(':').unwrap_or(host_and_port.len())
    };

    let host_end = authority_start + host_start + host_len;
    let authority_end = authority_start + authority_len;
    Ok(format!(
        "{}:{port}{}",
        &composed[..host_end],
        &composed[authority_end..]
    ))
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client").field("config", &self.config).finish_non_exhaustive()
    }
}

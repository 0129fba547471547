//! Client configuration.
//!
//! # Design
//! `ClientConfig` is plain data with public fields and a `Default`, so it can
//! be written as a struct literal, built with the `with_*` setters, or loaded
//! from JSON using the key names of the JavaScript client (`jwtToken`,
//! `wpAPIPrefix`, ...). Nothing is checked until `Client::new` calls
//! [`ClientConfig::validate`]; after that the client owns the value and only
//! hands out shared references.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::de::Deserializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::{Error, Result};
use crate::params::Params;

pub const DEFAULT_API_PREFIX: &str = "wp-json";
pub const DEFAULT_ENCODING: &str = "utf8";

/// API namespace and version segment inserted after the prefix.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ApiVersion {
    #[default]
    #[serde(rename = "wc/v3")]
    WcV3,
    #[serde(rename = "wc/v2")]
    WcV2,
    #[serde(rename = "wc/v1")]
    WcV1,
    #[serde(rename = "wc-api/v3")]
    WcApiV3,
    #[serde(rename = "wc-api/v2")]
    WcApiV2,
    #[serde(rename = "wc-api/v1")]
    WcApiV1,
}

impl ApiVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiVersion::WcV3 => "wc/v3",
            ApiVersion::WcV2 => "wc/v2",
            ApiVersion::WcV1 => "wc/v1",
            ApiVersion::WcApiV3 => "wc-api/v3",
            ApiVersion::WcApiV2 => "wc-api/v2",
            ApiVersion::WcApiV1 => "wc-api/v1",
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "wc/v3" => Ok(ApiVersion::WcV3),
            "wc/v2" => Ok(ApiVersion::WcV2),
            "wc/v1" => Ok(ApiVersion::WcV1),
            "wc-api/v3" => Ok(ApiVersion::WcApiV3),
            "wc-api/v2" => Ok(ApiVersion::WcApiV2),
            "wc-api/v1" => Ok(ApiVersion::WcApiV1),
            other => Err(Error::Configuration(format!(
                "unsupported API version `{other}`"
            ))),
        }
    }
}

/// Whether a bearer token must be present when the client is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPolicy {
    /// Requests go out without `Authorization` when no token is set.
    #[default]
    Optional,
    /// Construction fails without a token.
    Required,
}

/// Raw request options laid over every assembled request.
///
/// Keys use the serialized names of [`RequestOptions`](crate::http::RequestOptions)
/// (`method`, `url`, `headers`, `params`, `data`, `timeout`,
/// `responseEncoding`); any other key is passed to the transport as is. The
/// merge is shallow: an entry replaces the whole field it names. This is an
/// escape hatch, not a validated configuration layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransportOverrides(Params);

impl TransportOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, replacing any earlier entry.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Params> for TransportOverrides {
    fn from(params: Params) -> Self {
        Self(params)
    }
}

/// Everything a `Client` needs to know about the remote store.
#[derive(Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ClientConfig {
    /// Store root, e.g. `https://shop.example.com`.
    pub url: String,
    #[serde(rename = "wpAPIPrefix")]
    pub api_prefix: String,
    pub version: ApiVersion,
    #[serde(rename = "jwtToken", alias = "token")]
    pub token: Option<String>,
    pub token_policy: TokenPolicy,
    /// Response encoding handed to the transport.
    pub encoding: String,
    pub port: Option<u16>,
    /// Read from JSON as milliseconds.
    #[serde(deserialize_with = "millis")]
    pub timeout: Option<Duration>,
    pub transport_overrides: TransportOverrides,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            version: ApiVersion::default(),
            token: None,
            token_policy: TokenPolicy::default(),
            encoding: DEFAULT_ENCODING.to_string(),
            port: None,
            timeout: None,
            transport_overrides: TransportOverrides::default(),
        }
    }
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Parse a JSON configuration object. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_token_policy(mut self, policy: TokenPolicy) -> Self {
        self.token_policy = policy;
        self
    }

    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    pub fn with_version(mut self, version: ApiVersion) -> Self {
        self.version = version;
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_transport_overrides(mut self, overrides: TransportOverrides) -> Self {
        self.transport_overrides = overrides;
        self
    }

    /// Bearer token to send, if any. An empty token counts as no token.
    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|token| !token.is_empty())
    }

    /// Check the invariants a client relies on.
    pub fn validate(&self) -> Result<()> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(Error::Configuration("url is required".to_string()));
        }

        let parsed = Url::parse(url)
            .map_err(|e| Error::Configuration(format!("invalid url `{url}`: {e}")))?;
        if parsed.host_str().is_none() {
            return Err(Error::Configuration(format!("url `{url}` has no host")));
        }

        if self.token_policy == TokenPolicy::Required && self.bearer_token().is_none() {
            return Err(Error::Configuration(
                "jwtToken is required by the token policy".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("url", &self.url)
            .field("api_prefix", &self.api_prefix)
            .field("version", &self.version)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("token_policy", &self.token_policy)
            .field("encoding", &self.encoding)
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .field("transport_overrides", &self.transport_overrides)
            .finish()
    }
}

fn millis<'de, D>(deserializer: D) -> std::result::Result<Option<Duration>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
}

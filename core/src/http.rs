//! Request and response types exchanged with a transport.
//!
//! # Design
//! `RequestOptions` is plain data: the client fills it in, a transport
//! executes it. It serializes with the same top-level keys a JavaScript HTTP
//! client accepts (`method`, `url`, `headers`, `params`, `data`, `timeout`,
//! `responseEncoding`), which is what makes the transport override merge a
//! simple key-by-key replacement on the serialized form. Unknown keys survive
//! the merge in `extra` so a transport can read options the client itself
//! knows nothing about.

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

use crate::config::TransportOverrides;
use crate::error::{Error, Result};
use crate::params::Params;

/// Header names set by the client.
pub mod headers {
    pub const ACCEPT: &str = "Accept";
    pub const AUTHORIZATION: &str = "Authorization";
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const USER_AGENT: &str = "User-Agent";
}

pub const JSON: &str = "application/json";
pub const JSON_UTF8: &str = "application/json;charset=utf-8";

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[serde(alias = "get")]
    Get,
    #[serde(alias = "post")]
    Post,
    #[serde(alias = "put")]
    Put,
    #[serde(alias = "delete")]
    Delete,
    #[serde(alias = "options")]
    Options,
    #[serde(alias = "patch")]
    Patch,
    #[serde(alias = "head")]
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully assembled request, ready for a transport.
///
/// Built by `Client::build_request`. Query parameters are kept apart from
/// `url`; the transport appends them (see [`crate::params::query_pairs`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    pub method: HttpMethod,
    pub url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: BTreeMap<String, String>,
    #[serde(rename = "params", default, deserialize_with = "null_as_default")]
    pub query: Params,
    /// JSON text of the request body.
    #[serde(
        rename = "data",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "body_from_value"
    )]
    pub body: Option<String>,
    /// Timeout in milliseconds.
    #[serde(rename = "timeout", default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    #[serde(rename = "responseEncoding")]
    pub encoding: String,
    /// Override keys with no dedicated field, passed through untouched.
    #[serde(flatten)]
    pub extra: Params,
}

impl RequestOptions {
    /// Look up a header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Shallow-merge `overrides` on top of these options.
    ///
    /// Each top-level key in `overrides` replaces the whole field of the same
    /// name, so an override for `headers` discards every assembled header.
    pub fn apply_overrides(self, overrides: &TransportOverrides) -> Result<Self> {
        if overrides.is_empty() {
            return Ok(self);
        }

        let mut merged = serde_json::to_value(&self)?;
        if let Value::Object(fields) = &mut merged {
            for (key, value) in overrides.iter() {
                trace!(key = %key, "applying transport override");
                fields.insert(key.clone(), value.clone());
            }
        }
        serde_json::from_value(merged).map_err(Error::Override)
    }
}

/// A response as returned by a transport. The client hands it back as is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Look up a response header by name, ignoring ASCII case.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> std::result::Result<T, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept a body override either as JSON text or as a JSON value to encode.
fn body_from_value<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Null => None,
        Value::String(text) => Some(text),
        other => Some(other.to_string()),
    })
}

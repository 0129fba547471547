//! Error types for the WooCommerce client.
//!
//! # Design
//! `Configuration` is the only error raised while constructing a client.
//! Everything that goes wrong on the wire lands in `Transport`, which wraps
//! the transport's own error value without translating it; callers recover
//! the concrete type with `downcast_ref`.

use thiserror::Error;

/// Boxed error produced by a [`Transport`](crate::transport::Transport).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by `Client`.
#[derive(Error, Debug)]
pub enum Error {
    /// Required configuration is missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The base URL could not be reparsed while applying the port override.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A request body or parameter map could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A transport override did not fit the request option it replaced.
    #[error("transport override rejected: {0}")]
    Override(#[source] serde_json::Error),

    /// The transport failed. The inner error is exactly what it returned.
    #[error(transparent)]
    Transport(BoxError),
}

impl Error {
    /// Borrow the transport's error as its concrete type, if this is a
    /// transport failure of that type.
    pub fn transport_error<E: std::error::Error + 'static>(&self) -> Option<&E> {
        match self {
            Error::Transport(inner) => inner.downcast_ref::<E>(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("socket closed")]
    struct SocketClosed;

    #[test]
    fn transport_error_is_displayed_unchanged() {
        let err = Error::Transport(Box::new(SocketClosed));
        assert_eq!(err.to_string(), "socket closed");
    }

    #[test]
    fn transport_error_downcasts_to_original_type() {
        let err = Error::Transport(Box::new(SocketClosed));
        assert!(err.transport_error::<SocketClosed>().is_some());
        assert!(err.transport_error::<std::io::Error>().is_none());
    }

    #[test]
    fn configuration_error_has_no_transport_payload() {
        let err = Error::Configuration("url is required".to_string());
        assert!(err.transport_error::<SocketClosed>().is_none());
        assert_eq!(err.to_string(), "configuration error: url is required");
    }
}

//! Errors surfaced across the client's public boundary.

use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

/// The endpoint cannot be used. Fatal to the session; nothing retries.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("no websocket endpoint available (secure pages are not supported)")]
    EmptyUrl,
    #[error("unsupported url scheme in {0:?}, only ws:// is supported")]
    UnsupportedScheme(String),
    #[error("websocket handshake with {url} failed: {source}")]
    Handshake {
        url: String,
        #[source]
        source: Box<tokio_tungstenite::tungstenite::Error>,
    },
}

/// `enterDriverMode` gave up waiting for the server to assign a client id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("no client id assigned within {waited:?}, driver mode not requested")]
pub struct AcquisitionTimeoutError {
    pub waited: Duration,
}

/// An `error` frame from the server. Recorded in session state, never returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("server error: {}", .frame["error"])]
pub struct ServerRpcError {
    frame: Value,
}

impl ServerRpcError {
    pub fn new(frame: Value) -> Self {
        Self { frame }
    }

    /// The whole frame as received.
    pub fn frame(&self) -> &Value {
        &self.frame
    }

    /// The frame's `error` member.
    pub fn error(&self) -> &Value {
        &self.frame["error"]
    }

    pub fn code(&self) -> Option<i64> {
        self.error().get("code").and_then(Value::as_i64)
    }

    pub fn message(&self) -> Option<&str> {
        self.error().get("message").and_then(Value::as_str)
    }

    /// Correlation id of the failed call, if the server echoed one.
    pub fn id(&self) -> Option<u64> {
        self.frame.get("id").and_then(Value::as_u64)
    }
}

/// Error loading a [`ClientConfig`](crate::ClientConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

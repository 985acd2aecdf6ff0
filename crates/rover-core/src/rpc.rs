//! JSON-RPC 2.0 framing.
//!
//! Outgoing calls are always requests with a fresh id. Inbound frames are
//! classified by shape only; responses are never matched back to the call
//! that caused them.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};

pub const JSONRPC_VERSION: &str = "2.0";

/// An outgoing call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<Value>,
    pub id: u64,
}

impl Request {
    /// Build a JSON-RPC 2.0 call of `method` with positional `params`.
    pub fn new(method: impl Into<String>, params: Vec<Value>, id: u64) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            method: method.into(),
            params,
            id,
        }
    }

    /// Serialize to the text sent over the wire.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Source of correlation ids. The first id handed out is 1.
#[derive(Debug, Default)]
pub struct IdSequence {
    last: AtomicU64,
}

impl IdSequence {
    /// Start a sequence whose first id is 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint the next id.
    pub fn next(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// The most recently minted id, or 0 if none yet.
    pub fn last(&self) -> u64 {
        self.last.load(Ordering::Relaxed)
    }
}

/// A method call initiated by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerCall {
    pub method: String,
    pub params: Value,
}

impl ServerCall {
    /// Positional parameter `idx`.
    ///
    /// Some pushes carry a bare value instead of an array; that value counts
    /// as parameter 0.
    pub fn param(&self, idx: usize) -> Option<&Value> {
        match &self.params {
            Value::Array(items) => items.get(idx),
            Value::Null => None,
            other if idx == 0 => Some(other),
            _ => None,
        }
    }
}

/// Classified inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// Server-initiated call, routed through the dispatch table.
    Call(ServerCall),
    /// Response carrying a `result`; holds the whole frame.
    Result(Value),
    /// Response carrying an `error`; holds the whole frame.
    Error(Value),
    /// None of the above.
    Inert,
}

/// Parse and classify one text frame.
pub fn decode(raw: &str) -> Result<Frame, ProtocolError> {
    let value: Value = serde_json::from_str(raw)?;
    let Value::Object(map) = &value else {
        return Ok(Frame::Inert);
    };

    if let Some(method) = map.get("method") {
        let Value::String(name) = method else {
            return Err(ProtocolError::InvalidMethod(method.clone()));
        };
        let params = map.get("params").cloned().unwrap_or(Value::Null);
        return Ok(Frame::Call(ServerCall {
            method: name.clone(),
            params,
        }));
    }

    if map.get("result").is_some_and(|v| !v.is_null()) {
        return Ok(Frame::Result(value));
    }
    if map.get("error").is_some_and(|v| !v.is_null()) {
        return Ok(Frame::Error(value));
    }
    Ok(Frame::Inert)
}

/// Error decoding or encoding a frame.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("method name must be a string, got: {0}")]
    InvalidMethod(Value),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_shape() {
        let ids = IdSequence::new();
        let first = Request::new("stop", vec![], ids.next()).encode().unwrap();
        let second = Request::new("stop", vec![], ids.next()).encode().unwrap();

        let first: Value = serde_json::from_str(&first).unwrap();
        let second: Value = serde_json::from_str(&second).unwrap();
        assert_eq!(first["jsonrpc"], "2.0");
        assert_eq!(first["method"], "stop");
        assert_eq!(first["params"], json!([]));
        assert!(second["id"].as_u64().unwrap() > first["id"].as_u64().unwrap());
        assert_eq!(ids.last(), 2);
    }

    #[test]
    fn classify_call() {
        let frame = decode(r#"{"method":"setClientId","params":[5000],"jsonrpc":"2.0"}"#).unwrap();
        let Frame::Call(call) = frame else {
            panic!("expected call, got {frame:?}");
        };
        assert_eq!(call.method, "setClientId");
        assert_eq!(call.param(0), Some(&json!(5000)));
        assert_eq!(call.param(1), None);
    }

    #[test]
    fn bare_params_count_as_first() {
        let raw = r#"{"method":"showAlertNotification","params":"rover halted"}"#;
        let frame = decode(raw).unwrap();
        let Frame::Call(call) = frame else {
            panic!("expected call");
        };
        assert_eq!(call.param(0), Some(&json!("rover halted")));
        assert_eq!(call.param(1), None);
    }

    #[test]
    fn classify_responses() {
        assert!(matches!(
            decode(r#"{"jsonrpc":"2.0","result":"pong 2","id":1}"#).unwrap(),
            Frame::Result(_)
        ));
        assert!(matches!(
            decode(r#"{"jsonrpc":"2.0","error":{"code":-32601},"id":3}"#).unwrap(),
            Frame::Error(_)
        ));
        assert_eq!(decode(r#"{"jsonrpc":"2.0","id":4}"#).unwrap(), Frame::Inert);
        assert_eq!(decode(r#"{"result":null}"#).unwrap(), Frame::Inert);
        assert_eq!(decode("[1,2]").unwrap(), Frame::Inert);
    }

    #[test]
    fn malformed_frames() {
        assert!(matches!(decode("{not json"), Err(ProtocolError::Malformed(_))));
        assert!(matches!(
            decode(r#"{"method":42}"#),
            Err(ProtocolError::InvalidMethod(_))
        ));
    }
}

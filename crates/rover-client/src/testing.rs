//! Shared fixtures for unit tests.

use crate::config::ClientConfig;
use crate::presentation::RecordingSink;
use crate::session::Session;
use crate::transport::RpcSender;
use rover_core::ReadyState;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

pub(crate) struct Harness {
    pub(crate) session: Session,
    pub(crate) sink: Arc<RecordingSink>,
    outbound: mpsc::UnboundedReceiver<String>,
    _ready: watch::Sender<ReadyState>,
}

impl Harness {
    pub(crate) fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub(crate) fn with_config(config: ClientConfig) -> Self {
        let (ready_tx, ready) = watch::channel(ReadyState::Open);
        let (rpc, outbound) = RpcSender::channel(ready);
        let sink = Arc::new(RecordingSink::new());
        let session = Session::new(config, rpc, sink.clone());
        Self {
            session,
            sink,
            outbound,
            _ready: ready_tx,
        }
    }

    /// Push a server call into the session.
    pub(crate) fn push(&mut self, method: &str, params: Value) {
        let frame = json!({"jsonrpc": "2.0", "method": method, "params": params});
        self.session.handle_frame(&frame.to_string());
    }

    /// Drain everything the session has sent so far.
    pub(crate) fn sent(&mut self) -> Vec<Value> {
        let mut sent = Vec::new();
        while let Ok(text) = self.outbound.try_recv() {
            sent.push(serde_json::from_str(&text).unwrap());
        }
        sent
    }

    /// Drain sent calls, keeping only `method`.
    pub(crate) fn sent_calls(&mut self, method: &str) -> Vec<Value> {
        self.sent()
            .into_iter()
            .filter(|call| call["method"] == method)
            .collect()
    }
}

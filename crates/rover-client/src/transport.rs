//! WebSocket transport.
//!
//! Owns the socket. A reader task turns incoming frames into
//! [`TransportEvent`]s and a writer task drains the outbound queue fed by
//! [`RpcSender`]. There is no reconnection: once `Closed` is emitted the
//! connection is gone for good.

use crate::error::ConnectionError;
use futures_util::{SinkExt, StreamExt};
use rover_core::{ClientMethod, IdSequence, ReadyState, Request};
use serde_json::Value;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{mpsc, watch};
use tokio_tungstenite::tungstenite::Message;

/// Path the rover serves its JSON-RPC socket on.
pub const ENDPOINT_PATH: &str = "/rover";

/// Build the endpoint URL for a rover reachable at `host:port`.
///
/// The rover does not serve secure websockets. For secure pages this returns
/// an empty URL, which [`connect`] refuses without touching the network.
pub fn endpoint_url(host: &str, port: u16, secure: bool) -> String {
    if secure || port == 443 {
        tracing::warn!("cannot use websockets over https, no endpoint for {}", host);
        return String::new();
    }
    format!("ws://{host}:{port}{ENDPOINT_PATH}")
}

fn check_url(url: &str) -> Result<(), ConnectionError> {
    if url.is_empty() {
        return Err(ConnectionError::EmptyUrl);
    }
    match url.split_once("://") {
        Some((scheme, _)) if scheme.eq_ignore_ascii_case("ws") => Ok(()),
        _ => Err(ConnectionError::UnsupportedScheme(url.to_string())),
    }
}

/// The four hook points of the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Open,
    Message(String),
    Error(String),
    /// Terminal. Carries the close reason if the peer sent one.
    Closed(Option<String>),
}

/// Sends JSON-RPC calls over the connection.
///
/// Cheap to clone; every clone shares the id sequence and the last-sent slot.
#[derive(Clone)]
pub struct RpcSender {
    inner: Arc<SenderInner>,
}

struct SenderInner {
    ids: IdSequence,
    outbound: mpsc::UnboundedSender<String>,
    last_sent: Mutex<Option<String>>,
    ready: watch::Receiver<ReadyState>,
}

impl RpcSender {
    /// Create a sender and the queue its frames land in.
    pub fn channel(ready: watch::Receiver<ReadyState>) -> (Self, mpsc::UnboundedReceiver<String>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        let inner = SenderInner {
            ids: IdSequence::new(),
            outbound,
            last_sent: Mutex::new(None),
            ready,
        };
        (
            Self {
                inner: Arc::new(inner),
            },
            rx,
        )
    }

    /// Fire-and-forget call. Replies are not routed back to the caller.
    ///
    /// Calls made while the connection is not open are dropped with a
    /// warning, but still become [`last_sent`](Self::last_sent).
    pub fn send(&self, method: ClientMethod, params: Vec<Value>) {
        let request = Request::new(method.as_str(), params, self.inner.ids.next());
        let text = match request.encode() {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("cannot encode {} call: {}", method, e);
                return;
            }
        };

        if !self.ready_state().is_open() {
            tracing::warn!("connection not open, dropping {} call", method);
        } else if self.inner.outbound.send(text.clone()).is_err() {
            tracing::warn!("connection closed, dropping {} call", method);
        } else {
            tracing::debug!("send {}", text);
        }
        *self
            .inner
            .last_sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(text);
    }

    /// The raw text of the most recent call.
    pub fn last_sent(&self) -> Option<String> {
        self.inner
            .last_sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The most recently minted correlation id.
    pub fn last_id(&self) -> u64 {
        self.inner.ids.last()
    }

    pub fn ready_state(&self) -> ReadyState {
        *self.inner.ready.borrow()
    }
}

/// An established connection to the rover.
pub struct Connection {
    url: String,
    sender: RpcSender,
    events: mpsc::UnboundedReceiver<TransportEvent>,
    ready: watch::Receiver<ReadyState>,
}

impl Connection {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn sender(&self) -> RpcSender {
        self.sender.clone()
    }

    pub fn ready_state(&self) -> ReadyState {
        *self.ready.borrow()
    }

    /// Next transport event. `None` after `Closed` has been delivered.
    pub async fn next_event(&mut self) -> Option<TransportEvent> {
        self.events.recv().await
    }
}

/// Open the websocket. Must be called within a tokio runtime.
pub async fn connect(url: &str) -> Result<Connection, ConnectionError> {
    check_url(url)?;

    let (ready_tx, ready) = watch::channel(ReadyState::Connecting);
    let (sender, mut outbound) = RpcSender::channel(ready.clone());

    let (ws, _response) =
        tokio_tungstenite::connect_async(url)
            .await
            .map_err(|e| ConnectionError::Handshake {
                url: url.to_string(),
                source: Box::new(e),
            })?;
    let (mut sink, mut stream) = ws.split();

    ready_tx.send_replace(ReadyState::Open);
    tracing::info!("connection open to {}", url);

    let (event_tx, events) = mpsc::unbounded_channel();
    let _ = event_tx.send(TransportEvent::Open);

    let writer_ready = ready_tx.clone();
    tokio::spawn(async move {
        while let Some(text) = outbound.recv().await {
            if let Err(e) = sink.send(Message::Text(text.into())).await {
                tracing::debug!("websocket write failed: {}", e);
                break;
            }
        }
        writer_ready.send_if_modified(|state| {
            let open = *state == ReadyState::Open;
            if open {
                *state = ReadyState::Closing;
            }
            open
        });
        let _ = sink.close().await;
    });

    tokio::spawn(async move {
        let reason = loop {
            match stream.next().await {
                Some(Ok(Message::Text(text))) => {
                    let _ = event_tx.send(TransportEvent::Message(text.as_str().to_owned()));
                }
                Some(Ok(Message::Close(frame))) => {
                    ready_tx.send_replace(ReadyState::Closing);
                    break frame.map(|f| f.reason.as_str().to_owned());
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    let _ = event_tx.send(TransportEvent::Error(e.to_string()));
                    break None;
                }
                None => break None,
            }
        };
        ready_tx.send_replace(ReadyState::Closed);
        let _ = event_tx.send(TransportEvent::Closed(reason));
    });

    Ok(Connection {
        url: url.to_string(),
        sender,
        events,
        ready,
    })
}

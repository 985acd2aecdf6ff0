//! Core types for the rover remote-control protocol.
//!
//! This crate provides the protocol primitives: the JSON-RPC envelope, the
//! method name tables and the payloads the server pushes. It performs no I/O;
//! `rover-client` owns the connection and the session state.

mod identity;
mod method;
mod rpc;
mod telemetry;

pub use identity::{ClientId, Driver};
pub use method::{ClientMethod, ServerMethod, UnknownMethodError};
pub use rpc::{decode, Frame, IdSequence, ProtocolError, Request, ServerCall, JSONRPC_VERSION};
pub use telemetry::{truthy, ClientDescriptor, CollisionState, RoverStateUpdate};

use serde::{Deserialize, Serialize};

/// Connection readiness, mirroring the WebSocket `readyState` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    /// Handshake in progress.
    #[default]
    Connecting,
    /// Frames can flow in both directions.
    Open,
    /// Close handshake started.
    Closing,
    /// Terminal; the session never reconnects.
    Closed,
}

impl ReadyState {
    /// Numeric code as exposed by browsers (0 = connecting ... 3 = closed).
    pub fn code(self) -> u8 {
        match self {
            ReadyState::Connecting => 0,
            ReadyState::Open => 1,
            ReadyState::Closing => 2,
            ReadyState::Closed => 3,
        }
    }

    /// Whether frames may still be sent.
    pub fn is_open(self) -> bool {
        self == ReadyState::Open
    }
}

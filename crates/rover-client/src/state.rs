//! Session state and its read-only snapshot.

use crate::blocking::SelfBlockState;
use crate::error::ServerRpcError;
use rover_core::{ClientDescriptor, ClientId, CollisionState, ReadyState};
use serde_json::Value;

/// Driver and killswitch state derived from `updateRoverState` pushes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoverState {
    pub is_driver_available: bool,
    pub is_killswitch_enabled: bool,
}

impl Default for RoverState {
    fn default() -> Self {
        Self {
            is_driver_available: true,
            is_killswitch_enabled: false,
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub(crate) rover: RoverState,
    pub(crate) killswitch_enabled: bool,
    pub(crate) collisions: CollisionState,
    pub(crate) connected_users: Vec<ClientDescriptor>,
    pub(crate) blocked_users: Vec<ClientDescriptor>,
    pub(crate) self_block: SelfBlockState,
    pub(crate) responses: Vec<Value>,
    pub(crate) errors: Vec<Value>,
    pub(crate) last_error: Option<ServerRpcError>,
}

impl SessionState {
    pub(crate) fn record_error(&mut self, frame: Value) {
        self.last_error = Some(ServerRpcError::new(frame.clone()));
        self.errors.push(frame);
    }
}

/// Everything the presentation layer may read.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub ready_state: ReadyState,
    pub client_id: ClientId,
    pub rover: RoverState,
    /// Killswitch flag from `updateKillswitchEnabled`.
    pub killswitch_enabled: bool,
    pub collisions: CollisionState,
    pub connected_users: Vec<ClientDescriptor>,
    pub blocked_users: Vec<ClientDescriptor>,
    pub self_block: SelfBlockState,
    pub notifications: Vec<String>,
    /// `result` frames, in arrival order. Not matched to calls.
    pub responses: Vec<Value>,
    /// `error` frames, in arrival order. Not matched to calls.
    pub errors: Vec<Value>,
    pub last_error: Option<ServerRpcError>,
    pub last_sent: Option<String>,
}

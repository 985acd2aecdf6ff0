//! Client identity and the driver seat.
//!
//! The server hands out integer ids when a client connects. Two raw values
//! are reserved:
//! - `0` - no id assigned yet (client side only)
//! - `-1` - nobody is driving (driver ids only)

use crate::telemetry::as_integer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Id the server assigned to this client.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ClientId(i64);

impl ClientId {
    /// Placeholder until the server pushes `setClientId`.
    pub const UNASSIGNED: ClientId = ClientId(0);

    /// Wrap a raw server id.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw id.
    pub const fn get(self) -> i64 {
        self.0
    }

    /// Read an id pushed as a number or a numeric string.
    pub fn from_value(value: &Value) -> Option<Self> {
        as_integer(value).map(Self)
    }

    /// Check whether the server has assigned this id.
    pub fn is_assigned(self) -> bool {
        self.0 != 0
    }
}

impl From<i64> for ClientId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who currently holds the driver seat, as reported by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Driver {
    /// Nobody is driving.
    Vacant,
    /// The given client is driving.
    Client(ClientId),
}

impl Driver {
    /// Raw id the server uses for a vacant seat.
    pub const VACANT_ID: i64 = -1;

    /// Interpret a raw `currentDriverId`.
    ///
    /// Returns `None` for `0`, which carries no driver information.
    pub fn from_raw(raw: i64) -> Option<Self> {
        match raw {
            0 => None,
            Self::VACANT_ID => Some(Driver::Vacant),
            id => Some(Driver::Client(ClientId(id))),
        }
    }

    /// Check whether the seat is held by `me`.
    pub fn is(self, me: ClientId) -> bool {
        matches!(self, Driver::Client(id) if id == me)
    }
}

//! Payloads the server pushes about the rover and its users.
//!
//! The server is loose about types: flags may arrive as booleans or numbers
//! and ids as numbers or numeric strings. Everything here is parsed from a
//! `serde_json::Value` leniently rather than rejected.

use crate::identity::Driver;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Truthiness of a loosely typed flag.
///
/// `null`, `false`, `0` and `""` are false; everything else is true.
pub fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

pub(crate) fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Bumper sensor flags. Each push replaces all four.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionState {
    pub front_left: bool,
    pub front_right: bool,
    pub back_left: bool,
    pub back_right: bool,
}

impl CollisionState {
    /// Missing or falsy fields are read as `false`.
    pub fn from_value(value: &Value) -> Self {
        let flag = |key: &str| value.get(key).is_some_and(truthy);
        Self {
            front_left: flag("frontLeft"),
            front_right: flag("frontRight"),
            back_left: flag("backLeft"),
            back_right: flag("backRight"),
        }
    }

    pub fn any(&self) -> bool {
        self.front_left || self.front_right || self.back_left || self.back_right
    }
}

/// Contents of an `updateRoverState` push. Absent fields leave local state alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoverStateUpdate {
    pub current_driver: Option<Driver>,
    pub is_killswitch_enabled: Option<bool>,
}

impl RoverStateUpdate {
    pub fn from_value(value: &Value) -> Self {
        let current_driver = value
            .get("currentDriverId")
            .and_then(as_integer)
            .and_then(Driver::from_raw);
        let is_killswitch_enabled = value
            .get("isKillswitchEnabled")
            .filter(|v| !v.is_null())
            .map(truthy);
        Self {
            current_driver,
            is_killswitch_enabled,
        }
    }
}

/// One entry of the connected or blocked user lists.
///
/// The server decides the shape; the client only displays it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientDescriptor(pub Value);

impl ClientDescriptor {
    pub fn ip_address(&self) -> Option<&str> {
        self.0.get("ipAddress").and_then(Value::as_str)
    }

    /// Read a pushed list. Anything other than an array is an empty list.
    pub fn list_from_value(value: Option<&Value>) -> Vec<ClientDescriptor> {
        match value {
            Some(Value::Array(items)) => items.iter().cloned().map(ClientDescriptor).collect(),
            _ => Vec::new(),
        }
    }
}

//! Method names on both directions of the wire.

use std::fmt;
use std::str::FromStr;

/// Methods the server may call on a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServerMethod {
    SetClientId,
    IncomingNotification,
    ShowAlertNotification,
    ShowErrorNotification,
    UpdateKillswitchEnabled,
    UpdateCollisionInformation,
    UpdateConnectedUsers,
    IncomingSnapshot,
    UpdateRoverState,
    SetMyBlockingState,
    IncomingLogEntries,
    IncomingSystemUpTime,
}

impl ServerMethod {
    pub const ALL: [ServerMethod; 12] = [
        ServerMethod::SetClientId,
        ServerMethod::IncomingNotification,
        ServerMethod::ShowAlertNotification,
        ServerMethod::ShowErrorNotification,
        ServerMethod::UpdateKillswitchEnabled,
        ServerMethod::UpdateCollisionInformation,
        ServerMethod::UpdateConnectedUsers,
        ServerMethod::IncomingSnapshot,
        ServerMethod::UpdateRoverState,
        ServerMethod::SetMyBlockingState,
        ServerMethod::IncomingLogEntries,
        ServerMethod::IncomingSystemUpTime,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ServerMethod::SetClientId => "setClientId",
            ServerMethod::IncomingNotification => "incomingNotification",
            ServerMethod::ShowAlertNotification => "showAlertNotification",
            ServerMethod::ShowErrorNotification => "showErrorNotification",
            ServerMethod::UpdateKillswitchEnabled => "updateKillswitchEnabled",
            ServerMethod::UpdateCollisionInformation => "updateCollisionInformation",
            ServerMethod::UpdateConnectedUsers => "updateConnectedUsers",
            ServerMethod::IncomingSnapshot => "incomingSnapshot",
            ServerMethod::UpdateRoverState => "updateRoverState",
            ServerMethod::SetMyBlockingState => "setMyBlockingState",
            ServerMethod::IncomingLogEntries => "incomingLogEntries",
            ServerMethod::IncomingSystemUpTime => "incomingSystemUpTime",
        }
    }

    /// Pushes whose params are too large to log verbatim.
    pub fn carries_bulk_payload(self) -> bool {
        matches!(
            self,
            ServerMethod::IncomingSnapshot | ServerMethod::IncomingLogEntries
        )
    }
}

impl fmt::Display for ServerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServerMethod {
    type Err = UnknownMethodError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMethodError(s.to_string()))
    }
}

/// Methods a client may call on the server. All are fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientMethod {
    Ping,
    Stop,
    DriveForward,
    DriveBackward,
    TurnLeft,
    TurnRight,
    TurnHeadUp,
    TurnHeadDown,
    TurnHeadLeft,
    TurnHeadRight,
    ResetHeadPosition,
    SetKillswitch,
    BlockIp,
    UnblockIp,
    SendKillswitchState,
    GetCameraSnapshot,
    GetLoggingEntries,
    GetSystemUpTime,
    DistributeAlertNotification,
    EnterDriverMode,
    ExitDriverMode,
    SetClientInformation,
}

impl ClientMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ClientMethod::Ping => "ping",
            ClientMethod::Stop => "stop",
            ClientMethod::DriveForward => "driveForward",
            ClientMethod::DriveBackward => "driveBackward",
            ClientMethod::TurnLeft => "turnLeft",
            ClientMethod::TurnRight => "turnRight",
            ClientMethod::TurnHeadUp => "turnHeadUp",
            ClientMethod::TurnHeadDown => "turnHeadDown",
            ClientMethod::TurnHeadLeft => "turnHeadLeft",
            ClientMethod::TurnHeadRight => "turnHeadRight",
            ClientMethod::ResetHeadPosition => "resetHeadPosition",
            ClientMethod::SetKillswitch => "setKillswitch",
            ClientMethod::BlockIp => "blockIp",
            ClientMethod::UnblockIp => "unblockIp",
            ClientMethod::SendKillswitchState => "sendKillswitchState",
            ClientMethod::GetCameraSnapshot => "getCameraSnapshot",
            ClientMethod::GetLoggingEntries => "getLoggingEntries",
            ClientMethod::GetSystemUpTime => "getSystemUpTime",
            ClientMethod::DistributeAlertNotification => "distributeAlertNotification",
            ClientMethod::EnterDriverMode => "enterDriverMode",
            ClientMethod::ExitDriverMode => "exitDriverMode",
            ClientMethod::SetClientInformation => "setClientInformation",
        }
    }
}

impl fmt::Display for ClientMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The server called a method this client does not handle.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("call of method {0} is not allowed")]
pub struct UnknownMethodError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_names_roundtrip() {
        for method in ServerMethod::ALL {
            assert_eq!(method.as_str().parse::<ServerMethod>().unwrap(), method);
        }
    }

    #[test]
    fn unknown_server_method() {
        let err = "bogus".parse::<ServerMethod>().unwrap_err();
        assert_eq!(err, UnknownMethodError("bogus".into()));
        assert_eq!(err.to_string(), "call of method bogus is not allowed");
    }

    #[test]
    fn client_names() {
        assert_eq!(ClientMethod::TurnHeadUp.as_str(), "turnHeadUp");
        assert_eq!(
            ClientMethod::DistributeAlertNotification.to_string(),
            "distributeAlertNotification"
        );
    }
}

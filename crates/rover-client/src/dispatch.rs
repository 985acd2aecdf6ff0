//! Dispatch table for server-initiated calls.

use crate::presentation::ToastTheme;
use crate::session::{ResponseCallback, Session};
use rover_core::{
    truthy, ClientDescriptor, ClientId, CollisionState, RoverStateUpdate, ServerCall, ServerMethod,
};
use serde_json::Value;

fn text_param(call: &ServerCall) -> String {
    match call.param(0) {
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
        None => String::new(),
    }
}

fn deliver(slot: &mut Option<ResponseCallback>, method: ServerMethod, payload: Value) {
    match slot.take() {
        Some(callback) => callback(payload),
        None => tracing::warn!("{} received without a pending request", method),
    }
}

impl Session {
    /// Route one server call. Unknown methods are logged and dropped.
    pub(crate) fn dispatch(&mut self, call: ServerCall) {
        let method = match call.method.parse::<ServerMethod>() {
            Ok(method) => method,
            Err(e) => {
                tracing::warn!("error on handleMethodCall: {}", e);
                return;
            }
        };

        if method.carries_bulk_payload() {
            tracing::debug!("new msg: {}", method);
        } else {
            tracing::debug!("new msg: {} {}", method, call.params);
        }

        match method {
            ServerMethod::SetClientId => match call.param(0).and_then(ClientId::from_value) {
                Some(id) => self.assign_client_id(id),
                None => tracing::warn!("setClientId without a usable id: {}", call.params),
            },
            ServerMethod::IncomingNotification => {
                self.router.deliver(text_param(&call), ToastTheme::None);
            }
            ServerMethod::ShowAlertNotification => {
                self.router.deliver(text_param(&call), ToastTheme::Alert);
            }
            ServerMethod::ShowErrorNotification => {
                self.router.deliver(text_param(&call), ToastTheme::Error);
            }
            ServerMethod::UpdateKillswitchEnabled => {
                let enabled = call.param(0).is_some_and(truthy);
                tracing::info!("killswitch state received from server: {}", enabled);
                self.state.killswitch_enabled = enabled;
            }
            ServerMethod::UpdateCollisionInformation => {
                self.state.collisions = call
                    .param(0)
                    .map(CollisionState::from_value)
                    .unwrap_or_default();
                if self.state.collisions.any() {
                    tracing::warn!("collision reported: {:?}", self.state.collisions);
                }
            }
            ServerMethod::UpdateConnectedUsers => {
                self.state.connected_users = ClientDescriptor::list_from_value(call.param(0));
                self.state.blocked_users = ClientDescriptor::list_from_value(call.param(1));
            }
            ServerMethod::UpdateRoverState => {
                let update = call
                    .param(0)
                    .map(RoverStateUpdate::from_value)
                    .unwrap_or_default();
                if let Some(driver) = update.current_driver {
                    self.apply_driver(driver);
                }
                if let Some(enabled) = update.is_killswitch_enabled {
                    self.state.rover.is_killswitch_enabled = enabled;
                }
            }
            ServerMethod::SetMyBlockingState => {
                let ip_address = call
                    .param(0)
                    .and_then(Value::as_str)
                    .unwrap_or_default()
                    .to_string();
                let blocked = call.param(1).is_some_and(truthy);
                self.set_my_blocking_state(ip_address, blocked);
            }
            ServerMethod::IncomingSnapshot => {
                deliver(&mut self.callbacks.snapshot, method, call.params);
            }
            ServerMethod::IncomingLogEntries => {
                deliver(&mut self.callbacks.log_entries, method, call.params);
            }
            ServerMethod::IncomingSystemUpTime => {
                let up_time = call.param(0).cloned().unwrap_or(Value::Null);
                deliver(&mut self.callbacks.system_up_time, method, up_time);
            }
        }
    }
}

//! Notification routing.
//!
//! Inbound notifications are logged and handed to the presentation sink.
//! Broadcasts go to the server, which fans them out to every client,
//! including this one.

use crate::presentation::{PresentationSink, Toast, ToastTheme};
use crate::transport::RpcSender;
use rover_core::ClientMethod;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

pub const UPTIME_NOT_READY_MESSAGE: &str =
    "Could not fetch systems uptime because connecting to the rover is still in progress.";

pub(crate) struct NotificationRouter {
    rpc: RpcSender,
    sink: Arc<dyn PresentationSink>,
    hide_delay: Duration,
    log: Vec<String>,
}

impl NotificationRouter {
    pub(crate) fn new(
        rpc: RpcSender,
        sink: Arc<dyn PresentationSink>,
        hide_delay: Duration,
    ) -> Self {
        Self {
            rpc,
            sink,
            hide_delay,
            log: Vec::new(),
        }
    }

    pub(crate) fn deliver(&mut self, text: String, theme: ToastTheme) {
        tracing::info!("new notification ({:?}): {}", theme, text);
        self.log.push(text.clone());
        self.sink.show_toast(&Toast {
            text,
            theme,
            hide_delay: self.hide_delay,
        });
    }

    /// Ask the server to show `text` as an alert on every connected client.
    pub(crate) fn broadcast_alert(&self, text: &str) {
        self.rpc.send(ClientMethod::DistributeAlertNotification, vec![json!(text)]);
    }

    pub(crate) fn log(&self) -> &[String] {
        &self.log
    }
}

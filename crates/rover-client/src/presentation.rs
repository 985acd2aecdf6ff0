//! Boundary to whatever renders toasts and dialogs.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// Visual flavour of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastTheme {
    None,
    Alert,
    Error,
}

/// A short-lived notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub text: String,
    pub theme: ToastTheme,
    pub hide_delay: Duration,
}

/// A modal dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub message: String,
    /// Whether a click outside the dialog closes it.
    pub click_outside_to_close: bool,
}

/// Renders what the session asks for. Implementations must not call back
/// into the session.
pub trait PresentationSink: Send + Sync {
    fn show_toast(&self, toast: &Toast);
    fn show_dialog(&self, dialog: &Dialog);
    fn hide_dialog(&self);
}

/// Sink that only logs. Used by headless clients.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl PresentationSink for TracingSink {
    fn show_toast(&self, toast: &Toast) {
        match toast.theme {
            ToastTheme::None => tracing::info!("notification: {}", toast.text),
            ToastTheme::Alert => tracing::warn!("alert: {}", toast.text),
            ToastTheme::Error => tracing::error!("error: {}", toast.text),
        }
    }

    fn show_dialog(&self, dialog: &Dialog) {
        tracing::warn!("[{}] {}", dialog.title, dialog.message);
    }

    fn hide_dialog(&self) {
        tracing::info!("dialog dismissed");
    }
}

/// One call made on a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Toast(Toast),
    Dialog(Dialog),
    HideDialog,
}

/// Sink that keeps every call, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<SinkEvent>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<SinkEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn push(&self, event: SinkEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

impl PresentationSink for RecordingSink {
    fn show_toast(&self, toast: &Toast) {
        self.push(SinkEvent::Toast(toast.clone()));
    }

    fn show_dialog(&self, dialog: &Dialog) {
        self.push(SinkEvent::Dialog(dialog.clone()));
    }

    fn hide_dialog(&self) {
        self.push(SinkEvent::HideDialog);
    }
}

//! One client session per connection.

use crate::arbitration::{self, Decision};
use crate::blocking::{BlockTransition, SelfBlockState};
use crate::config::ClientConfig;
use crate::error::AcquisitionTimeoutError;
use crate::notify::{NotificationRouter, UPTIME_NOT_READY_MESSAGE};
use crate::presentation::{PresentationSink, ToastTheme};
use crate::state::{SessionSnapshot, SessionState};
use crate::transport::{Connection, RpcSender, TransportEvent};
use rover_core::{decode, ClientId, ClientMethod, Driver, Frame};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;

/// Receives the payload of a snapshot, log or uptime response.
pub type ResponseCallback = Box<dyn FnOnce(Value) + Send>;

/// Latest pending request of each kind. A new request replaces the old
/// callback, so only the most recent caller hears back.
#[derive(Default)]
pub(crate) struct ResponseCallbacks {
    pub(crate) snapshot: Option<ResponseCallback>,
    pub(crate) log_entries: Option<ResponseCallback>,
    pub(crate) system_up_time: Option<ResponseCallback>,
}

pub struct Session {
    pub(crate) config: ClientConfig,
    pub(crate) rpc: RpcSender,
    pub(crate) state: SessionState,
    pub(crate) identity: watch::Sender<ClientId>,
    pub(crate) router: NotificationRouter,
    pub(crate) sink: Arc<dyn PresentationSink>,
    pub(crate) callbacks: ResponseCallbacks,
    current_view: String,
}

impl Session {
    /// Create a session that sends through `rpc` and renders through `sink`.
    pub fn new(config: ClientConfig, rpc: RpcSender, sink: Arc<dyn PresentationSink>) -> Self {
        let router = NotificationRouter::new(rpc.clone(), sink.clone(), config.toast_hide_delay());
        let (identity, _) = watch::channel(ClientId::UNASSIGNED);
        Self {
            config,
            rpc,
            state: SessionState::default(),
            identity,
            router,
            sink,
            callbacks: ResponseCallbacks::default(),
            current_view: String::new(),
        }
    }

    /// Get the configuration this session was created with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Get the id the server assigned, or [`ClientId::UNASSIGNED`].
    pub fn client_id(&self) -> ClientId {
        *self.identity.borrow()
    }

    /// Watch the client id; it changes once, when the server assigns it.
    pub fn identity(&self) -> watch::Receiver<ClientId> {
        self.identity.subscribe()
    }

    /// Tell the session which view the user is on.
    pub fn set_current_view(&mut self, path: impl Into<String>) {
        self.current_view = path.into();
    }

    /// Get the view path last set with [`set_current_view`](Self::set_current_view).
    pub fn current_view(&self) -> &str {
        &self.current_view
    }

    /// Check whether the current view is one the user drives from.
    pub fn is_on_driving_view(&self) -> bool {
        self.config.is_driving_view(&self.current_view)
    }

    /// Copy out the observable state.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            ready_state: self.rpc.ready_state(),
            client_id: self.client_id(),
            rover: self.state.rover,
            killswitch_enabled: self.state.killswitch_enabled,
            collisions: self.state.collisions,
            connected_users: self.state.connected_users.clone(),
            blocked_users: self.state.blocked_users.clone(),
            self_block: self.state.self_block.clone(),
            notifications: self.router.log().to_vec(),
            responses: self.state.responses.clone(),
            errors: self.state.errors.clone(),
            last_error: self.state.last_error.clone(),
            last_sent: self.rpc.last_sent(),
        }
    }

    /// Apply one transport event.
    pub fn handle_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::Open => tracing::info!("connection open"),
            TransportEvent::Message(text) => self.handle_frame(&text),
            TransportEvent::Error(e) => tracing::warn!("connection error: {}", e),
            TransportEvent::Closed(reason) => {
                tracing::warn!("connection closed: {}", reason.as_deref().unwrap_or("no reason"))
            }
        }
    }

    /// Decode one text frame and apply it. Never fails; bad frames are logged.
    pub fn handle_frame(&mut self, raw: &str) {
        match decode(raw) {
            Ok(Frame::Call(call)) => self.dispatch(call),
            Ok(Frame::Result(frame)) => {
                tracing::debug!("response: {}", frame);
                self.state.responses.push(frame);
            }
            Ok(Frame::Error(frame)) => {
                tracing::debug!("error response: {}", frame);
                self.state.record_error(frame);
            }
            Ok(Frame::Inert) => tracing::debug!("ignoring frame: {}", raw),
            Err(e) => {
                tracing::warn!("dropping frame: {}", e);
            }
        }
    }

    pub(crate) fn assign_client_id(&mut self, id: ClientId) {
        if !id.is_assigned() {
            tracing::warn!("ignoring unusable client id {}", id);
            return;
        }
        let current = self.client_id();
        if current.is_assigned() {
            if current != id {
                tracing::warn!("ignoring client id {}, already assigned {}", id, current);
            }
            return;
        }
        self.identity.send_replace(id);
        tracing::info!("ID of this client is now {}", id);
        self.send_client_information();
    }

    pub(crate) fn apply_driver(&mut self, driver: Driver) {
        let me = self.client_id();
        let decision = arbitration::decide(driver, me, self.is_on_driving_view());
        self.state.rover.is_driver_available = decision.is_driver_available();
        match decision {
            Decision::Driving | Decision::Vacant => tracing::debug!("driver mode is available"),
            Decision::Reacquire => {
                tracing::info!("driver seat vacant, requesting driver mode");
                self.rpc.send(ClientMethod::EnterDriverMode, vec![json!(me)]);
            }
            Decision::HeldBy(other) => tracing::debug!(
                "driver mode not available, client {} is in driver mode",
                other
            ),
        }
    }

    pub(crate) fn set_my_blocking_state(&mut self, ip_address: String, blocked: bool) {
        match self.state.self_block.apply(ip_address, blocked) {
            Some(BlockTransition::Blocked) => {
                tracing::warn!("this client has been blocked");
                self.sink.show_dialog(&BlockTransition::blocked_dialog());
            }
            Some(BlockTransition::Unblocked) => {
                tracing::info!("this client has been unblocked");
                self.sink.hide_dialog();
            }
            None => {}
        }
    }

    /// Get what the server last said about this client being blocked.
    pub fn self_block(&self) -> &SelfBlockState {
        &self.state.self_block
    }

    fn send_client_information(&self) {
        let info = &self.config.client_info;
        self.rpc.send(
            ClientMethod::SetClientInformation,
            vec![
                json!(self.client_id()),
                json!(info.fingerprint),
                json!(info.browser),
                json!(info.operating_system),
            ],
        );
    }

    /// Ping the server with the most recent request id.
    pub fn ping(&self) {
        self.rpc.send(ClientMethod::Ping, vec![json!(self.rpc.last_id())]);
    }

    /// Stop the rover.
    pub fn stop(&self) {
        self.rpc.send(ClientMethod::Stop, vec![]);
    }

    /// Drive forward at the configured speed.
    pub fn drive_forward(&self) {
        self.rpc.send(ClientMethod::DriveForward, vec![json!(self.config.desired_speed)]);
    }

    /// Drive backward at the configured speed.
    pub fn drive_backward(&self) {
        self.rpc.send(ClientMethod::DriveBackward, vec![json!(self.config.desired_speed)]);
    }

    /// Turn left at the configured turn rate.
    pub fn turn_left(&self) {
        self.rpc.send(ClientMethod::TurnLeft, vec![json!(self.config.turn_rate)]);
    }

    /// Turn right at the configured turn rate.
    pub fn turn_right(&self) {
        self.rpc.send(ClientMethod::TurnRight, vec![json!(self.config.turn_rate)]);
    }

    /// Tilt the camera head up by the configured step.
    pub fn camera_move_up(&self) {
        self.rpc.send(ClientMethod::TurnHeadUp, vec![json!(self.config.camera_step)]);
    }

    /// Tilt the camera head down by the configured step.
    pub fn camera_move_down(&self) {
        self.rpc.send(ClientMethod::TurnHeadDown, vec![json!(self.config.camera_step)]);
    }

    /// Pan the camera head left by the configured step.
    pub fn camera_move_left(&self) {
        self.rpc.send(ClientMethod::TurnHeadLeft, vec![json!(self.config.camera_step)]);
    }

    /// Pan the camera head right by the configured step.
    pub fn camera_move_right(&self) {
        self.rpc.send(ClientMethod::TurnHeadRight, vec![json!(self.config.camera_step)]);
    }

    /// Center the camera head.
    pub fn camera_reset_position(&self) {
        self.rpc.send(ClientMethod::ResetHeadPosition, vec![]);
    }

    /// Developer only. `message` is broadcast as an alert if the state changes.
    pub fn set_killswitch(&self, enabled: bool, message: &str) {
        self.rpc.send(ClientMethod::SetKillswitch, vec![json!(enabled), json!(message)]);
    }

    /// Developer only. Block every client connecting from `ip_address`.
    pub fn block_ip(&self, ip_address: &str) {
        self.rpc.send(ClientMethod::BlockIp, vec![json!(ip_address)]);
    }

    /// Developer only. Lift a block on `ip_address`.
    pub fn unblock_ip(&self, ip_address: &str) {
        self.rpc.send(ClientMethod::UnblockIp, vec![json!(ip_address)]);
    }

    /// Ask the server to push the current killswitch state.
    pub fn request_killswitch_state(&self) {
        self.rpc.send(ClientMethod::SendKillswitchState, vec![]);
    }

    /// Request a camera snapshot; `callback` receives the push params.
    pub fn get_camera_snapshot(&mut self, callback: impl FnOnce(Value) + Send + 'static) {
        self.callbacks.snapshot = Some(Box::new(callback));
        self.rpc.send(ClientMethod::GetCameraSnapshot, vec![json!(self.client_id())]);
    }

    /// Request log entries newer than `last_entry`; `None` asks for all of them.
    pub fn get_logging_entries(
        &mut self,
        last_entry: Option<&str>,
        callback: impl FnOnce(Value) + Send + 'static,
    ) {
        self.callbacks.log_entries = Some(Box::new(callback));
        self.rpc.send(
            ClientMethod::GetLoggingEntries,
            vec![json!(self.client_id()), json!(last_entry)],
        );
    }

    /// Request the rover's uptime. Needs an assigned id; without one an error
    /// toast is shown instead and nothing is sent.
    pub fn get_system_up_time(&mut self, callback: impl FnOnce(Value) + Send + 'static) {
        let id = self.client_id();
        if !id.is_assigned() {
            self.router.deliver(UPTIME_NOT_READY_MESSAGE.to_string(), ToastTheme::Error);
            return;
        }
        self.callbacks.system_up_time = Some(Box::new(callback));
        self.rpc.send(ClientMethod::GetSystemUpTime, vec![json!(id)]);
    }

    /// Ask the server to show `text` as an alert on all connected clients.
    pub fn send_alert_notification(&self, text: &str) {
        self.router.broadcast_alert(text);
    }

    /// Show an alert on this client only.
    pub fn show_alert_notification(&mut self, text: &str) {
        self.router.deliver(text.to_string(), ToastTheme::Alert);
    }

    /// Request driver mode once the server has assigned this client an id.
    ///
    /// The returned future holds no borrow of the session, so the event loop
    /// keeps running while it waits. It sends at most one `enterDriverMode`.
    pub fn enter_driver_mode(
        &self,
    ) -> impl Future<Output = Result<ClientId, AcquisitionTimeoutError>> + Send + 'static {
        let rpc = self.rpc.clone();
        let identity = self.identity();
        let poll = self.config.client_id_poll_interval();
        let timeout = self.config.client_id_timeout();

        async move {
            match arbitration::wait_for_client_id(identity, poll, timeout).await {
                Ok(id) => {
                    rpc.send(ClientMethod::EnterDriverMode, vec![json!(id)]);
                    tracing::info!("enterDriverMode requested for {}", id);
                    Ok(id)
                }
                Err(e) => {
                    tracing::warn!("enterDriverMode abandoned: {}", e);
                    Err(e)
                }
            }
        }
    }

    /// Give up the driver seat.
    pub fn exit_driver_mode(&self) {
        self.rpc.send(ClientMethod::ExitDriverMode, vec![json!(self.client_id())]);
    }
}

/// Feed transport events into `session` until the connection closes.
pub async fn run(mut connection: Connection, session: &mut Session) {
    while let Some(event) = connection.next_event().await {
        let closed = matches!(event, TransportEvent::Closed(_));
        session.handle_event(event);
        if closed {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::blocking::KillswitchToggle;
    use crate::notify::UPTIME_NOT_READY_MESSAGE;
    use crate::presentation::{SinkEvent, ToastTheme};
    use crate::testing::Harness;
    use crate::ClientConfig;
    use rover_core::{ClientId, ReadyState};
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::{self, Instant};

    #[test]
    fn movement_commands_use_configured_values() {
        let mut h = Harness::with_config(ClientConfig {
            desired_speed: 250,
            ..ClientConfig::default()
        });
        h.session.drive_forward();
        h.session.turn_left();
        h.session.camera_move_down();
        h.session.camera_reset_position();
        h.session.stop();

        let sent = h.sent();
        let calls: Vec<_> = sent
            .iter()
            .map(|c| (c["method"].as_str().unwrap(), c["params"].clone()))
            .collect();
        assert_eq!(
            calls,
            [
                ("driveForward", json!([250])),
                ("turnLeft", json!([300])),
                ("turnHeadDown", json!([20])),
                ("resetHeadPosition", json!([])),
                ("stop", json!([])),
            ]
        );
        let ids: Vec<u64> = sent.iter().map(|c| c["id"].as_u64().unwrap()).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn ping_carries_last_id() {
        let mut h = Harness::new();
        h.session.stop();
        h.session.ping();
        assert_eq!(h.sent_calls("ping")[0]["params"], json!([1]));
    }

    #[test]
    fn snapshot_tracks_last_sent_and_readiness() {
        let h = Harness::new();
        assert_eq!(h.session.snapshot().last_sent, None);
        h.session.block_ip("10.0.0.9");

        let snapshot = h.session.snapshot();
        assert_eq!(snapshot.ready_state, ReadyState::Open);
        let last: serde_json::Value =
            serde_json::from_str(&snapshot.last_sent.unwrap()).unwrap();
        assert_eq!(last["method"], "blockIp");
        assert_eq!(last["params"], json!(["10.0.0.9"]));
    }

    #[test]
    fn uptime_needs_an_id() {
        let mut h = Harness::new();
        h.session.get_system_up_time(|_| {});

        assert!(h.sent().is_empty());
        let events = h.sink.events();
        let [SinkEvent::Toast(toast)] = events.as_slice() else {
            panic!("expected one toast, got {events:?}");
        };
        assert_eq!(toast.text, UPTIME_NOT_READY_MESSAGE);
        assert_eq!(toast.theme, ToastTheme::Error);
    }

    #[test]
    fn alert_broadcast_goes_to_server_only() {
        let mut h = Harness::new();
        h.session.send_alert_notification("rover moving");

        assert_eq!(
            h.sent_calls("distributeAlertNotification")[0]["params"],
            json!(["rover moving"])
        );
        assert!(h.session.snapshot().notifications.is_empty());

        h.session.show_alert_notification("local alert");
        assert_eq!(h.session.snapshot().notifications, ["local alert"]);
    }

    #[test]
    fn killswitch_toggle_forwards_and_labels() {
        let mut h = Harness::new();
        let mut toggle = KillswitchToggle::new();
        assert_eq!(toggle.label(), "allowed");

        toggle.on_change(&h.session, true);
        assert_eq!(toggle.label(), "blocked");
        toggle.on_change(&h.session, false);
        assert_eq!(toggle.label(), "allowed");

        let sent = h.sent_calls("setKillswitch");
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0]["params"][0], json!(true));
        assert_eq!(sent[1]["params"][0], json!(false));
        assert!(!h.session.snapshot().killswitch_enabled);
    }

    #[tokio::test(start_paused = true)]
    async fn enter_driver_mode_times_out_without_id() {
        let mut h = Harness::new();
        let started = Instant::now();

        let result = h.session.enter_driver_mode().await;

        assert!(result.is_err());
        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert!(h.sent_calls("enterDriverMode").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn enter_driver_mode_after_id() {
        let mut h = Harness::new();
        h.push("setClientId", json!([7]));

        let result = h.session.enter_driver_mode().await;

        assert_eq!(result, Ok(ClientId::new(7)));
        let sent = h.sent_calls("enterDriverMode");
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["params"], json!([7]));
    }

    #[tokio::test(start_paused = true)]
    async fn enter_driver_mode_waits_for_late_id() {
        let mut h = Harness::new();
        let pending = tokio::spawn(h.session.enter_driver_mode());

        time::sleep(Duration::from_millis(450)).await;
        h.push("setClientId", json!([5004]));

        assert_eq!(pending.await.unwrap(), Ok(ClientId::new(5004)));
        // let any stray timers fire; nothing else may be sent
        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(h.sent_calls("enterDriverMode").len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_driver_request_never_sends() {
        let mut h = Harness::new();
        let pending = tokio::spawn(h.session.enter_driver_mode());

        time::sleep(Duration::from_millis(250)).await;
        pending.abort();
        assert!(pending.await.unwrap_err().is_cancelled());

        h.push("setClientId", json!([9]));
        time::sleep(Duration::from_secs(2)).await;

        assert!(h.sent_calls("enterDriverMode").is_empty());
        assert_eq!(h.sent_calls("setClientInformation").len(), 1);
    }

    #[test]
    fn exit_driver_mode_is_immediate() {
        let mut h = Harness::new();
        h.session.exit_driver_mode();
        assert_eq!(h.sent_calls("exitDriverMode")[0]["params"], json!([0]));
    }
}

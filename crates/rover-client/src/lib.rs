//! Client-side session for the rover remote-control protocol.
//!
//! One [`Session`] per connection. The transport feeds it events; the session
//! decodes frames, routes server pushes to its state, arbitrates driver mode
//! and forwards notifications to a [`PresentationSink`]. Nothing here renders
//! anything.
//!
//! ```no_run
//! # async fn demo() -> anyhow::Result<()> {
//! use rover_client::{connect, endpoint_url, ClientConfig, Session, TracingSink};
//! use std::sync::Arc;
//!
//! let url = endpoint_url("localhost", 8080, false);
//! let connection = connect(&url).await?;
//! let sink = Arc::new(TracingSink);
//! let mut session = Session::new(ClientConfig::default(), connection.sender(), sink);
//! rover_client::run(connection, &mut session).await;
//! # Ok(())
//! # }
//! ```

mod arbitration;
mod blocking;
mod config;
mod dispatch;
mod error;
mod notify;
mod presentation;
mod session;
mod state;
mod transport;

#[cfg(test)]
mod testing;

pub use arbitration::{decide, wait_for_client_id, Decision};
pub use blocking::{BlockTransition, KillswitchToggle, SelfBlockState, BLOCKED_MESSAGE};
pub use config::{ClientConfig, ClientInfo};
pub use error::{AcquisitionTimeoutError, ConfigError, ConnectionError, ServerRpcError};
pub use notify::UPTIME_NOT_READY_MESSAGE;
pub use presentation::{
    Dialog, PresentationSink, RecordingSink, SinkEvent, Toast, ToastTheme, TracingSink,
};
pub use session::{run, ResponseCallback, Session};
pub use state::{RoverState, SessionSnapshot};
pub use transport::{connect, endpoint_url, Connection, RpcSender, TransportEvent, ENDPOINT_PATH};

pub use rover_core::{ClientId, CollisionState, Driver, ReadyState};

//! Client configuration.
//!
//! Every field has a default, so an empty TOML document is a valid config.

use crate::error::ConfigError;
use serde::Deserialize;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Speed sent with `driveForward` / `driveBackward`.
    pub desired_speed: i64,
    /// Rate sent with `turnLeft` / `turnRight`.
    pub turn_rate: i64,
    /// Step sent with the `turnHead*` calls.
    pub camera_step: i64,
    pub toast_hide_delay_ms: u64,
    pub client_id_poll_interval_ms: u64,
    pub client_id_timeout_ms: u64,
    /// Views on which a vacant driver seat is reacquired automatically.
    pub driving_views: Vec<String>,
    pub client_info: ClientInfo,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            desired_speed: 500,
            turn_rate: 300,
            camera_step: 20,
            toast_hide_delay_ms: 4000,
            client_id_poll_interval_ms: 100,
            client_id_timeout_ms: 1000,
            driving_views: vec!["/drive".to_string(), "/roverMaster".to_string()],
            client_info: ClientInfo::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn toast_hide_delay(&self) -> Duration {
        Duration::from_millis(self.toast_hide_delay_ms)
    }

    pub fn client_id_poll_interval(&self) -> Duration {
        // tokio intervals panic on a zero period
        Duration::from_millis(self.client_id_poll_interval_ms.max(1))
    }

    pub fn client_id_timeout(&self) -> Duration {
        Duration::from_millis(self.client_id_timeout_ms)
    }

    pub fn is_driving_view(&self, path: &str) -> bool {
        self.driving_views.iter().any(|view| view == path)
    }
}

/// What this client announces about itself once it has an id.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientInfo {
    pub fingerprint: String,
    pub browser: String,
    pub operating_system: String,
}

impl Default for ClientInfo {
    fn default() -> Self {
        let browser = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        let operating_system = std::env::consts::OS.to_string();
        let host = std::env::var("HOSTNAME")
            .or_else(|_| std::env::var("COMPUTERNAME"))
            .unwrap_or_default();

        let mut hasher = DefaultHasher::new();
        (&browser, &operating_system, std::env::consts::ARCH, &host).hash(&mut hasher);

        Self {
            fingerprint: hasher.finish().to_string(),
            browser,
            operating_system,
        }
    }
}

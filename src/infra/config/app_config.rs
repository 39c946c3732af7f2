use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AppConfig {
    pub logging: LogConfig,
    pub backend: BackendConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
        }
    }
}

/// How to reach the GOWA backend. The basic-auth pair here is the default
/// identity used before anyone logs in; a login replaces it for the rest of
/// the process via the shared credential handle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BackendConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub basic_auth_user: String,
    pub basic_auth_pass: String,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_owned(),
            api_key: None,
            basic_auth_user: "admin".to_owned(),
            basic_auth_pass: "admin".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SyncConfig {
    /// App-status cache staleness window.
    pub status_poll_secs: u64,
    /// Interval of the background refresh while a session is active.
    pub session_refresh_secs: u64,
    /// Delay before the single auto-reconnect attempt.
    pub reconnect_delay_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            status_poll_secs: 5,
            session_refresh_secs: 10,
            reconnect_delay_secs: 5,
        }
    }
}

use std::time::{SystemTime, UNIX_EPOCH};

/// Snapshot of the WhatsApp link state, refreshed by polling; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConnectionStatus {
    pub connected: bool,
    pub qr_code: Option<String>,
    pub pair_code: Option<String>,
}

impl ConnectionStatus {
    pub fn disconnected() -> Self {
        Self::default()
    }

    pub fn as_label(&self) -> &'static str {
        if self.connected {
            "CONNECTED"
        } else {
            "DISCONNECTED"
        }
    }
}

pub fn now_unix_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

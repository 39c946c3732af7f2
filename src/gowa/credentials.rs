//! Explicit credential handle shared between the session store and the HTTP
//! client. Replaces the original dashboard's window-level ambient fields: the
//! session usecases are the single writer, the client only reads.

use std::sync::Mutex;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::domain::session::Credentials;

#[derive(Debug)]
pub struct SharedCredentials {
    defaults: Credentials,
    active: Mutex<Option<Credentials>>,
}

impl SharedCredentials {
    pub fn new(defaults: Credentials) -> Self {
        Self {
            defaults,
            active: Mutex::new(None),
        }
    }

    /// The pair every request is signed with: the logged-in operator's
    /// credentials, or the configured defaults before login / after logout.
    pub fn current(&self) -> Credentials {
        self.active
            .lock()
            .ok()
            .and_then(|active| active.clone())
            .unwrap_or_else(|| self.defaults.clone())
    }

    pub fn set_active(&self, credentials: Credentials) {
        if let Ok(mut active) = self.active.lock() {
            *active = Some(credentials);
        }
    }

    pub fn clear_active(&self) {
        if let Ok(mut active) = self.active.lock() {
            *active = None;
        }
    }

    pub fn basic_auth_value(&self) -> String {
        basic_auth_value(&self.current())
    }
}

pub fn basic_auth_value(credentials: &Credentials) -> String {
    let pair = format!("{}:{}", credentials.username, credentials.password);
    format!("Basic {}", BASE64.encode(pair))
}

use serde::Deserialize;

use crate::infra::config::{AppConfig, BackendConfig, LogConfig, SyncConfig};

#[derive(Debug, Deserialize, Default)]
pub struct FileConfig {
    pub logging: Option<FileLogConfig>,
    pub backend: Option<FileBackendConfig>,
    pub sync: Option<FileSyncConfig>,
}

impl FileConfig {
    pub fn merge_into(self, config: &mut AppConfig) {
        if let Some(logging) = self.logging {
            logging.merge_into(&mut config.logging);
        }

        if let Some(backend) = self.backend {
            backend.merge_into(&mut config.backend);
        }

        if let Some(sync) = self.sync {
            sync.merge_into(&mut config.sync);
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileLogConfig {
    pub level: Option<String>,
}

impl FileLogConfig {
    fn merge_into(self, config: &mut LogConfig) {
        if let Some(level) = self.level {
            config.level = level;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileBackendConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub basic_auth_user: Option<String>,
    pub basic_auth_pass: Option<String>,
}

impl FileBackendConfig {
    fn merge_into(self, config: &mut BackendConfig) {
        if let Some(base_url) = self.base_url {
            config.base_url = base_url;
        }

        if let Some(api_key) = self.api_key {
            config.api_key = Some(api_key);
        }

        if let Some(user) = self.basic_auth_user {
            config.basic_auth_user = user;
        }

        if let Some(pass) = self.basic_auth_pass {
            config.basic_auth_pass = pass;
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FileSyncConfig {
    pub status_poll_secs: Option<u64>,
    pub session_refresh_secs: Option<u64>,
    pub reconnect_delay_secs: Option<u64>,
}

impl FileSyncConfig {
    fn merge_into(self, config: &mut SyncConfig) {
        if let Some(secs) = self.status_poll_secs {
            config.status_poll_secs = secs;
        }

        if let Some(secs) = self.session_refresh_secs {
            config.session_refresh_secs = secs;
        }

        if let Some(secs) = self.reconnect_delay_secs {
            config.reconnect_delay_secs = secs;
        }
    }
}

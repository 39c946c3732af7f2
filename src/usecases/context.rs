use std::sync::Arc;

use crate::{
    domain::session::Credentials,
    gowa::{GowaClient, SharedCredentials},
    infra::{config::AppConfig, error::AppError, session_store::SessionStore},
    sync::SyncHub,
    usecases::session::SessionTracker,
};

/// Everything a command needs, wired once at startup.
pub struct AppContext {
    pub config: AppConfig,
    pub credentials: Arc<SharedCredentials>,
    pub client: GowaClient,
    pub hub: SyncHub<GowaClient>,
    pub store: SessionStore,
    pub tracker: Arc<SessionTracker>,
}

impl AppContext {
    pub fn new(config: AppConfig) -> Result<Self, AppError> {
        let credentials = Arc::new(SharedCredentials::new(Credentials {
            username: config.backend.basic_auth_user.clone(),
            password: config.backend.basic_auth_pass.clone(),
        }));
        let client = GowaClient::new(&config.backend, Arc::clone(&credentials));
        let hub = SyncHub::new(client.clone(), &config.sync);
        let store = SessionStore::open()?;

        Ok(Self {
            config,
            credentials,
            client,
            hub,
            store,
            tracker: Arc::new(SessionTracker::new()),
        })
    }
}

//! Shared application state handed to every handler.

use std::sync::Arc;

use burrow_core::config::AppConfig;
use burrow_plugin::ActiveRegistry;
use burrow_session::SessionStore;

/// Cheap to clone; everything inside is shared.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub registry: Arc<ActiveRegistry>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    pub fn new(config: AppConfig, registry: ActiveRegistry) -> Self {
        let sessions = SessionStore::new(config.session.ttl_seconds);
        Self {
            config: Arc::new(config),
            registry: Arc::new(registry),
            sessions: Arc::new(sessions),
        }
    }
}

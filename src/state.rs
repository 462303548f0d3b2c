// src/state.rs
use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::notifier::FallbackNotifier;
use crate::services::reference_data::{ReferenceData, StaticReferenceData};
use crate::services::sessions::SessionStore;

/// Everything the handlers share.
pub struct AppState {
    pub config: AppConfig,
    pub sessions: SessionStore,
    pub notifier: Arc<FallbackNotifier>,
}

impl AppState {
    pub fn new(config: AppConfig, sessions: SessionStore, notifier: FallbackNotifier) -> Self {
        AppState {
            config,
            sessions,
            notifier: Arc::new(notifier),
        }
    }

    /// Static reference tables, random royalty variation, session limits and
    /// notifier from `config`.
    pub fn from_config(config: AppConfig) -> Self {
        let reference: Arc<dyn ReferenceData> = Arc::new(StaticReferenceData);
        let notifier = FallbackNotifier::from_config(&config.lead);
        let sessions = SessionStore::new(reference).with_limits(config.session_ttl, config.max_sessions);
        AppState::new(config, sessions, notifier)
    }
}

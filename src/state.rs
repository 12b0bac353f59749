use std::sync::Arc;

use crate::{
    pipeline::rate_limit::RateLimitConfig,
    services::{llm::ChatCompleter, metadata::MetadataResolver},
    session::SessionStore,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionStore,
    pub limits: RateLimitConfig,
    pub llm: Arc<dyn ChatCompleter>,
    pub resolver: Arc<MetadataResolver>,
}

impl AppState {
    pub fn new(
        limits: RateLimitConfig,
        llm: Arc<dyn ChatCompleter>,
        resolver: Arc<MetadataResolver>,
    ) -> Self {
        Self {
            sessions: SessionStore::new(),
            limits,
            llm,
            resolver,
        }
    }
}

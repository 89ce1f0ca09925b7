//! Application state management
//!
//! This module contains the shared application state that is passed
//! to all request handlers via Axum's State extractor.

use std::sync::Arc;

use crate::{config::Config, db::Repositories};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

/// Inner state (wrapped in Arc for cheap cloning)
struct AppStateInner {
    /// Storage ports
    pub repos: Repositories,

    /// Application configuration
    pub config: Config,
}

impl AppState {
    /// Create a new application state
    pub fn new(repos: Repositories, config: Config) -> Self {
        Self {
            inner: Arc::new(AppStateInner { repos, config }),
        }
    }

    /// Get a reference to the repositories
    pub fn repos(&self) -> &Repositories {
        &self.inner.repos
    }

    /// Get a reference to the configuration
    pub fn config(&self) -> &Config {
        &self.inner.config
    }
}

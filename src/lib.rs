//! ContestDesk - Competition Desk Backend
//!
//! This library provides the core functionality for running an on-site
//! competition: registering participants, grouping them, drawing the
//! performance order, collecting judges' scores and checking people in.
//!
//! # Features
//!
//! - Organization-based automatic grouping, with merging of small organizations
//! - Uniform random lottery for the performance order
//! - Score ledger keyed by participant, judge and round, with rankings
//! - Three-factor QR check-in with an append-only event log
//!
//! # Architecture
//!
//! The application follows a layered architecture:
//! - **Handlers**: HTTP request handlers (thin layer)
//! - **Services**: Business logic
//! - **Repositories**: Storage ports, backed by PostgreSQL or memory
//! - **Models**: Domain models and DTOs

pub mod config;
pub mod constants;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use db::Repositories;
pub use error::{AppError, AppResult};
pub use state::AppState;

/// Build the application router over the given state
pub fn app(state: AppState) -> axum::Router {
    axum::Router::new()
        .nest(constants::API_BASE_PATH, handlers::routes())
        .with_state(state)
}

//! HTTP Request Handlers
//!
//! This module contains all HTTP request handlers organized by domain.
//! Mutations answer with an [`Outcome`](crate::models::Outcome) body, so
//! rejected requests still return `200`; lookups of absent records return the
//! error body with its status code.

pub mod checkin;
pub mod groups;
pub mod health;
pub mod judges;
pub mod participants;
pub mod scores;

use axum::Router;

use crate::state::AppState;

/// Create all API routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .nest("/participants", participants::routes())
        .nest("/groups", groups::routes())
        .nest("/judges", judges::routes())
        .nest("/scores", scores::routes())
        .nest("/checkin", checkin::routes())
}

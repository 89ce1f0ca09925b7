//! Participant registry handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

/// Participant routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::create_participant).get(handler::list_participants))
        .route("/batch", post(handler::batch_create_participants))
        .route("/ungrouped", get(handler::list_ungrouped))
        .route("/organizations/{organization}", get(handler::list_by_organization))
        .route("/{id}", get(handler::get_participant).put(handler::update_participant))
}

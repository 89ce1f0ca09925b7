//! Judge scoring handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::state::AppState;

/// Score routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::submit_score))
        .route("/batch", post(handler::batch_submit_scores))
        .route("/ranking", get(handler::get_ranking))
        .route("/progress", get(handler::get_progress))
        .route("/statistics", get(handler::get_statistics))
        .route("/participants/{id}", get(handler::get_participant_scores))
        .route("/participants/{id}/average", get(handler::get_average))
        .route("/judges/{id}", get(handler::get_judge_scores))
        .route("/judges/{id}/next", get(handler::get_next_participant))
        .route("/{id}", delete(handler::delete_score))
}

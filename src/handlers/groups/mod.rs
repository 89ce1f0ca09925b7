//! Group administration, automatic grouping and lottery handlers

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

/// Group routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::create_group).get(handler::list_groups))
        .route("/auto", post(handler::auto_group))
        .route("/merge", post(handler::merge_groups))
        .route("/draw", post(handler::draw_lots))
        .route("/assignments", post(handler::batch_assign))
        .route("/statistics", get(handler::get_statistics))
        .route(
            "/{id}",
            get(handler::get_group)
                .put(handler::update_group)
                .delete(handler::delete_group),
        )
        .route("/{id}/members", post(handler::assign_participant))
        .route("/{id}/members/{participant_id}", delete(handler::remove_participant))
}

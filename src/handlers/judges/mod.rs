//! Judge panel handlers

mod handler;
pub mod request;
pub mod response;

pub use handler::*;
pub use request::*;
pub use response::*;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::state::AppState;

/// Judge routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(handler::create_judge).get(handler::list_judges))
        .route("/{id}", get(handler::get_judge))
        .route("/{id}/active", put(handler::set_judge_active))
}

//! On-site check-in handlers

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

/// Check-in routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/verify", post(handler::verify_checkin))
        .route("/qr/{qr_code_id}", get(handler::get_qr_code_info))
        .route("/recent", get(handler::list_recent))
        .route("/statistics", get(handler::get_statistics))
        .route("/participants/{id}", get(handler::get_status))
        .route("/participants/{id}/manual", post(handler::manual_checkin))
        .route("/participants/{id}/cancel", post(handler::cancel_checkin))
}

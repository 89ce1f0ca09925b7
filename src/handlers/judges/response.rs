//! Judge response DTOs

use serde::Serialize;

use crate::models::Judge;

/// Judge list response
#[derive(Debug, Serialize)]
pub struct JudgesListResponse {
    pub judges: Vec<Judge>,
    pub total: usize,
}

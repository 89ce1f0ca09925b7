//! Judge model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Judge database model
///
/// Login credentials are owned by the external credential component; only
/// the scoring identity is kept here.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize)]
pub struct Judge {
    pub id: i64,
    pub name: String,
    pub organization: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for a judge about to be stored
#[derive(Debug, Clone, PartialEq)]
pub struct NewJudge {
    pub name: String,
    pub organization: Option<String>,
}

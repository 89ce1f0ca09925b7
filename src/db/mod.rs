//! Database module
//!
//! This module handles database connections, migrations, and repositories.

pub mod connection;
pub mod memory;
pub mod repositories;

use std::sync::Arc;

use sqlx::PgPool;

pub use connection::*;
pub use memory::MemoryStore;

use repositories::{
    CheckinRepository, GroupRepository, JudgeRepository, ParticipantRepository,
    PgCheckinRepository, PgGroupRepository, PgJudgeRepository, PgParticipantRepository,
    PgScoreRepository, ScoreRepository,
};

/// Run database migrations
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Storage ports handed to the services
#[derive(Clone)]
pub struct Repositories {
    pub participants: Arc<dyn ParticipantRepository>,
    pub groups: Arc<dyn GroupRepository>,
    pub judges: Arc<dyn JudgeRepository>,
    pub scores: Arc<dyn ScoreRepository>,
    pub checkins: Arc<dyn CheckinRepository>,
}

impl Repositories {
    /// PostgreSQL-backed repositories sharing one pool
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            participants: Arc::new(PgParticipantRepository::new(pool.clone())),
            groups: Arc::new(PgGroupRepository::new(pool.clone())),
            judges: Arc::new(PgJudgeRepository::new(pool.clone())),
            scores: Arc::new(PgScoreRepository::new(pool.clone())),
            checkins: Arc::new(PgCheckinRepository::new(pool)),
        }
    }

    /// Repositories over one fresh process-local store
    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            participants: store.clone(),
            groups: store.clone(),
            judges: store.clone(),
            scores: store.clone(),
            checkins: store,
        }
    }
}

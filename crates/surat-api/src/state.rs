//! Application state shared by all handlers.

use sqlx::PgPool;
use std::sync::Arc;
use surat_core::Config;
use surat_db::{
    AttachmentRepository, HistoryRepository, ProfileRepository, ReportRepository,
    TaskAssignmentRepository,
};
use surat_storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub pool: PgPool,
    pub storage: Arc<dyn Storage>,
    pub reports: ReportRepository,
    pub assignments: TaskAssignmentRepository,
    pub attachments: AttachmentRepository,
    pub history: HistoryRepository,
    pub profiles: ProfileRepository,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool, storage: Arc<dyn Storage>) -> Self {
        Self {
            reports: ReportRepository::new(pool.clone()),
            assignments: TaskAssignmentRepository::new(pool.clone()),
            attachments: AttachmentRepository::new(pool.clone()),
            history: HistoryRepository::new(pool.clone()),
            profiles: ProfileRepository::new(pool.clone()),
            config,
            pool,
            storage,
        }
    }
}

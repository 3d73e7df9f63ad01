use sqlx::{PgPool, Postgres, Transaction};
use surat_core::models::WorkflowHistoryEntry;
use surat_core::AppError;
use uuid::Uuid;

const HISTORY_COLUMNS: &str = "id, report_id, action, user_id, status, notes, created_at";

/// Repository for the append-only workflow history.
///
/// There is deliberately no update or delete here; the audit trail only
/// grows.
#[derive(Clone)]
pub struct HistoryRepository {
    pool: PgPool,
}

impl HistoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(
        skip(self, tx, notes),
        fields(db.table = "workflow_history", db.operation = "insert", report_id = %report_id, action = %action)
    )]
    pub async fn insert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        report_id: Uuid,
        action: &str,
        user_id: Uuid,
        status: &str,
        notes: Option<String>,
    ) -> Result<WorkflowHistoryEntry, AppError> {
        let entry = sqlx::query_as::<Postgres, WorkflowHistoryEntry>(&format!(
            r#"
            INSERT INTO workflow_history (report_id, action, user_id, status, notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {HISTORY_COLUMNS}
            "#
        ))
        .bind(report_id)
        .bind(action)
        .bind(user_id)
        .bind(status)
        .bind(&notes)
        .fetch_one(&mut **tx)
        .await?;

        Ok(entry)
    }

    /// History for a report, oldest first. The tracking timeline depends on
    /// this ordering.
    #[tracing::instrument(skip(self), fields(db.table = "workflow_history", db.operation = "select", report_id = %report_id))]
    pub async fn list_by_report(
        &self,
        report_id: Uuid,
    ) -> Result<Vec<WorkflowHistoryEntry>, AppError> {
        let entries = sqlx::query_as::<Postgres, WorkflowHistoryEntry>(&format!(
            "SELECT {HISTORY_COLUMNS} FROM workflow_history WHERE report_id = $1 ORDER BY created_at ASC"
        ))
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }
}

use sqlx::{PgPool, Postgres, Transaction};
use surat_core::models::{AttachmentPayload, FileAttachment};
use surat_core::AppError;
use uuid::Uuid;

const ATTACHMENT_COLUMNS: &str =
    "id, report_id, file_name, file_url, file_type, file_size, uploaded_by, created_at";

/// Repository for file attachments.
#[derive(Clone)]
pub struct AttachmentRepository {
    pool: PgPool,
}

impl AttachmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Bulk-insert attachment metadata rows. Entries without a resolvable
    /// URL are skipped rather than rejected. Returns the inserted rows.
    #[tracing::instrument(
        skip(self, tx, payloads),
        fields(db.table = "file_attachments", db.operation = "insert", report_id = %report_id)
    )]
    pub async fn insert_many_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        report_id: Uuid,
        uploaded_by: Uuid,
        payloads: &[AttachmentPayload],
    ) -> Result<Vec<FileAttachment>, AppError> {
        let mut inserted = Vec::new();

        for payload in payloads {
            let Some(url) = payload.resolved_url() else {
                tracing::warn!(report_id = %report_id, "Skipping attachment without a URL");
                continue;
            };

            let row = sqlx::query_as::<Postgres, FileAttachment>(&format!(
                r#"
                INSERT INTO file_attachments (report_id, file_name, file_url, file_type, file_size, uploaded_by)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING {ATTACHMENT_COLUMNS}
                "#
            ))
            .bind(report_id)
            .bind(payload.resolved_name())
            .bind(url)
            .bind(payload.file_type.as_deref().unwrap_or("original"))
            .bind(payload.file_size)
            .bind(uploaded_by)
            .fetch_one(&mut **tx)
            .await?;

            inserted.push(row);
        }

        Ok(inserted)
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_attachments", db.operation = "select", report_id = %report_id))]
    pub async fn list_by_report(&self, report_id: Uuid) -> Result<Vec<FileAttachment>, AppError> {
        let attachments = sqlx::query_as::<Postgres, FileAttachment>(&format!(
            "SELECT {ATTACHMENT_COLUMNS} FROM file_attachments WHERE report_id = $1 ORDER BY created_at ASC"
        ))
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(attachments)
    }

    /// Delete every attachment of a report. Used by the replace-on-update
    /// path, inside the same transaction as the re-insert.
    #[tracing::instrument(skip(self, tx), fields(db.table = "file_attachments", db.operation = "delete", report_id = %report_id))]
    pub async fn delete_by_report_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        report_id: Uuid,
    ) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM file_attachments WHERE report_id = $1")
            .bind(report_id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected())
    }
}

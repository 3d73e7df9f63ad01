use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use surat_core::models::{NewReport, Priority, Report, ReportPatch, ReportStatus};
use surat_core::AppError;
use uuid::Uuid;

const REPORT_COLUMNS: &str = "id, no_surat, hal, layanan, sub_layanan, dari, tanggal_surat, \
     tanggal_agenda, no_agenda, kelompok_asal_surat, agenda_sestama, link_documents, sifat, \
     derajat, status, priority, created_by, current_holder, coordinator_id, created_at, updated_at";

/// Repository for reports.
#[derive(Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[tracing::instrument(skip(self, tx, report), fields(db.table = "reports", db.operation = "insert"))]
    pub async fn create_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        report: NewReport,
    ) -> Result<Report, AppError> {
        let row = sqlx::query_as::<Postgres, Report>(&format!(
            r#"
            INSERT INTO reports (
                no_surat, hal, layanan, sub_layanan, dari, tanggal_surat, tanggal_agenda,
                no_agenda, kelompok_asal_surat, agenda_sestama, link_documents, sifat,
                derajat, status, priority, created_by, current_holder
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(&report.no_surat)
        .bind(&report.hal)
        .bind(&report.layanan)
        .bind(&report.sub_layanan)
        .bind(&report.dari)
        .bind(&report.tanggal_surat)
        .bind(&report.tanggal_agenda)
        .bind(&report.no_agenda)
        .bind(&report.kelompok_asal_surat)
        .bind(&report.agenda_sestama)
        .bind(&report.link_documents)
        .bind(&report.sifat)
        .bind(&report.derajat)
        .bind(report.status)
        .bind(report.priority)
        .bind(report.created_by)
        .bind(report.current_holder)
        .fetch_one(&mut **tx)
        .await?;

        Ok(row)
    }

    #[tracing::instrument(skip(self), fields(db.table = "reports", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<Report>, AppError> {
        let report = sqlx::query_as::<Postgres, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(report)
    }

    /// Fetch a report inside a transaction with a row lock, so concurrent
    /// transitions on the same report serialize.
    #[tracing::instrument(skip(self, tx), fields(db.table = "reports", db.operation = "select", db.record_id = %id))]
    pub async fn get_for_update_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<Report>, AppError> {
        let report = sqlx::query_as::<Postgres, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(report)
    }

    /// All reports, newest first.
    #[tracing::instrument(skip(self), fields(db.table = "reports", db.operation = "select"))]
    pub async fn list_all(&self) -> Result<Vec<Report>, AppError> {
        let reports = sqlx::query_as::<Postgres, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }

    #[tracing::instrument(skip(self), fields(db.table = "reports", db.operation = "select"))]
    pub async fn list_by_statuses(
        &self,
        statuses: &[ReportStatus],
    ) -> Result<Vec<Report>, AppError> {
        let reports = sqlx::query_as::<Postgres, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE status = ANY($1) ORDER BY created_at DESC"
        ))
        .bind(statuses)
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }

    #[tracing::instrument(skip(self), fields(db.table = "reports", db.operation = "select"))]
    pub async fn list_by_holder(&self, holder: Uuid) -> Result<Vec<Report>, AppError> {
        let reports = sqlx::query_as::<Postgres, Report>(&format!(
            "SELECT {REPORT_COLUMNS} FROM reports WHERE current_holder = $1 ORDER BY created_at DESC"
        ))
        .bind(holder)
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }

    /// Reports with a live assignment for the given staff profile.
    #[tracing::instrument(skip(self), fields(db.table = "reports", db.operation = "select"))]
    pub async fn list_assigned_to_staff(&self, staff_id: Uuid) -> Result<Vec<Report>, AppError> {
        let reports = sqlx::query_as::<Postgres, Report>(&format!(
            r#"
            SELECT DISTINCT ON (r.id) {cols}
            FROM reports r
            JOIN task_assignments ta ON ta.report_id = r.id
            WHERE ta.staff_id = $1
            ORDER BY r.id, r.created_at DESC
            "#,
            cols = prefixed_columns("r")
        ))
        .bind(staff_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(reports)
    }

    /// Public lookup by `no_surat` or tracking number.
    ///
    /// The tracking number is `TRK-` plus the first eight hex characters of
    /// the report id, so the match is computed from the id column.
    #[tracing::instrument(skip(self), fields(db.table = "reports", db.operation = "select"))]
    pub async fn find_by_tracking(&self, search: &str) -> Result<Option<Report>, AppError> {
        let search = search.trim();
        let hex = search
            .strip_prefix("TRK-")
            .or_else(|| search.strip_prefix("trk-"))
            .unwrap_or(search)
            .to_uppercase();

        let report = sqlx::query_as::<Postgres, Report>(&format!(
            r#"
            SELECT {REPORT_COLUMNS} FROM reports
            WHERE no_surat = $1
               OR UPPER(LEFT(REPLACE(id::text, '-', ''), 8)) = $2
            LIMIT 1
            "#
        ))
        .bind(search)
        .bind(&hex)
        .fetch_optional(&self.pool)
        .await?;

        Ok(report)
    }

    /// Apply a partial update. Absent fields are left alone; explicit nulls
    /// clear nullable columns. Status and priority arrive pre-validated.
    #[tracing::instrument(skip(self, tx, patch), fields(db.table = "reports", db.operation = "update", db.record_id = %id))]
    pub async fn update_fields_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        patch: &ReportPatch,
        status: Option<ReportStatus>,
        priority: Option<Priority>,
    ) -> Result<Report, AppError> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE reports SET updated_at = now()");

        if let Some(v) = &patch.no_surat {
            qb.push(", no_surat = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.hal {
            qb.push(", hal = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.layanan {
            qb.push(", layanan = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.sub_layanan {
            qb.push(", sub_layanan = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.dari {
            qb.push(", dari = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.tanggal_surat {
            qb.push(", tanggal_surat = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.tanggal_agenda {
            qb.push(", tanggal_agenda = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.no_agenda {
            qb.push(", no_agenda = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.kelompok_asal_surat {
            qb.push(", kelompok_asal_surat = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.agenda_sestama {
            qb.push(", agenda_sestama = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.link_documents {
            qb.push(", link_documents = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.sifat {
            qb.push(", sifat = ").push_bind(v.clone());
        }
        if let Some(v) = &patch.derajat {
            qb.push(", derajat = ").push_bind(v.clone());
        }
        if let Some(v) = status {
            qb.push(", status = ").push_bind(v);
        }
        if let Some(v) = priority {
            qb.push(", priority = ").push_bind(v);
        }
        if let Some(v) = patch.coordinator_id {
            qb.push(", coordinator_id = ").push_bind(v);
        }

        qb.push(" WHERE id = ").push_bind(id);
        qb.push(" RETURNING ").push(REPORT_COLUMNS);

        let report = qb
            .build_query_as::<Report>()
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        Ok(report)
    }

    /// Move a report to a new status and holder in one statement.
    #[tracing::instrument(skip(self, tx), fields(db.table = "reports", db.operation = "update", db.record_id = %id))]
    pub async fn set_status_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: ReportStatus,
        current_holder: Option<Uuid>,
    ) -> Result<Report, AppError> {
        let report = sqlx::query_as::<Postgres, Report>(&format!(
            r#"
            UPDATE reports
            SET status = $2, current_holder = $3, updated_at = now()
            WHERE id = $1
            RETURNING {REPORT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(status)
        .bind(current_holder)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        Ok(report)
    }

    /// Record the coordinator the report was forwarded to.
    #[tracing::instrument(skip(self, tx), fields(db.table = "reports", db.operation = "update", db.record_id = %id))]
    pub async fn set_coordinator_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        coordinator_id: Uuid,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE reports SET coordinator_id = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(coordinator_id)
            .execute(&mut **tx)
            .await?;

        Ok(())
    }

    /// Delete a report. Attachments, assignments, and history cascade.
    #[tracing::instrument(skip(self, tx), fields(db.table = "reports", db.operation = "delete", db.record_id = %id))]
    pub async fn delete_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM reports WHERE id = $1")
            .bind(id)
            .execute(&mut **tx)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

fn prefixed_columns(alias: &str) -> String {
    REPORT_COLUMNS
        .split(", ")
        .map(|c| format!("{}.{}", alias, c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

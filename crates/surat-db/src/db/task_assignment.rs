use sqlx::{PgPool, Postgres, Transaction};
use surat_core::models::{TaskAssignment, TaskStatus};
use surat_core::AppError;
use uuid::Uuid;

const ASSIGNMENT_COLUMNS: &str = "id, report_id, staff_id, coordinator_id, todo_list, notes, \
     status, completed_tasks, progress, file_path, revised_file_path, staff_notes, \
     staff_revision_notes, revision_notes, completed_at, created_at, updated_at";

/// An assignment joined with the assigned staff member's display name, for
/// the report listing and the public tracking projection.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AssignmentWithStaff {
    #[sqlx(flatten)]
    pub assignment: TaskAssignment,
    pub staff_name: String,
}

/// Repository for task assignments.
#[derive(Clone)]
pub struct TaskAssignmentRepository {
    pool: PgPool,
}

impl TaskAssignmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create an assignment. The partial unique index on live assignments
    /// rejects assigning the same staff member twice to one report.
    #[tracing::instrument(
        skip(self, tx, todo_list, notes),
        fields(db.table = "task_assignments", db.operation = "insert", report_id = %report_id, staff_id = %staff_id)
    )]
    pub async fn create_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        report_id: Uuid,
        staff_id: Uuid,
        coordinator_id: Uuid,
        todo_list: Vec<String>,
        notes: Option<String>,
    ) -> Result<TaskAssignment, AppError> {
        let result = sqlx::query_as::<Postgres, TaskAssignment>(&format!(
            r#"
            INSERT INTO task_assignments (report_id, staff_id, coordinator_id, todo_list, notes, status)
            VALUES ($1, $2, $3, $4, $5, 'in-progress')
            RETURNING {ASSIGNMENT_COLUMNS}
            "#
        ))
        .bind(report_id)
        .bind(staff_id)
        .bind(coordinator_id)
        .bind(&todo_list)
        .bind(&notes)
        .fetch_one(&mut **tx)
        .await;

        match result {
            Ok(assignment) => Ok(assignment),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(AppError::InvalidInput(format!(
                    "Staff {} already has an active assignment for this report",
                    staff_id
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "task_assignments", db.operation = "select", db.record_id = %id))]
    pub async fn get(&self, id: Uuid) -> Result<Option<TaskAssignment>, AppError> {
        let assignment = sqlx::query_as::<Postgres, TaskAssignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM task_assignments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(assignment)
    }

    /// Fetch an assignment with a row lock for a task-level transition.
    #[tracing::instrument(skip(self, tx), fields(db.table = "task_assignments", db.operation = "select", db.record_id = %id))]
    pub async fn get_for_update_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Option<TaskAssignment>, AppError> {
        let assignment = sqlx::query_as::<Postgres, TaskAssignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM task_assignments WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        Ok(assignment)
    }

    #[tracing::instrument(skip(self), fields(db.table = "task_assignments", db.operation = "select", report_id = %report_id))]
    pub async fn list_by_report(&self, report_id: Uuid) -> Result<Vec<TaskAssignment>, AppError> {
        let assignments = sqlx::query_as::<Postgres, TaskAssignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM task_assignments WHERE report_id = $1 ORDER BY created_at ASC"
        ))
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assignments)
    }

    /// Assignments for a report with each staff member's display name.
    #[tracing::instrument(skip(self), fields(db.table = "task_assignments", db.operation = "select", report_id = %report_id))]
    pub async fn list_with_staff(
        &self,
        report_id: Uuid,
    ) -> Result<Vec<AssignmentWithStaff>, AppError> {
        let rows = sqlx::query_as::<Postgres, AssignmentWithStaff>(&format!(
            r#"
            SELECT {cols}, COALESCE(p.full_name, p.name) AS staff_name
            FROM task_assignments ta
            JOIN profiles p ON p.id = ta.staff_id
            WHERE ta.report_id = $1
            ORDER BY ta.created_at ASC
            "#,
            cols = prefixed_columns("ta")
        ))
        .bind(report_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Live assignments for a staff member across all reports.
    #[tracing::instrument(skip(self), fields(db.table = "task_assignments", db.operation = "select", staff_id = %staff_id))]
    pub async fn list_by_staff(&self, staff_id: Uuid) -> Result<Vec<TaskAssignment>, AppError> {
        let assignments = sqlx::query_as::<Postgres, TaskAssignment>(&format!(
            "SELECT {ASSIGNMENT_COLUMNS} FROM task_assignments WHERE staff_id = $1 ORDER BY created_at DESC"
        ))
        .bind(staff_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(assignments)
    }

    /// Statuses of every assignment on a report, for eligibility checks.
    #[tracing::instrument(skip(self, tx), fields(db.table = "task_assignments", db.operation = "select", report_id = %report_id))]
    pub async fn statuses_for_report_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        report_id: Uuid,
    ) -> Result<Vec<TaskStatus>, AppError> {
        let statuses = sqlx::query_scalar::<Postgres, TaskStatus>(
            "SELECT status FROM task_assignments WHERE report_id = $1",
        )
        .bind(report_id)
        .fetch_all(&mut **tx)
        .await?;

        Ok(statuses)
    }

    /// Staff submits first-pass work: the file, notes, checked to-dos, and a
    /// progress figure, moving the assignment to `completed`.
    #[tracing::instrument(
        skip(self, tx, completed_tasks, staff_notes),
        fields(db.table = "task_assignments", db.operation = "update", db.record_id = %id)
    )]
    pub async fn submit_work_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        file_path: &str,
        staff_notes: Option<String>,
        completed_tasks: Vec<String>,
        progress: i32,
    ) -> Result<TaskAssignment, AppError> {
        let assignment = sqlx::query_as::<Postgres, TaskAssignment>(&format!(
            r#"
            UPDATE task_assignments
            SET status = 'completed', file_path = $2, staff_notes = $3,
                completed_tasks = $4, progress = $5, completed_at = now(), updated_at = now()
            WHERE id = $1
            RETURNING {ASSIGNMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(file_path)
        .bind(&staff_notes)
        .bind(&completed_tasks)
        .bind(progress)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assignment {} not found", id)))?;

        Ok(assignment)
    }

    /// Staff submits a revised file after a rejection, moving the assignment
    /// to `pending-review`.
    #[tracing::instrument(
        skip(self, tx, staff_revision_notes),
        fields(db.table = "task_assignments", db.operation = "update", db.record_id = %id)
    )]
    pub async fn submit_revision_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        revised_file_path: &str,
        staff_revision_notes: Option<String>,
    ) -> Result<TaskAssignment, AppError> {
        let assignment = sqlx::query_as::<Postgres, TaskAssignment>(&format!(
            r#"
            UPDATE task_assignments
            SET status = 'pending-review', revised_file_path = $2,
                staff_revision_notes = $3, updated_at = now()
            WHERE id = $1
            RETURNING {ASSIGNMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(revised_file_path)
        .bind(&staff_revision_notes)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assignment {} not found", id)))?;

        Ok(assignment)
    }

    /// Coordinator rejects an assignment's work with a revision note.
    #[tracing::instrument(
        skip(self, tx, revision_notes),
        fields(db.table = "task_assignments", db.operation = "update", db.record_id = %id)
    )]
    pub async fn request_revision_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        revision_notes: &str,
    ) -> Result<TaskAssignment, AppError> {
        let assignment = sqlx::query_as::<Postgres, TaskAssignment>(&format!(
            r#"
            UPDATE task_assignments
            SET status = 'revision-required', revision_notes = $2, updated_at = now()
            WHERE id = $1
            RETURNING {ASSIGNMENT_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(revision_notes)
        .fetch_optional(&mut **tx)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Assignment {} not found", id)))?;

        Ok(assignment)
    }

    /// Coordinator approves every pending-review assignment on a report.
    /// Returns the number approved.
    #[tracing::instrument(skip(self, tx), fields(db.table = "task_assignments", db.operation = "update", report_id = %report_id))]
    pub async fn approve_pending_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        report_id: Uuid,
    ) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            UPDATE task_assignments
            SET status = 'completed', completed_at = now(), updated_at = now()
            WHERE report_id = $1 AND status = 'pending-review'
            "#,
        )
        .bind(report_id)
        .execute(&mut **tx)
        .await?;

        Ok(result.rows_affected())
    }
}

fn prefixed_columns(alias: &str) -> String {
    ASSIGNMENT_COLUMNS
        .split(", ")
        .map(|c| format!("{}.{}", alias, c.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

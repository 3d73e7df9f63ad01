//! Database repositories for the letter tracking workflow.
//!
//! One repository per persisted collection, each a thin wrapper over a
//! cloned `PgPool`. Multi-step writes go through the `_tx` variants and
//! `with_transaction` so every logical operation is atomic.

pub mod db;

pub use db::transaction::with_transaction;
pub use db::{
    AttachmentRepository, HistoryRepository, ProfileRepository, ReportRepository,
    TaskAssignmentRepository,
};
pub use db::task_assignment::AssignmentWithStaff;

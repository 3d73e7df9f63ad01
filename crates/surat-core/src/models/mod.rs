//! Entity models for the persisted collections.

mod attachment;
mod history;
mod profile;
mod report;
mod task;

pub use attachment::{AttachmentPayload, FileAttachment};
pub use history::{actions, WorkflowHistoryEntry};
pub use profile::{Profile, Role};
pub use report::{
    tracking_number, NewReport, Priority, Report, ReportPatch, ReportStatus,
};
pub use task::{TaskAssignment, TaskStatus};

/// Deserializer for tri-state PATCH fields: an absent key stays `None`, an
/// explicit `null` becomes `Some(None)` (clear the column), and a value becomes
/// `Some(Some(v))`. Used with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(de).map(Some)
}

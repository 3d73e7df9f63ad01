//! Repository implementations, one per collection.

pub mod attachment;
pub mod history;
pub mod profile;
pub mod report;
pub mod task_assignment;
pub mod transaction;

pub use attachment::AttachmentRepository;
pub use history::HistoryRepository;
pub use profile::ProfileRepository;
pub use report::ReportRepository;
pub use task_assignment::TaskAssignmentRepository;

//! Surat Core Library
//!
//! Domain types for the letter tracking workflow: entity models, the
//! report/task status machines, the public tracking projection, upload
//! validation, configuration, and the shared error taxonomy.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod tracking;
pub mod validation;
pub mod workflow;

pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};

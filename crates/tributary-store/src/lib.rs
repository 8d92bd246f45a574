//! Tributary Store
//!
//! This crate provides the storage trait and implementations for processes
//! and their tasks. The process engine is the only writer.
//!
//! The [`ProcessStore`] trait defines operations for:
//! - Creating a process together with its task records, atomically
//! - Loading and updating processes (state, form, history)
//! - Querying processes and tasks
//!
//! Two implementations are provided: [`MemoryStore`] and [`SqliteStore`].

mod memory;
mod sqlite;
mod types;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use types::{AuditEntry, AuditKind, ProcessRecord, ProcessState, TaskRecord, TaskStatus};

use async_trait::async_trait;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
  /// The requested record was not found.
  #[error("not found: {0}")]
  NotFound(String),

  /// A record with the same id already exists.
  #[error("already exists: {0}")]
  AlreadyExists(String),

  /// A database error occurred.
  #[error("database error: {0}")]
  Database(#[from] sqlx::Error),
}

/// Storage trait for processes and tasks.
#[async_trait]
pub trait ProcessStore: Send + Sync {
  /// Create a new process and its task records.
  ///
  /// Either everything is written or nothing is.
  async fn create_process(
    &self,
    process: &ProcessRecord,
    tasks: &[TaskRecord],
  ) -> Result<(), StoreError>;

  /// Get a process by ID.
  async fn get_process(&self, process_id: &str) -> Result<ProcessRecord, StoreError>;

  /// Replace the mutable parts of a process (state, form, history, updated_at).
  async fn update_process(&self, process: &ProcessRecord) -> Result<(), StoreError>;

  /// List processes created from a definition, oldest first.
  async fn list_processes(&self, process_name: &str) -> Result<Vec<ProcessRecord>, StoreError>;

  /// List tasks of a process in creation order.
  async fn list_tasks(&self, process_id: &str) -> Result<Vec<TaskRecord>, StoreError>;
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tributary_model::ProcessForm;

/// State of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessState {
  Running,
  Completed,
  Rejected,
  Cancelled,
  Terminated,
  Failed,
}

impl ProcessState {
  /// Terminal states accept no further events.
  pub fn is_terminal(&self) -> bool {
    !matches!(self, ProcessState::Running)
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      ProcessState::Running => "RUNNING",
      ProcessState::Completed => "COMPLETED",
      ProcessState::Rejected => "REJECTED",
      ProcessState::Cancelled => "CANCELLED",
      ProcessState::Terminated => "TERMINATED",
      ProcessState::Failed => "FAILED",
    }
  }
}

impl std::fmt::Display for ProcessState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Status of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
  Running,
  Completed,
  Failed,
}

/// One entry of a process's audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
  pub at: DateTime<Utc>,
  /// Name of the event involved, e.g. "CREATE".
  pub event: String,
  #[serde(flatten)]
  pub kind: AuditKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditKind {
  /// The event was applied and the state committed.
  Applied {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<ProcessState>,
    to: ProcessState,
  },
  /// An asynchronous listener dispatched by the event finished successfully.
  AsyncListenerSucceeded { listener: String },
  /// An asynchronous listener dispatched by the event failed or timed out.
  AsyncListenerFailed { listener: String, reason: String },
}

/// A process as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRecord {
  pub process_id: String,
  pub process_name: String,
  pub state: ProcessState,
  pub form: ProcessForm,
  pub history: Vec<AuditEntry>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl ProcessRecord {
  /// The event that produced the current state.
  pub fn last_applied_event(&self) -> Option<&str> {
    self
      .history
      .iter()
      .rev()
      .find(|entry| matches!(entry.kind, AuditKind::Applied { .. }))
      .map(|entry| entry.event.as_str())
  }
}

/// A task as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TaskRecord {
  pub task_id: String,
  pub process_id: String,
  pub task_name: String,
  pub status: TaskStatus,
  pub created_at: DateTime<Utc>,
  pub completed_at: Option<DateTime<Utc>>,
  pub error: Option<String>,
}

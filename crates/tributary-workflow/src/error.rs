//! Error types for the process engine.

use thiserror::Error;
use tributary_store::{ProcessState, StoreError};

use crate::event::ProcessEvent;

/// Errors returned by the process engine and runner.
#[derive(Debug, Error)]
pub enum WorkflowError {
  /// The process is in a terminal state and accepts no further events.
  #[error("process '{process_id}' is terminated in state {state}")]
  ProcessTerminated {
    process_id: String,
    state: ProcessState,
  },

  /// No process with this id exists.
  #[error("process '{process_id}' not found")]
  ProcessNotFound { process_id: String },

  /// No definition is registered under this process name.
  #[error("unknown process '{process_name}'")]
  UnknownProcess { process_name: String },

  /// The event cannot be applied to the process in its current state.
  #[error("cannot apply {event} to process '{process_id}' in state {state}")]
  InvalidTransition {
    process_id: String,
    event: ProcessEvent,
    state: ProcessState,
  },

  /// A synchronous listener reported failure.
  #[error("listener '{listener}' failed: {reason}")]
  ListenerFailed { listener: String, reason: String },

  /// A synchronous listener did not finish in time.
  #[error("listener '{listener}' timed out after {timeout_ms}ms")]
  ListenerTimeout { listener: String, timeout_ms: u64 },

  /// The process store failed.
  #[error("store error: {0}")]
  Store(#[from] StoreError),

  /// The runner's channel is closed.
  #[error("process runner channel closed")]
  RunnerClosed,
}

impl WorkflowError {
  /// Listener name and reason for failures raised by a listener.
  pub(crate) fn listener_failure(&self) -> Option<(&str, String)> {
    match self {
      WorkflowError::ListenerFailed { listener, reason } => Some((listener, reason.clone())),
      WorkflowError::ListenerTimeout {
        listener,
        timeout_ms,
      } => Some((listener, format!("timed out after {}ms", timeout_ms))),
      _ => None,
    }
  }
}

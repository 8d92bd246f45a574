//! Workflow notifications for observability.
//!
//! Notifications are emitted as processes move through their lifecycle so
//! consumers can observe progress, forward to other systems, etc.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tributary_store::ProcessState;

/// Notifications emitted by the process engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum WorkflowNotification {
  /// A process was created and persisted.
  ProcessStarted {
    process_id: String,
    process_name: String,
  },

  /// An event committed and the process changed state.
  TransitionApplied {
    process_id: String,
    event: String,
    from: Option<ProcessState>,
    to: ProcessState,
  },

  /// A synchronous listener failed; the process did not change.
  TransitionAborted {
    process_id: String,
    event: String,
    listener: String,
    reason: String,
  },

  /// All gating listeners of a task succeeded.
  TaskCompleted {
    process_id: String,
    task_id: String,
    task_name: String,
  },

  /// A task listener failed.
  TaskFailed {
    process_id: String,
    task_id: String,
    task_name: String,
    error: String,
  },

  /// An asynchronous listener finished.
  AsyncListenerFinished {
    process_id: String,
    event: String,
    listener: String,
    error: Option<String>,
  },
}

/// Trait for receiving workflow notifications.
///
/// The engine calls `notify` for each notification; implementations decide
/// what to do with them.
pub trait WorkflowNotifier: Send + Sync {
  fn notify(&self, notification: WorkflowNotification);
}

/// A notifier that discards all notifications.
#[derive(Debug, Clone, Default)]
pub struct NoopNotifier;

impl WorkflowNotifier for NoopNotifier {
  fn notify(&self, _notification: WorkflowNotification) {}
}

/// A notifier that forwards notifications to an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
  // Unbounded so a slow consumer never stalls a transition.
  sender: mpsc::UnboundedSender<WorkflowNotification>,
}

impl ChannelNotifier {
  pub fn new(sender: mpsc::UnboundedSender<WorkflowNotification>) -> Self {
    Self { sender }
  }
}

impl WorkflowNotifier for ChannelNotifier {
  fn notify(&self, notification: WorkflowNotification) {
    // Receiver may have been dropped
    let _ = self.sender.send(notification);
  }
}

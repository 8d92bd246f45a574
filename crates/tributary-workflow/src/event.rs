use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tributary_store::ProcessState;

/// Events that drive a process between states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessEvent {
  Create,
  Complete,
  Reject,
  Cancel,
  Terminate,
  Fail,
}

impl ProcessEvent {
  pub const ALL: [ProcessEvent; 6] = [
    ProcessEvent::Create,
    ProcessEvent::Complete,
    ProcessEvent::Reject,
    ProcessEvent::Cancel,
    ProcessEvent::Terminate,
    ProcessEvent::Fail,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      ProcessEvent::Create => "CREATE",
      ProcessEvent::Complete => "COMPLETE",
      ProcessEvent::Reject => "REJECT",
      ProcessEvent::Cancel => "CANCEL",
      ProcessEvent::Terminate => "TERMINATE",
      ProcessEvent::Fail => "FAIL",
    }
  }

  /// The state a process lands in once this event commits.
  pub fn target_state(&self) -> ProcessState {
    match self {
      ProcessEvent::Create => ProcessState::Running,
      ProcessEvent::Complete => ProcessState::Completed,
      ProcessEvent::Reject => ProcessState::Rejected,
      ProcessEvent::Cancel => ProcessState::Cancelled,
      ProcessEvent::Terminate => ProcessState::Terminated,
      ProcessEvent::Fail => ProcessState::Failed,
    }
  }
}

impl fmt::Display for ProcessEvent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for ProcessEvent {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    ProcessEvent::ALL
      .into_iter()
      .find(|event| event.as_str().eq_ignore_ascii_case(s))
      .ok_or_else(|| format!("unknown process event '{}'", s))
  }
}

/// Events emitted for a single task of a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskEvent {
  Create,
  Complete,
  Fail,
}

impl TaskEvent {
  pub fn as_str(&self) -> &'static str {
    match self {
      TaskEvent::Create => "CREATE",
      TaskEvent::Complete => "COMPLETE",
      TaskEvent::Fail => "FAIL",
    }
  }
}

/// The event a listener is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "scope", content = "event", rename_all = "snake_case")]
pub enum WorkflowEvent {
  Process(ProcessEvent),
  Task(TaskEvent),
}

impl fmt::Display for WorkflowEvent {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      WorkflowEvent::Process(event) => f.write_str(event.as_str()),
      WorkflowEvent::Task(event) => write!(f, "TASK_{}", event.as_str()),
    }
  }
}

impl From<ProcessEvent> for WorkflowEvent {
  fn from(event: ProcessEvent) -> Self {
    WorkflowEvent::Process(event)
  }
}

impl From<TaskEvent> for WorkflowEvent {
  fn from(event: TaskEvent) -> Self {
    WorkflowEvent::Task(event)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_every_event_has_a_terminal_target_except_create() {
    for event in ProcessEvent::ALL {
      let terminal = event.target_state().is_terminal();
      assert_eq!(terminal, event != ProcessEvent::Create, "{}", event);
    }
  }

  #[test]
  fn test_parse_is_case_insensitive() {
    assert_eq!("cancel".parse::<ProcessEvent>().unwrap(), ProcessEvent::Cancel);
    assert_eq!("COMPLETE".parse::<ProcessEvent>().unwrap(), ProcessEvent::Complete);
    assert!("approve".parse::<ProcessEvent>().is_err());
  }

  #[test]
  fn test_display_distinguishes_task_events() {
    assert_eq!(WorkflowEvent::from(ProcessEvent::Create).to_string(), "CREATE");
    assert_eq!(WorkflowEvent::from(TaskEvent::Create).to_string(), "TASK_CREATE");
  }
}

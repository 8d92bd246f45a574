use tributary_model::ProcessForm;
use tributary_store::ProcessState;

use crate::event::WorkflowEvent;

/// The task whose listeners are being dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskContext {
  pub task_id: String,
  pub task_name: String,
}

/// State carried across one transition and handed to every listener.
///
/// Listeners may mutate `form`; later listeners of the same synchronous
/// chain observe the change, and the engine writes it back when the
/// transition commits. Asynchronous listeners receive their own clone.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowContext {
  pub process_id: String,
  pub process_name: String,
  /// State before the transition; `None` while the process is being created.
  pub state: Option<ProcessState>,
  pub event: WorkflowEvent,
  pub form: ProcessForm,
  pub current_task: Option<TaskContext>,
}

impl WorkflowContext {
  pub fn new(
    process_id: impl Into<String>,
    process_name: impl Into<String>,
    state: Option<ProcessState>,
    event: impl Into<WorkflowEvent>,
    form: ProcessForm,
  ) -> Self {
    Self {
      process_id: process_id.into(),
      process_name: process_name.into(),
      state,
      event: event.into(),
      form,
      current_task: None,
    }
  }
}

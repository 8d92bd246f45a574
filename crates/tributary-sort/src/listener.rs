use async_trait::async_trait;
use tracing::error;
use tributary_workflow::{Listener, ListenerResult, TaskEvent, WorkflowContext, WorkflowEvent};

use crate::compiler::DataFlowCompiler;
use crate::error::SortError;

/// Task that compiles the sort config of a group.
pub const INIT_SORT_TASK: &str = "init_sort";

/// Compiles the group's data flows when the sort task is created and stores
/// them on the form's group request under the `dataFlow` ext key.
pub struct CreateSortConfigListener {
  compiler: DataFlowCompiler,
}

impl CreateSortConfigListener {
  pub fn new(compiler: DataFlowCompiler) -> Self {
    Self { compiler }
  }
}

#[async_trait]
impl Listener for CreateSortConfigListener {
  fn name(&self) -> &str {
    "create_sort_config"
  }

  fn event(&self) -> WorkflowEvent {
    WorkflowEvent::Task(TaskEvent::Create)
  }

  async fn listen(&self, context: &mut WorkflowContext) -> ListenerResult {
    let form_name = context.form.form_name();
    let Some(group) = context.form.group_request_mut() else {
      let e = SortError::UnsupportedForm {
        form_name: form_name.to_string(),
      };
      error!(process_id = %context.process_id, error = %e, "sort_config_failed");
      return ListenerResult::failure(e.to_string());
    };

    match self.compiler.apply(group).await {
      Ok(_) => ListenerResult::Success,
      Err(e) => {
        error!(
          process_id = %context.process_id,
          group_id = %group.group_id,
          error = %e,
          "sort_config_failed"
        );
        ListenerResult::failure(e.to_string())
      }
    }
  }
}

use async_trait::async_trait;

use crate::context::WorkflowContext;
use crate::event::WorkflowEvent;

/// Outcome of a single listener invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenerResult {
  Success,
  Failure { reason: String },
}

impl ListenerResult {
  pub fn failure(reason: impl Into<String>) -> Self {
    ListenerResult::Failure {
      reason: reason.into(),
    }
  }
}

/// A step of a workflow, bound to one event.
///
/// Synchronous listeners (the default) gate the transition: a failure aborts
/// it. Asynchronous listeners run on the engine's worker pool once the
/// transition has committed and can never change its outcome.
#[async_trait]
pub trait Listener: Send + Sync {
  fn name(&self) -> &str;

  fn event(&self) -> WorkflowEvent;

  fn is_async(&self) -> bool {
    false
  }

  async fn listen(&self, context: &mut WorkflowContext) -> ListenerResult;
}

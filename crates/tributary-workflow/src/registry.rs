use std::collections::HashMap;
use std::sync::Arc;

use crate::event::WorkflowEvent;
use crate::listener::Listener;

/// Listener table keyed by owner and event.
///
/// The owner is a process name for process events and a task name for task
/// events. Listeners are returned in registration order.
#[derive(Default, Clone)]
pub struct ListenerRegistry {
  entries: HashMap<(String, WorkflowEvent), Vec<Arc<dyn Listener>>>,
}

impl ListenerRegistry {
  pub fn new() -> Self {
    Self::default()
  }

  /// Bind a listener to `owner` under the event it declares.
  pub fn register(&mut self, owner: impl Into<String>, listener: Arc<dyn Listener>) {
    let key = (owner.into(), listener.event());
    self.entries.entry(key).or_default().push(listener);
  }

  pub fn listeners(&self, owner: &str, event: WorkflowEvent) -> &[Arc<dyn Listener>] {
    self
      .entries
      .get(&(owner.to_string(), event))
      .map(Vec::as_slice)
      .unwrap_or(&[])
  }
}

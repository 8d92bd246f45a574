use serde::{Deserialize, Serialize};

/// A named process and the tasks it runs on creation, in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessDefinition {
  pub name: String,
  #[serde(default)]
  pub tasks: Vec<String>,
}

impl ProcessDefinition {
  pub fn new(name: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      tasks: Vec::new(),
    }
  }

  pub fn with_task(mut self, task_name: impl Into<String>) -> Self {
    self.tasks.push(task_name.into());
    self
  }
}

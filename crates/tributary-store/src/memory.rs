use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::types::{ProcessRecord, TaskRecord};
use crate::{ProcessStore, StoreError};

/// In-memory store. Data lives as long as the store.
#[derive(Default)]
pub struct MemoryStore {
  processes: RwLock<HashMap<String, ProcessRecord>>,
  tasks: RwLock<Vec<TaskRecord>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl ProcessStore for MemoryStore {
  async fn create_process(
    &self,
    process: &ProcessRecord,
    tasks: &[TaskRecord],
  ) -> Result<(), StoreError> {
    let mut processes = self.processes.write().await;
    let mut stored_tasks = self.tasks.write().await;

    if processes.contains_key(&process.process_id) {
      return Err(StoreError::AlreadyExists(process.process_id.clone()));
    }
    for (i, task) in tasks.iter().enumerate() {
      let duplicate = stored_tasks.iter().any(|t| t.task_id == task.task_id)
        || tasks[..i].iter().any(|t| t.task_id == task.task_id);
      if duplicate {
        return Err(StoreError::AlreadyExists(task.task_id.clone()));
      }
    }

    processes.insert(process.process_id.clone(), process.clone());
    stored_tasks.extend_from_slice(tasks);
    Ok(())
  }

  async fn get_process(&self, process_id: &str) -> Result<ProcessRecord, StoreError> {
    self
      .processes
      .read()
      .await
      .get(process_id)
      .cloned()
      .ok_or_else(|| StoreError::NotFound(process_id.to_string()))
  }

  async fn update_process(&self, process: &ProcessRecord) -> Result<(), StoreError> {
    let mut processes = self.processes.write().await;
    match processes.get_mut(&process.process_id) {
      Some(existing) => {
        *existing = process.clone();
        Ok(())
      }
      None => Err(StoreError::NotFound(process.process_id.clone())),
    }
  }

  async fn list_processes(&self, process_name: &str) -> Result<Vec<ProcessRecord>, StoreError> {
    let mut processes: Vec<ProcessRecord> = self
      .processes
      .read()
      .await
      .values()
      .filter(|p| p.process_name == process_name)
      .cloned()
      .collect();
    processes.sort_by(|a, b| {
      a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.process_id.cmp(&b.process_id))
    });
    Ok(processes)
  }

  async fn list_tasks(&self, process_id: &str) -> Result<Vec<TaskRecord>, StoreError> {
    Ok(
      self
        .tasks
        .read()
        .await
        .iter()
        .filter(|t| t.process_id == process_id)
        .cloned()
        .collect(),
    )
  }
}

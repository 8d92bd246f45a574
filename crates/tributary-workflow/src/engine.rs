//! The process engine.
//!
//! `ProcessEngine` applies events to processes, dispatches the listeners
//! bound to each event and commits the resulting state to the store.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, Semaphore};
use tokio_util::task::TaskTracker;
use tracing::{Instrument, debug, error, info, info_span, instrument, warn};
use tributary_config::EngineConfig;
use tributary_model::ProcessForm;
use tributary_store::{
  AuditEntry, AuditKind, ProcessRecord, ProcessState, ProcessStore, StoreError, TaskRecord,
  TaskStatus,
};

use crate::context::{TaskContext, WorkflowContext};
use crate::definition::ProcessDefinition;
use crate::error::WorkflowError;
use crate::event::{ProcessEvent, TaskEvent, WorkflowEvent};
use crate::events::{NoopNotifier, WorkflowNotification, WorkflowNotifier};
use crate::listener::{Listener, ListenerResult};
use crate::registry::ListenerRegistry;

/// Result of a successful [`ProcessEngine::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
  /// The event committed and the process moved from one state to another.
  Applied { from: ProcessState, to: ProcessState },
  /// The event already produced the current state; nothing changed.
  Unchanged { state: ProcessState },
}

/// One async mutex per process id.
#[derive(Default)]
struct ProcessLocks {
  locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl ProcessLocks {
  fn get(&self, process_id: &str) -> Arc<Mutex<()>> {
    let mut locks = self
      .locks
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    locks.entry(process_id.to_string()).or_default().clone()
  }

  /// Drop the entry for a process that will not transition again.
  ///
  /// The entry stays while anyone besides the caller holds the lock, since
  /// every clone is handed out by `get` under the map lock.
  fn release(&self, process_id: &str, lock: Arc<Mutex<()>>) {
    let mut locks = self
      .locks
      .lock()
      .unwrap_or_else(|poisoned| poisoned.into_inner());
    if let Some(entry) = locks.get(process_id)
      && Arc::ptr_eq(entry, &lock)
      && Arc::strong_count(&lock) == 2
    {
      locks.remove(process_id);
    }
  }
}

/// An asynchronous listener waiting for its transition to commit.
struct PendingListener {
  listener: Arc<dyn Listener>,
  context: WorkflowContext,
}

/// State shared with spawned asynchronous listeners.
struct Shared<N> {
  store: Arc<dyn ProcessStore>,
  notifier: N,
  locks: ProcessLocks,
  listener_timeout: Duration,
}

impl<N: WorkflowNotifier> Shared<N> {
  async fn load(&self, process_id: &str) -> Result<ProcessRecord, WorkflowError> {
    self
      .store
      .get_process(process_id)
      .await
      .map_err(|e| match e {
        StoreError::NotFound(_) => WorkflowError::ProcessNotFound {
          process_id: process_id.to_string(),
        },
        other => WorkflowError::Store(other),
      })
  }

  async fn append_audit(&self, process_id: &str, entry: AuditEntry) -> Result<(), StoreError> {
    let lock = self.locks.get(process_id);
    let guard = lock.lock().await;

    let result = async {
      let mut process = self.store.get_process(process_id).await?;
      process.updated_at = entry.at;
      process.history.push(entry);
      self.store.update_process(&process).await?;
      Ok::<_, StoreError>(process.state)
    }
    .await;

    drop(guard);
    if let Ok(state) = &result
      && state.is_terminal()
    {
      self.locks.release(process_id, lock);
    }
    result.map(|_| ())
  }

  async fn record_async_outcome(
    &self,
    context: &WorkflowContext,
    listener: &str,
    outcome: Result<(), WorkflowError>,
  ) {
    let event = context.event.to_string();
    let (kind, failure) = match outcome {
      Ok(()) => {
        info!(
          process_id = %context.process_id,
          listener = %listener,
          event = %event,
          "async_listener_succeeded"
        );
        (
          AuditKind::AsyncListenerSucceeded {
            listener: listener.to_string(),
          },
          None,
        )
      }
      Err(e) => {
        let reason = e
          .listener_failure()
          .map(|(_, reason)| reason)
          .unwrap_or_else(|| e.to_string());
        error!(
          process_id = %context.process_id,
          listener = %listener,
          event = %event,
          reason = %reason,
          "async_listener_failed"
        );
        (
          AuditKind::AsyncListenerFailed {
            listener: listener.to_string(),
            reason: reason.clone(),
          },
          Some(reason),
        )
      }
    };

    let entry = AuditEntry {
      at: Utc::now(),
      event: event.clone(),
      kind,
    };
    if let Err(e) = self.append_audit(&context.process_id, entry).await {
      error!(
        process_id = %context.process_id,
        listener = %listener,
        error = %e,
        "audit_write_failed"
      );
    }

    self.notifier.notify(WorkflowNotification::AsyncListenerFinished {
      process_id: context.process_id.clone(),
      event,
      listener: listener.to_string(),
      error: failure,
    });
  }
}

/// Run one listener under the dispatch timeout.
async fn invoke(
  listener: &dyn Listener,
  context: &mut WorkflowContext,
  limit: Duration,
) -> Result<(), WorkflowError> {
  match tokio::time::timeout(limit, listener.listen(context)).await {
    Ok(ListenerResult::Success) => Ok(()),
    Ok(ListenerResult::Failure { reason }) => Err(WorkflowError::ListenerFailed {
      listener: listener.name().to_string(),
      reason,
    }),
    Err(_) => Err(WorkflowError::ListenerTimeout {
      listener: listener.name().to_string(),
      timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
    }),
  }
}

/// The process state machine.
///
/// Generic over `N: WorkflowNotifier` to allow different notification strategies.
/// Use `ProcessEngine::new()` for an engine with no-op notifications, or
/// `ProcessEngine::with_notifier()` to observe what the engine does.
///
/// Definitions and listeners are registered up front; the engine is then
/// typically shared behind an `Arc`.
pub struct ProcessEngine<N: WorkflowNotifier = NoopNotifier> {
  shared: Arc<Shared<N>>,
  registry: ListenerRegistry,
  definitions: HashMap<String, ProcessDefinition>,
  tracker: TaskTracker,
  workers: Arc<Semaphore>,
  idle: Mutex<()>,
}

impl ProcessEngine<NoopNotifier> {
  pub fn new(store: Arc<dyn ProcessStore>, config: &EngineConfig) -> Self {
    Self::with_notifier(store, config, NoopNotifier)
  }
}

impl<N: WorkflowNotifier + 'static> ProcessEngine<N> {
  pub fn with_notifier(store: Arc<dyn ProcessStore>, config: &EngineConfig, notifier: N) -> Self {
    Self {
      shared: Arc::new(Shared {
        store,
        notifier,
        locks: ProcessLocks::default(),
        listener_timeout: config.listener_timeout(),
      }),
      registry: ListenerRegistry::new(),
      definitions: HashMap::new(),
      tracker: TaskTracker::new(),
      workers: Arc::new(Semaphore::new(config.async_workers.max(1))),
      idle: Mutex::new(()),
    }
  }

  pub fn register_definition(&mut self, definition: ProcessDefinition) {
    self.definitions.insert(definition.name.clone(), definition);
  }

  /// Bind a listener to a process name (process events) or task name (task events).
  pub fn register_listener(&mut self, owner: impl Into<String>, listener: Arc<dyn Listener>) {
    self.registry.register(owner, listener);
  }

  /// Create a process by applying CREATE, then run the definition's tasks.
  ///
  /// Nothing is persisted unless every synchronous listener succeeds.
  #[instrument(name = "process_start", skip_all, fields(process_name = %process_name))]
  pub async fn start(
    &self,
    process_name: &str,
    form: ProcessForm,
  ) -> Result<ProcessRecord, WorkflowError> {
    let definition =
      self
        .definitions
        .get(process_name)
        .ok_or_else(|| WorkflowError::UnknownProcess {
          process_name: process_name.to_string(),
        })?;

    let event = ProcessEvent::Create;
    let process_id = uuid::Uuid::new_v4().to_string();
    let mut context = WorkflowContext::new(&process_id, process_name, None, event, form);

    info!(
      process_id = %process_id,
      form = %context.form.form_name(),
      tasks = definition.tasks.len(),
      "process_creating"
    );

    let mut pending = match self.dispatch(process_name, &mut context).await {
      Ok(pending) => pending,
      Err(e) => {
        self.aborted(&process_id, event.into(), &e);
        return Err(e);
      }
    };

    let mut tasks = Vec::with_capacity(definition.tasks.len());
    for task_name in &definition.tasks {
      match self.run_task(&mut context, task_name).await {
        Ok((task, task_pending)) => {
          tasks.push(task);
          pending.extend(task_pending);
        }
        Err(e) => {
          self.aborted(&process_id, event.into(), &e);
          return Err(e);
        }
      }
    }

    let now = Utc::now();
    let to = event.target_state();
    let process = ProcessRecord {
      process_id: process_id.clone(),
      process_name: process_name.to_string(),
      state: to,
      form: context.form,
      history: vec![AuditEntry {
        at: now,
        event: event.as_str().to_string(),
        kind: AuditKind::Applied { from: None, to },
      }],
      created_at: now,
      updated_at: now,
    };

    self.shared.store.create_process(&process, &tasks).await?;

    info!(
      process_id = %process_id,
      state = %to,
      "transition_committed"
    );
    self
      .shared
      .notifier
      .notify(WorkflowNotification::ProcessStarted {
        process_id: process_id.clone(),
        process_name: process_name.to_string(),
      });
    self
      .shared
      .notifier
      .notify(WorkflowNotification::TransitionApplied {
        process_id,
        event: event.as_str().to_string(),
        from: None,
        to,
      });

    self.spawn_async(pending);
    Ok(process)
  }

  /// Apply an event to an existing process.
  #[instrument(name = "process_submit", skip_all, fields(process_id = %process_id, event = %event))]
  pub async fn submit(
    &self,
    process_id: &str,
    event: ProcessEvent,
  ) -> Result<TransitionOutcome, WorkflowError> {
    let lock = self.shared.locks.get(process_id);
    let guard = lock.lock().await;

    let result = self.submit_locked(process_id, event).await;

    drop(guard);
    let settled = match &result {
      Ok(TransitionOutcome::Applied { to, .. }) => to.is_terminal(),
      Ok(TransitionOutcome::Unchanged { state }) => state.is_terminal(),
      Err(WorkflowError::ProcessTerminated { .. }) => true,
      Err(_) => false,
    };
    if settled {
      self.shared.locks.release(process_id, lock);
    }
    result
  }

  /// The body of [`submit`](Self::submit), run while the process lock is held.
  async fn submit_locked(
    &self,
    process_id: &str,
    event: ProcessEvent,
  ) -> Result<TransitionOutcome, WorkflowError> {
    let mut process = self.shared.load(process_id).await?;

    if process.last_applied_event() == Some(event.as_str()) {
      debug!(state = %process.state, "event_already_applied");
      return Ok(TransitionOutcome::Unchanged {
        state: process.state,
      });
    }

    if process.state.is_terminal() {
      warn!(state = %process.state, "process_terminated");
      return Err(WorkflowError::ProcessTerminated {
        process_id: process_id.to_string(),
        state: process.state,
      });
    }

    if event == ProcessEvent::Create {
      return Err(WorkflowError::InvalidTransition {
        process_id: process_id.to_string(),
        event,
        state: process.state,
      });
    }

    let mut context = WorkflowContext::new(
      &process.process_id,
      &process.process_name,
      Some(process.state),
      event,
      process.form.clone(),
    );

    let pending = match self.dispatch(&process.process_name, &mut context).await {
      Ok(pending) => pending,
      Err(e) => {
        self.aborted(process_id, event.into(), &e);
        return Err(e);
      }
    };

    let from = process.state;
    let to = event.target_state();
    let now = Utc::now();
    process.state = to;
    process.form = context.form;
    process.updated_at = now;
    process.history.push(AuditEntry {
      at: now,
      event: event.as_str().to_string(),
      kind: AuditKind::Applied {
        from: Some(from),
        to,
      },
    });
    self.shared.store.update_process(&process).await?;

    info!(from = %from, to = %to, "transition_committed");
    self
      .shared
      .notifier
      .notify(WorkflowNotification::TransitionApplied {
        process_id: process_id.to_string(),
        event: event.as_str().to_string(),
        from: Some(from),
        to,
      });

    self.spawn_async(pending);
    Ok(TransitionOutcome::Applied { from, to })
  }

  pub async fn get(&self, process_id: &str) -> Result<ProcessRecord, WorkflowError> {
    self.shared.load(process_id).await
  }

  pub async fn tasks(&self, process_id: &str) -> Result<Vec<TaskRecord>, WorkflowError> {
    self.shared.load(process_id).await?;
    Ok(self.shared.store.list_tasks(process_id).await?)
  }

  /// Processes created from a definition, oldest first.
  pub async fn list(&self, process_name: &str) -> Result<Vec<ProcessRecord>, WorkflowError> {
    Ok(self.shared.store.list_processes(process_name).await?)
  }

  /// Wait until every asynchronous listener dispatched so far has finished.
  ///
  /// Concurrent callers wait one after another, so the tracker is never
  /// reopened underneath a caller that is still waiting.
  pub async fn wait_idle(&self) {
    let _idle = self.idle.lock().await;
    self.tracker.close();
    self.tracker.wait().await;
    self.tracker.reopen();
  }

  /// Run the listeners bound to `owner` for the context's event, in order.
  ///
  /// Synchronous listeners run here and the first failure is returned.
  /// Asynchronous listeners are handed back with a snapshot of the context
  /// as it was at their position in the chain.
  async fn dispatch(
    &self,
    owner: &str,
    context: &mut WorkflowContext,
  ) -> Result<Vec<PendingListener>, WorkflowError> {
    let mut pending = Vec::new();

    for listener in self.registry.listeners(owner, context.event) {
      if listener.is_async() {
        pending.push(PendingListener {
          listener: listener.clone(),
          context: context.clone(),
        });
        continue;
      }

      invoke(listener.as_ref(), context, self.shared.listener_timeout).await?;
      debug!(
        process_id = %context.process_id,
        listener = %listener.name(),
        event = %context.event,
        "listener_succeeded"
      );
    }

    Ok(pending)
  }

  /// Run a task's CREATE and COMPLETE listeners, or its FAIL listeners when
  /// one of those fails.
  async fn run_task(
    &self,
    context: &mut WorkflowContext,
    task_name: &str,
  ) -> Result<(TaskRecord, Vec<PendingListener>), WorkflowError> {
    let mut task = TaskRecord {
      task_id: uuid::Uuid::new_v4().to_string(),
      process_id: context.process_id.clone(),
      task_name: task_name.to_string(),
      status: TaskStatus::Running,
      created_at: Utc::now(),
      completed_at: None,
      error: None,
    };

    let process_event = context.event;
    context.current_task = Some(TaskContext {
      task_id: task.task_id.clone(),
      task_name: task.task_name.clone(),
    });

    let outcome = match self.run_task_listeners(task_name, context).await {
      Ok(pending) => {
        task.status = TaskStatus::Completed;
        task.completed_at = Some(Utc::now());
        info!(
          process_id = %task.process_id,
          task_id = %task.task_id,
          task_name = %task.task_name,
          "task_completed"
        );
        self
          .shared
          .notifier
          .notify(WorkflowNotification::TaskCompleted {
            process_id: task.process_id.clone(),
            task_id: task.task_id.clone(),
            task_name: task.task_name.clone(),
          });
        Ok((task, pending))
      }
      Err(e) => {
        task.status = TaskStatus::Failed;
        task.error = Some(e.to_string());
        error!(
          process_id = %task.process_id,
          task_id = %task.task_id,
          task_name = %task.task_name,
          error = %e,
          "task_failed"
        );
        context.event = TaskEvent::Fail.into();
        self.notify_task_failed(task_name, context).await;
        self.shared.notifier.notify(WorkflowNotification::TaskFailed {
          process_id: task.process_id.clone(),
          task_id: task.task_id.clone(),
          task_name: task.task_name.clone(),
          error: e.to_string(),
        });
        Err(e)
      }
    };

    context.event = process_event;
    context.current_task = None;
    outcome
  }

  async fn run_task_listeners(
    &self,
    task_name: &str,
    context: &mut WorkflowContext,
  ) -> Result<Vec<PendingListener>, WorkflowError> {
    let mut pending = Vec::new();
    for event in [TaskEvent::Create, TaskEvent::Complete] {
      context.event = event.into();
      pending.extend(self.dispatch(task_name, context).await?);
    }
    Ok(pending)
  }

  /// FAIL listeners are notifications; their results are only logged.
  async fn notify_task_failed(&self, task_name: &str, context: &mut WorkflowContext) {
    for listener in self.registry.listeners(task_name, context.event) {
      if let Err(e) = invoke(listener.as_ref(), context, self.shared.listener_timeout).await {
        warn!(
          process_id = %context.process_id,
          listener = %listener.name(),
          error = %e,
          "fail_listener_failed"
        );
      }
    }
  }

  fn aborted(&self, process_id: &str, event: WorkflowEvent, error: &WorkflowError) {
    let Some((listener, reason)) = error.listener_failure() else {
      return;
    };
    warn!(
      process_id = %process_id,
      event = %event,
      listener = %listener,
      reason = %reason,
      "transition_aborted"
    );
    self
      .shared
      .notifier
      .notify(WorkflowNotification::TransitionAborted {
        process_id: process_id.to_string(),
        event: event.to_string(),
        listener: listener.to_string(),
        reason,
      });
  }

  fn spawn_async(&self, pending: Vec<PendingListener>) {
    for PendingListener {
      listener,
      mut context,
    } in pending
    {
      let shared = self.shared.clone();
      let workers = self.workers.clone();
      let span = info_span!(
        "async_listener",
        process_id = %context.process_id,
        listener = %listener.name(),
      );

      self.tracker.spawn(
        async move {
          // The semaphore is never closed.
          let Ok(_permit) = workers.acquire_owned().await else {
            return;
          };
          let outcome = invoke(listener.as_ref(), &mut context, shared.listener_timeout).await;
          shared
            .record_async_outcome(&context, listener.name(), outcome)
            .await;
        }
        .instrument(span),
      );
    }
  }
}

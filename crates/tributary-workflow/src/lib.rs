//! Tributary Workflow
//!
//! This crate provides the process/task state machine and the listener
//! dispatch protocol.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ProcessRunner                          │
//! │  - owns mpsc channel of ProcessCommand                      │
//! │  - start(cancel) applies commands in arrival order          │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      ProcessEngine                          │
//! │  - start(name, form) / submit(process_id, event)            │
//! │  - per-process lock, sync listener chain, commit to store   │
//! │  - async listeners on a bounded worker pool                 │
//! └─────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    ListenerRegistry                         │
//! │  - (owner, event) → listeners in registration order         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! A process moves from RUNNING to one terminal state. Synchronous listeners
//! gate each transition: the first failure aborts it and leaves the stored
//! process untouched. Asynchronous listeners run after the commit and their
//! outcomes are appended to the process history.
//!
//! # Usage
//!
//! ```ignore
//! let mut engine = ProcessEngine::new(store, &config.engine);
//! engine.register_definition(ProcessDefinition::new("create_group_resource").with_task("init_sort"));
//! engine.register_listener("init_sort", Arc::new(listener));
//!
//! let process = engine.start("create_group_resource", form).await?;
//! engine.submit(&process.process_id, ProcessEvent::Complete).await?;
//! ```

mod context;
mod definition;
mod engine;
mod error;
mod event;
mod events;
mod listener;
mod registry;
mod runner;

pub use context::{TaskContext, WorkflowContext};
pub use definition::ProcessDefinition;
pub use engine::{ProcessEngine, TransitionOutcome};
pub use error::WorkflowError;
pub use event::{ProcessEvent, TaskEvent, WorkflowEvent};
pub use events::{ChannelNotifier, NoopNotifier, WorkflowNotification, WorkflowNotifier};
pub use listener::{Listener, ListenerResult};
pub use registry::ListenerRegistry;
pub use runner::{ProcessCommand, ProcessRunner};

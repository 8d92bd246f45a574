//! Process runner with channel-based event submission.
//!
//! The `ProcessRunner` owns an mpsc channel of [`ProcessCommand`]s and applies
//! each one to the engine in arrival order.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::engine::{ProcessEngine, TransitionOutcome};
use crate::error::WorkflowError;
use crate::event::ProcessEvent;
use crate::events::WorkflowNotifier;

/// An event to apply to a process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessCommand {
  pub process_id: String,
  pub event: ProcessEvent,
}

impl ProcessCommand {
  pub fn new(process_id: impl Into<String>, event: ProcessEvent) -> Self {
    Self {
      process_id: process_id.into(),
      event,
    }
  }
}

/// Applies commands received over a channel to a process engine.
///
/// # Usage
///
/// ```ignore
/// let runner = ProcessRunner::new(engine);
///
/// // Hand the sender to whatever produces approvals, cancellations, etc.
/// let sender = runner.sender();
///
/// let cancel = CancellationToken::new();
/// runner.start(cancel).await;
/// ```
pub struct ProcessRunner<N: WorkflowNotifier + 'static> {
  sender: mpsc::Sender<ProcessCommand>,
  receiver: mpsc::Receiver<ProcessCommand>,
  engine: Arc<ProcessEngine<N>>,
}

impl<N: WorkflowNotifier + 'static> ProcessRunner<N> {
  pub fn new(engine: Arc<ProcessEngine<N>>) -> Self {
    Self::with_buffer_size(engine, 100)
  }

  pub fn with_buffer_size(engine: Arc<ProcessEngine<N>>, buffer_size: usize) -> Self {
    let (sender, receiver) = mpsc::channel(buffer_size);
    Self {
      sender,
      receiver,
      engine,
    }
  }

  pub fn sender(&self) -> mpsc::Sender<ProcessCommand> {
    self.sender.clone()
  }

  /// Queue a command through the runner's own channel.
  pub async fn send(&self, command: ProcessCommand) -> Result<(), WorkflowError> {
    self
      .sender
      .send(command)
      .await
      .map_err(|_| WorkflowError::RunnerClosed)
  }

  pub fn engine(&self) -> &ProcessEngine<N> {
    &self.engine
  }

  /// Run the command loop until the token is cancelled or every sender is gone.
  ///
  /// Command failures are logged; they never stop the loop.
  pub async fn start(self, cancel: CancellationToken) {
    let Self {
      sender,
      mut receiver,
      engine,
    } = self;
    // Only external senders keep the channel open.
    drop(sender);

    info!("process_runner_started");

    loop {
      tokio::select! {
        _ = cancel.cancelled() => {
          info!("process_runner_cancelled");
          break;
        }
        command = receiver.recv() => {
          let Some(command) = command else {
            info!("process_runner_channel_closed");
            break;
          };

          match engine.submit(&command.process_id, command.event).await {
            Ok(TransitionOutcome::Applied { from, to }) => {
              info!(
                process_id = %command.process_id,
                event = %command.event,
                from = %from,
                to = %to,
                "command_applied"
              );
            }
            Ok(TransitionOutcome::Unchanged { state }) => {
              info!(
                process_id = %command.process_id,
                event = %command.event,
                state = %state,
                "command_unchanged"
              );
            }
            Err(e) => {
              error!(
                process_id = %command.process_id,
                event = %command.event,
                error = %e,
                "command_failed"
              );
            }
          }
        }
      }
    }
  }
}

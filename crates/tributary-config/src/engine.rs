use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Tuning for the process engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
  /// Upper bound for a single listener invocation, in milliseconds.
  pub listener_timeout_ms: u64,

  /// Maximum number of asynchronous listeners running at once.
  pub async_workers: usize,
}

impl Default for EngineConfig {
  fn default() -> Self {
    Self {
      listener_timeout_ms: 30_000,
      async_workers: 4,
    }
  }
}

impl EngineConfig {
  pub fn listener_timeout(&self) -> Duration {
    Duration::from_millis(self.listener_timeout_ms)
  }
}

//! Tributary Config
//!
//! This crate contains the serializable configuration types for tributary.
//! Configuration is loaded once at startup and passed explicitly into the
//! components that need it:
//!
//! - [`ClusterConfig`] is injected into the sort compiler (broker addresses,
//!   application name used to build consumer groups).
//! - [`EngineConfig`] tunes the process engine (listener timeout, async
//!   worker pool size).
//!
//! Configuration can be loaded from a JSON file via [`TributaryConfig::from_file`].
//! Every field has a default, so an empty object is a valid configuration.

mod cluster;
mod engine;
mod error;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use cluster::ClusterConfig;
pub use engine::EngineConfig;
pub use error::ConfigError;

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TributaryConfig {
  pub cluster: ClusterConfig,
  pub engine: EngineConfig,
}

impl TributaryConfig {
  /// Load configuration from a JSON file.
  pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;
    Self::from_json(&content)
  }

  /// Parse configuration from a JSON string.
  pub fn from_json(content: &str) -> Result<Self, ConfigError> {
    Ok(serde_json::from_str(content)?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_object_uses_defaults() {
    let config = TributaryConfig::from_json("{}").unwrap();
    assert_eq!(config, TributaryConfig::default());
    assert_eq!(config.cluster.app_name, "tributary");
    assert_eq!(config.engine.listener_timeout_ms, 30_000);
  }

  #[test]
  fn test_partial_cluster_section() {
    let config = TributaryConfig::from_json(
      r#"{ "cluster": { "app_name": "sort-a", "tube_master": "127.0.0.1:8715" } }"#,
    )
    .unwrap();

    assert_eq!(config.cluster.app_name, "sort-a");
    assert_eq!(config.cluster.tube_master, "127.0.0.1:8715");
    assert_eq!(config.cluster.default_tenant, "public");
    assert_eq!(config.engine, EngineConfig::default());
  }

  #[test]
  fn test_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tributary.json");
    std::fs::write(&path, r#"{ "engine": { "async_workers": 9 } }"#).unwrap();

    let config = TributaryConfig::from_file(&path).unwrap();
    assert_eq!(config.engine.async_workers, 9);
  }

  #[test]
  fn test_from_missing_file() {
    let err = TributaryConfig::from_file("/definitely/not/here.json").unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
  }

  #[test]
  fn test_invalid_json() {
    let err = TributaryConfig::from_json("{ nope").unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
  }
}

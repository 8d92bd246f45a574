use thiserror::Error;
use tributary_model::SinkType;

/// Errors that can occur when reading the catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
  /// Stream not found in the catalog.
  #[error("stream not found: {group_id}/{stream_id}")]
  StreamNotFound { group_id: String, stream_id: String },

  /// Sink not found, or found with a different type.
  #[error("sink not found: id={sink_id}, type={sink_type}")]
  SinkNotFound { sink_id: i32, sink_type: SinkType },

  /// IO error when reading/writing record files.
  #[error("io error: {0}")]
  Io(#[from] std::io::Error),

  /// Failed to parse a record file.
  #[error("invalid record: {0}")]
  InvalidRecord(#[from] serde_json::Error),
}

impl CatalogError {
  /// Whether the requested record is absent, as opposed to the catalog itself failing.
  pub fn is_not_found(&self) -> bool {
    matches!(
      self,
      CatalogError::StreamNotFound { .. } | CatalogError::SinkNotFound { .. }
    )
  }
}

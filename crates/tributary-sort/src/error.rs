//! Error types for sort config compilation.

use thiserror::Error;
use tributary_catalog::CatalogError;

/// Errors raised while compiling data flows.
///
/// Some errors only disqualify one stream; the rest abort the whole group.
/// See [`SortError::is_stream_scoped`].
#[derive(Debug, Error)]
pub enum SortError {
  /// The process form carries no group request.
  #[error("form '{form_name}' carries no group request")]
  UnsupportedForm { form_name: String },

  /// The stream has no sink attached.
  #[error("stream '{stream_id}' has no sink")]
  NoSinkFound { stream_id: String },

  /// The group's middleware type cannot be read by the sort engine.
  #[error("unsupported middleware type '{middleware_type}'")]
  UnsupportedMiddleware { middleware_type: String },

  /// A cluster setting the middleware requires is empty.
  #[error("missing cluster config '{key}'")]
  MissingClusterConfig { key: &'static str },

  /// A field type has no known format.
  #[error("unknown field format '{field_type}'")]
  UnknownFieldFormat { field_type: String },

  /// The stream's data separator is neither a character code nor a single character.
  #[error("invalid delimiter '{value}' for stream '{stream_id}'")]
  InvalidDelimiter { stream_id: String, value: String },

  /// The catalog failed. `stream_id` is set when the lookup was made for
  /// one stream; only a missing record is scoped to that stream.
  #[error("catalog error{}: {source}", for_stream(.stream_id))]
  Catalog {
    stream_id: Option<String>,
    #[source]
    source: CatalogError,
  },

  /// The compiled flows could not be serialized.
  #[error("failed to serialize data flows: {0}")]
  Serialization(#[from] serde_json::Error),
}

fn for_stream(stream_id: &Option<String>) -> String {
  stream_id
    .as_ref()
    .map(|id| format!(" for stream '{}'", id))
    .unwrap_or_default()
}

impl SortError {
  /// Whether the error disqualifies only the stream it was raised for.
  pub fn is_stream_scoped(&self) -> bool {
    match self {
      SortError::NoSinkFound { .. }
      | SortError::UnknownFieldFormat { .. }
      | SortError::InvalidDelimiter { .. } => true,
      SortError::Catalog { stream_id, source } => stream_id.is_some() && source.is_not_found(),
      SortError::UnsupportedForm { .. }
      | SortError::UnsupportedMiddleware { .. }
      | SortError::MissingClusterConfig { .. }
      | SortError::Serialization(_) => false,
    }
  }
}

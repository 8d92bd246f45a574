use serde::{Deserialize, Serialize};

/// How the sort engine decodes raw messages read from a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DeserializationInfo {
  /// Delimited text wrapped in the message envelope; `tid` is the stream id.
  MessageCsv { tid: String, delimiter: char },
}

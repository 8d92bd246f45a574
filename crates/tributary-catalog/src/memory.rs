use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tributary_model::{SinkBrief, SinkRecord, SinkType, StreamBrief, StreamInfo};

use crate::StreamCatalog;
use crate::error::CatalogError;

/// In-memory catalog.
///
/// Streams are listed in insertion order, and so are the sinks of each stream.
/// Useful for tests, or for loading a whole catalog snapshot from one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemoryCatalog {
  #[serde(default)]
  streams: Vec<StreamInfo>,
  #[serde(default)]
  sinks: Vec<SinkRecord>,
}

impl MemoryCatalog {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_stream(mut self, stream: StreamInfo) -> Self {
    self.streams.push(stream);
    self
  }

  pub fn with_sink(mut self, sink: SinkRecord) -> Self {
    self.sinks.push(sink);
    self
  }

  fn sink_briefs(&self, group_id: &str, stream_id: &str) -> Vec<SinkBrief> {
    self
      .sinks
      .iter()
      .filter(|sink| sink.group_id == group_id && sink.stream_id == stream_id)
      .map(|sink| SinkBrief {
        id: sink.id,
        sink_type: sink.sink_type(),
        sink_name: sink.sink_name.clone(),
      })
      .collect()
  }
}

#[async_trait]
impl StreamCatalog for MemoryCatalog {
  async fn list_streams(&self, group_id: &str) -> Result<Vec<StreamBrief>, CatalogError> {
    Ok(
      self
        .streams
        .iter()
        .filter(|stream| stream.group_id == group_id)
        .map(|stream| StreamBrief {
          group_id: stream.group_id.clone(),
          stream_id: stream.stream_id.clone(),
          name: stream.name.clone(),
          sink_list: self.sink_briefs(&stream.group_id, &stream.stream_id),
        })
        .collect(),
    )
  }

  async fn get_stream(&self, group_id: &str, stream_id: &str) -> Result<StreamInfo, CatalogError> {
    self
      .streams
      .iter()
      .find(|stream| stream.group_id == group_id && stream.stream_id == stream_id)
      .cloned()
      .ok_or_else(|| CatalogError::StreamNotFound {
        group_id: group_id.to_string(),
        stream_id: stream_id.to_string(),
      })
  }

  async fn get_sink(&self, sink_id: i32, sink_type: SinkType) -> Result<SinkRecord, CatalogError> {
    self
      .sinks
      .iter()
      .find(|sink| sink.id == sink_id && sink.sink_type() == sink_type)
      .cloned()
      .ok_or(CatalogError::SinkNotFound { sink_id, sink_type })
  }
}

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::fs;
use tributary_model::{SinkBrief, SinkRecord, SinkType, StreamBrief, StreamInfo};

use crate::StreamCatalog;
use crate::error::CatalogError;

/// Filesystem-based catalog.
///
/// Records are stored as JSON files:
/// ```text
/// {root}/
/// ├── streams/
/// │   └── my-group/
/// │       └── my-stream.json         (StreamInfo)
/// └── sinks/
///     └── 42.json                    (SinkRecord)
/// ```
///
/// Streams are listed sorted by stream id, sinks sorted by sink id.
pub struct FsCatalog {
  root: PathBuf,
}

impl FsCatalog {
  /// Create a new filesystem catalog at the given root path.
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  fn streams_dir(&self) -> PathBuf {
    self.root.join("streams")
  }

  fn sinks_dir(&self) -> PathBuf {
    self.root.join("sinks")
  }

  fn group_dir(&self, group_id: &str) -> PathBuf {
    self.streams_dir().join(group_id)
  }

  fn stream_path(&self, group_id: &str, stream_id: &str) -> PathBuf {
    self.group_dir(group_id).join(format!("{}.json", stream_id))
  }

  /// Write a stream record, replacing any previous version.
  pub async fn put_stream(&self, stream: &StreamInfo) -> Result<(), CatalogError> {
    fs::create_dir_all(self.group_dir(&stream.group_id)).await?;
    let path = self.stream_path(&stream.group_id, &stream.stream_id);
    fs::write(path, serde_json::to_vec_pretty(stream)?).await?;
    Ok(())
  }

  /// Write a sink record, replacing any previous version.
  pub async fn put_sink(&self, sink: &SinkRecord) -> Result<(), CatalogError> {
    fs::create_dir_all(self.sinks_dir()).await?;
    let path = self.sinks_dir().join(format!("{}.json", sink.id));
    fs::write(path, serde_json::to_vec_pretty(sink)?).await?;
    Ok(())
  }

  /// Read all sinks of a stream.
  async fn sink_briefs(
    &self,
    group_id: &str,
    stream_id: &str,
  ) -> Result<Vec<SinkBrief>, CatalogError> {
    let dir = self.sinks_dir();
    if !dir.exists() {
      return Ok(Vec::new());
    }

    let mut briefs = Vec::new();
    let mut entries = fs::read_dir(&dir).await?;
    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      if path.extension().and_then(|e| e.to_str()) != Some("json") {
        continue;
      }

      let sink: SinkRecord = read_record(&path).await?;
      if sink.group_id == group_id && sink.stream_id == stream_id {
        briefs.push(SinkBrief {
          id: sink.id,
          sink_type: sink.sink_type(),
          sink_name: sink.sink_name,
        });
      }
    }

    briefs.sort_by_key(|brief| brief.id);
    Ok(briefs)
  }
}

#[async_trait]
impl StreamCatalog for FsCatalog {
  async fn list_streams(&self, group_id: &str) -> Result<Vec<StreamBrief>, CatalogError> {
    let dir = self.group_dir(group_id);
    if !dir.exists() {
      return Ok(Vec::new());
    }

    let mut stream_ids = Vec::new();
    let mut entries = fs::read_dir(&dir).await?;
    while let Some(entry) = entries.next_entry().await? {
      let path = entry.path();
      if path.extension().and_then(|e| e.to_str()) != Some("json") {
        continue;
      }
      if let Some(stream_id) = path.file_stem().and_then(|s| s.to_str()) {
        stream_ids.push(stream_id.to_string());
      }
    }
    stream_ids.sort();

    let mut briefs = Vec::with_capacity(stream_ids.len());
    for stream_id in stream_ids {
      let stream = self.get_stream(group_id, &stream_id).await?;
      briefs.push(StreamBrief {
        sink_list: self.sink_briefs(group_id, &stream_id).await?,
        group_id: stream.group_id,
        stream_id: stream.stream_id,
        name: stream.name,
      });
    }

    Ok(briefs)
  }

  async fn get_stream(&self, group_id: &str, stream_id: &str) -> Result<StreamInfo, CatalogError> {
    let path = self.stream_path(group_id, stream_id);
    if !path.exists() {
      return Err(CatalogError::StreamNotFound {
        group_id: group_id.to_string(),
        stream_id: stream_id.to_string(),
      });
    }
    read_record(&path).await
  }

  async fn get_sink(&self, sink_id: i32, sink_type: SinkType) -> Result<SinkRecord, CatalogError> {
    let path = self.sinks_dir().join(format!("{}.json", sink_id));
    if !path.exists() {
      return Err(CatalogError::SinkNotFound { sink_id, sink_type });
    }

    let sink: SinkRecord = read_record(&path).await?;
    if sink.sink_type() != sink_type {
      return Err(CatalogError::SinkNotFound { sink_id, sink_type });
    }
    Ok(sink)
  }
}

async fn read_record<T: DeserializeOwned>(path: &Path) -> Result<T, CatalogError> {
  let content = fs::read_to_string(path).await?;
  Ok(serde_json::from_str(&content)?)
}

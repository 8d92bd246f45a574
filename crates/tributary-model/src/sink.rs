use std::fmt;

use serde::{Deserialize, Serialize};

/// Storage kind a stream is sunk into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SinkType {
  Hive,
  Es,
  Kafka,
}

impl SinkType {
  pub fn as_str(&self) -> &'static str {
    match self {
      SinkType::Hive => "HIVE",
      SinkType::Es => "ES",
      SinkType::Kafka => "KAFKA",
    }
  }
}

impl fmt::Display for SinkType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Summary of a sink attached to a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkBrief {
  pub id: i32,
  pub sink_type: SinkType,
  #[serde(default)]
  pub sink_name: String,
}

/// Full sink record, looked up by id and type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinkRecord {
  pub id: i32,
  pub group_id: String,
  pub stream_id: String,
  #[serde(default)]
  pub sink_name: String,
  #[serde(default)]
  pub fields: Vec<SinkField>,
  #[serde(flatten)]
  pub detail: SinkDetail,
}

impl SinkRecord {
  pub fn sink_type(&self) -> SinkType {
    match self.detail {
      SinkDetail::Hive(_) => SinkType::Hive,
      SinkDetail::Es(_) => SinkType::Es,
      SinkDetail::Kafka(_) => SinkType::Kafka,
    }
  }
}

/// Type-specific sink settings, tagged by `sink_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "sink_type", rename_all = "UPPERCASE")]
pub enum SinkDetail {
  Hive(HiveSink),
  Es(EsSink),
  Kafka(KafkaSink),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiveSink {
  pub jdbc_url: String,
  pub db_name: String,
  pub table_name: String,
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
  /// HDFS location of the table data.
  #[serde(default)]
  pub data_path: String,
  #[serde(default = "default_file_format")]
  pub file_format: String,
  #[serde(default)]
  pub partition_fields: Vec<String>,
}

fn default_file_format() -> String {
  "TextFile".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EsSink {
  pub hosts: String,
  pub index_name: String,
  #[serde(default)]
  pub username: String,
  #[serde(default)]
  pub password: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafkaSink {
  /// Bootstrap servers.
  pub address: String,
  pub topic_name: String,
  #[serde(default = "default_serialization_type")]
  pub serialization_type: String,
}

fn default_serialization_type() -> String {
  "json".to_string()
}

/// A column of the sink, mapped from a stream field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkField {
  pub field_name: String,
  pub field_type: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_field_name: Option<String>,
}

impl SinkField {
  pub fn new(field_name: impl Into<String>, field_type: impl Into<String>) -> Self {
    Self {
      field_name: field_name.into(),
      field_type: field_type.into(),
      source_field_name: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_sink_record_tagged_by_sink_type() {
    let record: SinkRecord = serde_json::from_value(json!({
      "id": 7,
      "group_id": "g1",
      "stream_id": "s1",
      "sink_type": "KAFKA",
      "address": "127.0.0.1:9092",
      "topic_name": "out",
      "fields": [{ "field_name": "id", "field_type": "int" }]
    }))
    .unwrap();

    assert_eq!(record.sink_type(), SinkType::Kafka);
    match &record.detail {
      SinkDetail::Kafka(kafka) => {
        assert_eq!(kafka.topic_name, "out");
        assert_eq!(kafka.serialization_type, "json");
      }
      other => panic!("unexpected detail: {:?}", other),
    }
  }

  #[test]
  fn test_sink_type_names() {
    assert_eq!(SinkType::Hive.to_string(), "HIVE");
    assert_eq!(SinkType::Es.to_string(), "ES");
  }
}

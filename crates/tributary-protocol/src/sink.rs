use serde::{Deserialize, Serialize};

use crate::field::FieldInfo;

/// Where the sort engine writes a stream to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SinkInfo {
  Hive(HiveSinkInfo),
  Kafka(KafkaSinkInfo),
  Elasticsearch(EsSinkInfo),
}

impl SinkInfo {
  pub fn fields(&self) -> &[FieldInfo] {
    match self {
      SinkInfo::Hive(info) => &info.fields,
      SinkInfo::Kafka(info) => &info.fields,
      SinkInfo::Elasticsearch(info) => &info.fields,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HiveSinkInfo {
  pub jdbc_url: String,
  pub database: String,
  pub table: String,
  pub username: String,
  pub password: String,
  pub data_path: String,
  pub file_format: String,
  pub partitions: Vec<String>,
  pub fields: Vec<FieldInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KafkaSinkInfo {
  pub address: String,
  pub topic: String,
  pub serialization: String,
  pub fields: Vec<FieldInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EsSinkInfo {
  pub hosts: String,
  pub index: String,
  pub username: String,
  pub password: String,
  pub fields: Vec<FieldInfo>,
}

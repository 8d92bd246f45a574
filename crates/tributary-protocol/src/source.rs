use serde::{Deserialize, Serialize};

use crate::deserialization::DeserializationInfo;
use crate::field::FieldInfo;

/// Where the sort engine reads a stream from. One variant per transport middleware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceInfo {
  Pulsar(PulsarSourceInfo),
  Tube(TubeSourceInfo),
}

/// Pulsar topic source. Each stream owns a topic inside the group's namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulsarSourceInfo {
  pub admin_url: String,
  pub service_url: String,
  pub tenant: String,
  pub namespace: String,
  pub topic: String,
  pub consumer_group: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub deserialization_info: Option<DeserializationInfo>,
  pub fields: Vec<FieldInfo>,
}

impl PulsarSourceInfo {
  /// e.g. `persistent://public/my_namespace/my_topic`
  pub fn full_topic_name(&self) -> String {
    format!(
      "persistent://{}/{}/{}",
      self.tenant, self.namespace, self.topic
    )
  }
}

/// TubeMQ source. All streams of a group share the group's topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TubeSourceInfo {
  pub topic: String,
  pub master_address: String,
  pub consumer_group: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub deserialization_info: Option<DeserializationInfo>,
  pub fields: Vec<FieldInfo>,
}

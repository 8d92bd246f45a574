use serde::{Deserialize, Serialize};

use crate::sink::SinkBrief;

/// Summary of a stream as returned by a group's stream listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamBrief {
  pub group_id: String,
  pub stream_id: String,
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub sink_list: Vec<SinkBrief>,
}

/// Full stream definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamInfo {
  pub group_id: String,
  pub stream_id: String,
  #[serde(default)]
  pub name: String,

  /// Middleware resource bound to this stream (the Pulsar topic).
  #[serde(default)]
  pub mq_resource_obj: String,

  /// Field delimiter, either a decimal character code ("124") or the character itself.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub data_separator: Option<String>,

  #[serde(default)]
  pub field_list: Vec<StreamField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamField {
  pub field_name: String,
  pub field_type: String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub field_comment: Option<String>,
}

impl StreamField {
  pub fn new(field_name: impl Into<String>, field_type: impl Into<String>) -> Self {
    Self {
      field_name: field_name.into(),
      field_type: field_type.into(),
      field_comment: None,
    }
  }
}

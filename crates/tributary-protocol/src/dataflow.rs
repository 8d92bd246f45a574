use serde::{Deserialize, Serialize};

use crate::sink::SinkInfo;
use crate::source::SourceInfo;

/// A compiled source/sink pairing for one stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataFlowInfo {
  /// Id of the sink this flow writes to.
  pub id: i64,
  pub source_info: SourceInfo,
  pub sink_info: SinkInfo,
}

impl DataFlowInfo {
  pub fn new(id: i64, source_info: SourceInfo, sink_info: SinkInfo) -> Self {
    Self {
      id,
      source_info,
      sink_info,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{DeserializationInfo, FieldInfo, FormatInfo, KafkaSinkInfo, TubeSourceInfo};
  use serde_json::json;

  #[test]
  fn test_serialized_shape() {
    let flow = DataFlowInfo::new(
      42,
      SourceInfo::Tube(TubeSourceInfo {
        topic: "t".to_string(),
        master_address: "m:8715".to_string(),
        consumer_group: "app_t_consumer_group".to_string(),
        deserialization_info: Some(DeserializationInfo::MessageCsv {
          tid: "s1".to_string(),
          delimiter: '|',
        }),
        fields: vec![FieldInfo::new(
          "ts",
          FormatInfo::Timestamp {
            format: "yyyy-MM-dd HH:mm:ss".to_string(),
          },
        )],
      }),
      SinkInfo::Kafka(KafkaSinkInfo {
        address: "k:9092".to_string(),
        topic: "out".to_string(),
        serialization: "json".to_string(),
        fields: vec![FieldInfo::new("ts", FormatInfo::Long)],
      }),
    );

    let value = serde_json::to_value(&flow).unwrap();
    assert_eq!(
      value,
      json!({
        "id": 42,
        "source_info": {
          "type": "tube",
          "topic": "t",
          "master_address": "m:8715",
          "consumer_group": "app_t_consumer_group",
          "deserialization_info": { "type": "message_csv", "tid": "s1", "delimiter": "|" },
          "fields": [
            { "name": "ts", "format_info": { "type": "timestamp", "format": "yyyy-MM-dd HH:mm:ss" } }
          ]
        },
        "sink_info": {
          "type": "kafka",
          "address": "k:9092",
          "topic": "out",
          "serialization": "json",
          "fields": [{ "name": "ts", "format_info": { "type": "long" } }]
        }
      })
    );
  }

  #[test]
  fn test_source_without_deserialization_omits_key() {
    let source = SourceInfo::Tube(TubeSourceInfo {
      topic: "t".to_string(),
      master_address: "m".to_string(),
      consumer_group: "cg".to_string(),
      deserialization_info: None,
      fields: vec![],
    });

    let value = serde_json::to_value(&source).unwrap();
    assert!(value.get("deserialization_info").is_none());
  }
}

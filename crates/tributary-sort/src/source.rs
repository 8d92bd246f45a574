//! Source resolution: where the sort engine reads a stream from.

use tributary_config::ClusterConfig;
use tributary_model::{GroupRequest, MIDDLEWARE_PULSAR, MIDDLEWARE_TUBE, StreamInfo};
use tributary_protocol::{
  DeserializationInfo, FieldInfo, PulsarSourceInfo, SourceInfo, TubeSourceInfo,
};

use crate::error::SortError;

/// A group's transport middleware, resolved against the cluster config.
///
/// Resolved once per group; every stream of the group is then read the same way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MiddlewareSource {
  /// One topic per stream inside the group's namespace.
  Pulsar {
    admin_url: String,
    service_url: String,
    tenant: String,
    namespace: String,
  },
  /// One topic shared by every stream of the group.
  Tube {
    master_address: String,
    topic: String,
  },
}

impl MiddlewareSource {
  pub fn resolve(group: &GroupRequest, cluster: &ClusterConfig) -> Result<Self, SortError> {
    let middleware_type = group.middleware_type.trim();

    if middleware_type.eq_ignore_ascii_case(MIDDLEWARE_PULSAR) {
      if cluster.pulsar_service_url.is_empty() {
        return Err(SortError::MissingClusterConfig {
          key: "pulsar_service_url",
        });
      }
      return Ok(MiddlewareSource::Pulsar {
        admin_url: cluster.pulsar_admin_url.clone(),
        service_url: cluster.pulsar_service_url.clone(),
        tenant: cluster.default_tenant.clone(),
        namespace: group.mq_resource_obj.clone(),
      });
    }

    if middleware_type.eq_ignore_ascii_case(MIDDLEWARE_TUBE) {
      if cluster.tube_master.is_empty() {
        return Err(SortError::MissingClusterConfig { key: "tube_master" });
      }
      return Ok(MiddlewareSource::Tube {
        master_address: cluster.tube_master.clone(),
        topic: group.mq_resource_obj.clone(),
      });
    }

    Err(SortError::UnsupportedMiddleware {
      middleware_type: group.middleware_type.clone(),
    })
  }

  /// Build the source descriptor of one stream.
  pub fn source_info(
    &self,
    cluster: &ClusterConfig,
    stream: &StreamInfo,
    deserialization_info: Option<DeserializationInfo>,
    fields: Vec<FieldInfo>,
  ) -> SourceInfo {
    match self {
      MiddlewareSource::Pulsar {
        admin_url,
        service_url,
        tenant,
        namespace,
      } => {
        let topic = stream.mq_resource_obj.clone();
        SourceInfo::Pulsar(PulsarSourceInfo {
          admin_url: admin_url.clone(),
          service_url: service_url.clone(),
          tenant: tenant.clone(),
          namespace: namespace.clone(),
          consumer_group: cluster.consumer_group(&topic),
          topic,
          deserialization_info,
          fields,
        })
      }
      MiddlewareSource::Tube {
        master_address,
        topic,
      } => SourceInfo::Tube(TubeSourceInfo {
        topic: topic.clone(),
        master_address: master_address.clone(),
        consumer_group: cluster.consumer_group(topic),
        deserialization_info,
        fields,
      }),
    }
  }
}

/// Deserialization of a stream's messages, derived from its data separator.
///
/// The separator is either a decimal character code ("124" is '|') or a
/// single literal character. All-digit values are always read as codes.
pub fn parse_delimiter(stream: &StreamInfo) -> Result<Option<DeserializationInfo>, SortError> {
  let Some(separator) = stream.data_separator.as_deref() else {
    return Ok(None);
  };
  if separator.is_empty() {
    return Ok(None);
  }

  let invalid = || SortError::InvalidDelimiter {
    stream_id: stream.stream_id.clone(),
    value: separator.to_string(),
  };

  let delimiter = if separator.bytes().all(|b| b.is_ascii_digit()) {
    separator
      .parse::<u32>()
      .ok()
      .and_then(char::from_u32)
      .ok_or_else(invalid)?
  } else {
    let mut chars = separator.chars();
    match (chars.next(), chars.next()) {
      (Some(c), None) => c,
      _ => return Err(invalid()),
    }
  };

  Ok(Some(DeserializationInfo::MessageCsv {
    tid: stream.stream_id.clone(),
    delimiter,
  }))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn stream_with_separator(separator: Option<&str>) -> StreamInfo {
    StreamInfo {
      group_id: "g1".to_string(),
      stream_id: "s1".to_string(),
      data_separator: separator.map(str::to_string),
      ..Default::default()
    }
  }

  fn group(middleware_type: &str) -> GroupRequest {
    GroupRequest {
      group_id: "g1".to_string(),
      middleware_type: middleware_type.to_string(),
      mq_resource_obj: "group_topic".to_string(),
      ..Default::default()
    }
  }

  #[test]
  fn test_delimiter_from_char_code() {
    let info = parse_delimiter(&stream_with_separator(Some("124"))).unwrap();
    assert_eq!(
      info,
      Some(DeserializationInfo::MessageCsv {
        tid: "s1".to_string(),
        delimiter: '|',
      })
    );
  }

  #[test]
  fn test_delimiter_from_literal() {
    let info = parse_delimiter(&stream_with_separator(Some(","))).unwrap();
    assert!(matches!(info, Some(DeserializationInfo::MessageCsv { delimiter: ',', .. })));
  }

  #[test]
  fn test_missing_delimiter_means_no_deserialization() {
    assert_eq!(parse_delimiter(&stream_with_separator(None)).unwrap(), None);
    assert_eq!(parse_delimiter(&stream_with_separator(Some(""))).unwrap(), None);
  }

  #[test]
  fn test_invalid_delimiters() {
    for value in ["||", "9999999999", "55296"] {
      let err = parse_delimiter(&stream_with_separator(Some(value))).unwrap_err();
      assert!(
        matches!(&err, SortError::InvalidDelimiter { value: v, .. } if v == value),
        "{}",
        value
      );
    }
  }

  #[test]
  fn test_tube_requires_master() {
    let err = MiddlewareSource::resolve(&group("TUBE"), &ClusterConfig::default()).unwrap_err();
    assert!(matches!(err, SortError::MissingClusterConfig { key: "tube_master" }));
  }

  #[test]
  fn test_pulsar_requires_service_url() {
    let err = MiddlewareSource::resolve(&group("PULSAR"), &ClusterConfig::default()).unwrap_err();
    assert!(matches!(err, SortError::MissingClusterConfig { key: "pulsar_service_url" }));
  }

  #[test]
  fn test_unsupported_middleware() {
    for middleware in ["NONE", "", "kafka"] {
      let err = MiddlewareSource::resolve(&group(middleware), &ClusterConfig::default()).unwrap_err();
      assert!(matches!(err, SortError::UnsupportedMiddleware { .. }), "{:?}", middleware);
    }
  }

  #[test]
  fn test_middleware_type_is_case_insensitive() {
    let cluster = ClusterConfig {
      tube_master: "m:8715".to_string(),
      ..Default::default()
    };
    assert!(MiddlewareSource::resolve(&group("tube"), &cluster).is_ok());
  }

  #[test]
  fn test_pulsar_source_uses_stream_topic() {
    let cluster = ClusterConfig {
      app_name: "app".to_string(),
      pulsar_service_url: "pulsar://p:6650".to_string(),
      pulsar_admin_url: "http://p:8080".to_string(),
      ..Default::default()
    };
    let middleware = MiddlewareSource::resolve(&group("PULSAR"), &cluster).unwrap();
    let stream = StreamInfo {
      mq_resource_obj: "stream_topic".to_string(),
      ..stream_with_separator(None)
    };

    let SourceInfo::Pulsar(info) = middleware.source_info(&cluster, &stream, None, vec![]) else {
      panic!("expected pulsar source");
    };
    assert_eq!(info.topic, "stream_topic");
    assert_eq!(info.namespace, "group_topic");
    assert_eq!(info.tenant, "public");
    assert_eq!(info.consumer_group, "app_stream_topic_consumer_group");
    assert_eq!(info.full_topic_name(), "persistent://public/group_topic/stream_topic");
  }
}

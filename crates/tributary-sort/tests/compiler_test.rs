use std::sync::Arc;

use async_trait::async_trait;
use tributary_catalog::{CatalogError, MemoryCatalog, StreamCatalog};
use tributary_config::ClusterConfig;
use tributary_model::{
  DATA_FLOW_KEY, GroupRequest, KafkaSink, SinkBrief, SinkDetail, SinkField, SinkRecord, SinkType,
  StreamBrief, StreamField, StreamInfo,
};
use tributary_protocol::{DataFlowInfo, DeserializationInfo, FormatInfo, SinkInfo, SourceInfo};
use tributary_sort::{DataFlowCompiler, SortError};

fn cluster() -> ClusterConfig {
  ClusterConfig {
    app_name: "sort_app".to_string(),
    tube_master: "tube-master:8715".to_string(),
    pulsar_service_url: "pulsar://pulsar:6650".to_string(),
    pulsar_admin_url: "http://pulsar:8080".to_string(),
    default_tenant: "public".to_string(),
  }
}

fn group(middleware_type: &str) -> GroupRequest {
  GroupRequest {
    group_id: "g1".to_string(),
    name: "orders".to_string(),
    middleware_type: middleware_type.to_string(),
    mq_resource_obj: "g1_topic".to_string(),
    ..Default::default()
  }
}

fn stream(stream_id: &str, separator: Option<&str>) -> StreamInfo {
  StreamInfo {
    group_id: "g1".to_string(),
    stream_id: stream_id.to_string(),
    name: stream_id.to_string(),
    mq_resource_obj: format!("{}_topic", stream_id),
    data_separator: separator.map(str::to_string),
    field_list: vec![
      StreamField::new("id", "bigint"),
      StreamField::new("created", "timestamp"),
    ],
  }
}

fn kafka_sink(id: i32, stream_id: &str) -> SinkRecord {
  SinkRecord {
    id,
    group_id: "g1".to_string(),
    stream_id: stream_id.to_string(),
    sink_name: format!("kafka_{}", id),
    fields: vec![SinkField::new("id", "long")],
    detail: SinkDetail::Kafka(KafkaSink {
      address: "kafka:9092".to_string(),
      topic_name: format!("{}_out", stream_id),
      serialization_type: "json".to_string(),
    }),
  }
}

fn compiler(catalog: MemoryCatalog, cluster: ClusterConfig) -> DataFlowCompiler {
  DataFlowCompiler::new(Arc::new(catalog), cluster)
}

fn three_streams() -> MemoryCatalog {
  MemoryCatalog::new()
    .with_stream(stream("s1", Some("124")))
    .with_stream(stream("s2", None))
    .with_stream(stream("s3", Some(",")))
    .with_sink(kafka_sink(1, "s1"))
    .with_sink(kafka_sink(2, "s2"))
    .with_sink(kafka_sink(3, "s3"))
}

#[tokio::test]
async fn test_one_flow_per_stream_keyed_by_stream_id() {
  let compiled = compiler(three_streams(), cluster())
    .compile(&group("TUBE"))
    .await
    .unwrap();

  let keys: Vec<&str> = compiled.flows.keys().map(String::as_str).collect();
  assert_eq!(keys, vec!["s1", "s2", "s3"]);
  assert_eq!(compiled.flows["s2"].id, 2);
  assert!(compiled.skipped.is_empty());
}

#[tokio::test]
async fn test_tube_source() {
  let compiled = compiler(three_streams(), cluster())
    .compile(&group("TUBE"))
    .await
    .unwrap();

  let SourceInfo::Tube(source) = &compiled.flows["s1"].source_info else {
    panic!("expected tube source");
  };
  assert_eq!(source.topic, "g1_topic");
  assert_eq!(source.master_address, "tube-master:8715");
  assert_eq!(source.consumer_group, "sort_app_g1_topic_consumer_group");
  assert_eq!(
    source.deserialization_info,
    Some(DeserializationInfo::MessageCsv {
      tid: "s1".to_string(),
      delimiter: '|',
    })
  );
  assert_eq!(source.fields[0].format_info, FormatInfo::Long);
}

#[tokio::test]
async fn test_pulsar_source_topic_is_stream_resource() {
  let compiled = compiler(three_streams(), cluster())
    .compile(&group("PULSAR"))
    .await
    .unwrap();

  for (stream_id, flow) in &compiled.flows {
    let SourceInfo::Pulsar(source) = &flow.source_info else {
      panic!("expected pulsar source");
    };
    assert_eq!(source.topic, format!("{}_topic", stream_id));
    assert_eq!(source.namespace, "g1_topic");
    assert_eq!(source.service_url, "pulsar://pulsar:6650");
    assert_eq!(
      source.consumer_group,
      format!("sort_app_{}_topic_consumer_group", stream_id)
    );
  }
}

#[tokio::test]
async fn test_deserialization_follows_delimiter() {
  let compiled = compiler(three_streams(), cluster())
    .compile(&group("TUBE"))
    .await
    .unwrap();

  let deserialization = |stream_id: &str| match &compiled.flows[stream_id].source_info {
    SourceInfo::Tube(source) => source.deserialization_info.clone(),
    SourceInfo::Pulsar(source) => source.deserialization_info.clone(),
  };
  assert!(deserialization("s2").is_none());
  assert!(matches!(
    deserialization("s3"),
    Some(DeserializationInfo::MessageCsv { delimiter: ',', .. })
  ));
}

#[tokio::test]
async fn test_sinkless_stream_is_skipped() {
  let catalog = MemoryCatalog::new()
    .with_stream(stream("s1", None))
    .with_stream(stream("orphan", None))
    .with_stream(stream("s3", None))
    .with_sink(kafka_sink(1, "s1"))
    .with_sink(kafka_sink(3, "s3"));

  let compiled = compiler(catalog, cluster())
    .compile(&group("TUBE"))
    .await
    .unwrap();

  let keys: Vec<&str> = compiled.flows.keys().map(String::as_str).collect();
  assert_eq!(keys, vec!["s1", "s3"]);
  assert_eq!(compiled.skipped.len(), 1);
  assert_eq!(compiled.skipped[0].stream_id, "orphan");
}

#[tokio::test]
async fn test_stream_with_unknown_field_type_is_skipped() {
  let mut bad = stream("bad", None);
  bad.field_list.push(StreamField::new("shape", "polygon"));
  let catalog = MemoryCatalog::new()
    .with_stream(bad)
    .with_stream(stream("good", None))
    .with_sink(kafka_sink(1, "bad"))
    .with_sink(kafka_sink(2, "good"));

  let compiled = compiler(catalog, cluster())
    .compile(&group("TUBE"))
    .await
    .unwrap();

  assert_eq!(compiled.flows.len(), 1);
  assert!(compiled.flows.contains_key("good"));
  assert!(compiled.skipped[0].reason.contains("polygon"));
}

#[tokio::test]
async fn test_stream_with_invalid_delimiter_is_skipped() {
  let catalog = MemoryCatalog::new()
    .with_stream(stream("bad", Some("::")))
    .with_sink(kafka_sink(1, "bad"));

  let compiled = compiler(catalog, cluster())
    .compile(&group("TUBE"))
    .await
    .unwrap();

  assert!(compiled.flows.is_empty());
  assert!(compiled.has_streams());
}

#[tokio::test]
async fn test_empty_group_id_compiles_nothing() {
  let mut group = group("NONE");
  group.group_id = String::new();

  let compiled = compiler(three_streams(), cluster())
    .apply(&mut group)
    .await
    .unwrap();

  assert!(!compiled.has_streams());
  assert!(group.ext(DATA_FLOW_KEY).is_none());
}

#[tokio::test]
async fn test_group_without_streams_compiles_nothing() {
  // Middleware is irrelevant when there is nothing to read.
  let mut group = group("NONE");
  let compiled = compiler(MemoryCatalog::new(), cluster())
    .apply(&mut group)
    .await
    .unwrap();

  assert!(compiled.flows.is_empty());
  assert!(group.ext_list.is_empty());
}

#[tokio::test]
async fn test_unsupported_middleware_fails_whole_group() {
  let mut group = group("NONE");
  let err = compiler(three_streams(), cluster())
    .apply(&mut group)
    .await
    .unwrap_err();

  assert!(matches!(err, SortError::UnsupportedMiddleware { middleware_type } if middleware_type == "NONE"));
  assert!(group.ext(DATA_FLOW_KEY).is_none());
}

#[tokio::test]
async fn test_tube_without_master_fails_whole_group() {
  let cluster = ClusterConfig {
    tube_master: String::new(),
    ..cluster()
  };
  let mut group = group("TUBE");
  let err = compiler(three_streams(), cluster)
    .apply(&mut group)
    .await
    .unwrap_err();

  assert!(matches!(err, SortError::MissingClusterConfig { key: "tube_master" }));
  assert!(group.ext_list.is_empty());
}

#[tokio::test]
async fn test_apply_writes_data_flow_ext() {
  let mut group = group("TUBE");
  let compiler = compiler(three_streams(), cluster());
  let compiled = compiler.apply(&mut group).await.unwrap();

  let value = group.ext(DATA_FLOW_KEY).unwrap();
  let parsed: serde_json::Map<String, serde_json::Value> = serde_json::from_str(value).unwrap();
  let keys: Vec<&str> = parsed.keys().map(String::as_str).collect();
  assert_eq!(keys.len(), 3);
  let s1: DataFlowInfo = serde_json::from_value(parsed["s1"].clone()).unwrap();
  assert_eq!(s1, compiled.flows["s1"]);

  // A second run replaces the entry instead of adding one.
  compiler.apply(&mut group).await.unwrap();
  let entries = group
    .ext_list
    .iter()
    .filter(|ext| ext.key_name == DATA_FLOW_KEY)
    .count();
  assert_eq!(entries, 1);
}

#[tokio::test]
async fn test_sink_descriptor_built_from_record() {
  let compiled = compiler(three_streams(), cluster())
    .compile(&group("TUBE"))
    .await
    .unwrap();

  let SinkInfo::Kafka(sink) = &compiled.flows["s3"].sink_info else {
    panic!("expected kafka sink");
  };
  assert_eq!(sink.topic, "s3_out");
  assert_eq!(sink.address, "kafka:9092");
  assert_eq!(sink.fields[0].format_info, FormatInfo::Long);
}

/// Catalog whose listing always fails.
struct BrokenCatalog;

#[async_trait]
impl StreamCatalog for BrokenCatalog {
  async fn list_streams(&self, _group_id: &str) -> Result<Vec<StreamBrief>, CatalogError> {
    Err(CatalogError::Io(std::io::Error::other("catalog offline")))
  }

  async fn get_stream(&self, group_id: &str, stream_id: &str) -> Result<StreamInfo, CatalogError> {
    Err(CatalogError::StreamNotFound {
      group_id: group_id.to_string(),
      stream_id: stream_id.to_string(),
    })
  }

  async fn get_sink(&self, sink_id: i32, sink_type: SinkType) -> Result<SinkRecord, CatalogError> {
    Err(CatalogError::SinkNotFound { sink_id, sink_type })
  }
}

#[tokio::test]
async fn test_stream_listing_failure_fails_whole_group() {
  let compiler = DataFlowCompiler::new(Arc::new(BrokenCatalog), cluster());
  let err = compiler.compile(&group("TUBE")).await.unwrap_err();

  assert!(matches!(err, SortError::Catalog { stream_id: None, .. }));
  assert!(!err.is_stream_scoped());
}

/// Lists a sink that the wrapped catalog does not hold.
struct DanglingSinkCatalog(MemoryCatalog);

#[async_trait]
impl StreamCatalog for DanglingSinkCatalog {
  async fn list_streams(&self, group_id: &str) -> Result<Vec<StreamBrief>, CatalogError> {
    let mut streams = self.0.list_streams(group_id).await?;
    for stream in &mut streams {
      if stream.sink_list.is_empty() {
        stream.sink_list.push(SinkBrief {
          id: 99,
          sink_type: SinkType::Hive,
          sink_name: "gone".to_string(),
        });
      }
    }
    Ok(streams)
  }

  async fn get_stream(&self, group_id: &str, stream_id: &str) -> Result<StreamInfo, CatalogError> {
    self.0.get_stream(group_id, stream_id).await
  }

  async fn get_sink(&self, sink_id: i32, sink_type: SinkType) -> Result<SinkRecord, CatalogError> {
    self.0.get_sink(sink_id, sink_type).await
  }
}

#[tokio::test]
async fn test_missing_sink_record_is_skipped() {
  let catalog = MemoryCatalog::new()
    .with_stream(stream("s1", None))
    .with_stream(stream("s2", None))
    .with_sink(kafka_sink(2, "s2"));
  let compiler = DataFlowCompiler::new(Arc::new(DanglingSinkCatalog(catalog)), cluster());

  let compiled = compiler.compile(&group("TUBE")).await.unwrap();

  assert_eq!(compiled.flows.len(), 1);
  assert_eq!(compiled.skipped[0].stream_id, "s1");
  assert!(compiled.skipped[0].reason.contains("sink not found"));
}

/// Lists streams from the wrapped catalog but cannot read any record.
struct UnreachableRecordsCatalog(MemoryCatalog);

#[async_trait]
impl StreamCatalog for UnreachableRecordsCatalog {
  async fn list_streams(&self, group_id: &str) -> Result<Vec<StreamBrief>, CatalogError> {
    self.0.list_streams(group_id).await
  }

  async fn get_stream(&self, _group_id: &str, _stream_id: &str) -> Result<StreamInfo, CatalogError> {
    Err(CatalogError::Io(std::io::Error::other("connection refused")))
  }

  async fn get_sink(&self, _sink_id: i32, _sink_type: SinkType) -> Result<SinkRecord, CatalogError> {
    Err(CatalogError::Io(std::io::Error::other("connection refused")))
  }
}

#[tokio::test]
async fn test_record_lookup_outage_fails_whole_group() {
  let compiler = DataFlowCompiler::new(
    Arc::new(UnreachableRecordsCatalog(three_streams())),
    cluster(),
  );
  let mut target = group("TUBE");

  let err = compiler.apply(&mut target).await.unwrap_err();

  assert!(matches!(
    &err,
    SortError::Catalog { stream_id: Some(id), source: CatalogError::Io(_) } if id == "s1"
  ));
  assert!(!err.is_stream_scoped());
  assert_eq!(target.ext(DATA_FLOW_KEY), None);
}

#[tokio::test]
async fn test_only_first_sink_is_compiled() {
  let catalog = MemoryCatalog::new()
    .with_stream(stream("s1", None))
    .with_sink(kafka_sink(7, "s1"))
    .with_sink(kafka_sink(8, "s1"));

  let compiled = compiler(catalog, cluster())
    .compile(&group("TUBE"))
    .await
    .unwrap();

  assert_eq!(compiled.flows.len(), 1);
  assert_eq!(compiled.flows["s1"].id, 7);
}

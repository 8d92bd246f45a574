//! Sink resolution: where the sort engine writes a stream to.

use tributary_model::{SinkDetail, SinkRecord};
use tributary_protocol::{EsSinkInfo, HiveSinkInfo, KafkaSinkInfo, SinkInfo};

use crate::error::SortError;
use crate::format::convert_fields;

/// Build the sink descriptor for a sink record. Independent of the source middleware.
pub fn sink_info(record: &SinkRecord) -> Result<SinkInfo, SortError> {
  let fields = convert_fields(
    record
      .fields
      .iter()
      .map(|field| (field.field_name.as_str(), field.field_type.as_str())),
  )?;

  let info = match &record.detail {
    SinkDetail::Hive(hive) => SinkInfo::Hive(HiveSinkInfo {
      jdbc_url: hive.jdbc_url.clone(),
      database: hive.db_name.clone(),
      table: hive.table_name.clone(),
      username: hive.username.clone(),
      password: hive.password.clone(),
      data_path: hive.data_path.clone(),
      file_format: hive.file_format.clone(),
      partitions: hive.partition_fields.clone(),
      fields,
    }),
    SinkDetail::Kafka(kafka) => SinkInfo::Kafka(KafkaSinkInfo {
      address: kafka.address.clone(),
      topic: kafka.topic_name.clone(),
      serialization: kafka.serialization_type.clone(),
      fields,
    }),
    SinkDetail::Es(es) => SinkInfo::Elasticsearch(EsSinkInfo {
      hosts: es.hosts.clone(),
      index: es.index_name.clone(),
      username: es.username.clone(),
      password: es.password.clone(),
      fields,
    }),
  };
  Ok(info)
}

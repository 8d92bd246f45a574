//! The data-flow compiler.
//!
//! Compilation of a group runs in three phases:
//! 1. List the group's streams (an empty group id or stream list compiles to nothing)
//! 2. Resolve the group's middleware once
//! 3. Compile each stream into a [`DataFlowInfo`]; streams that fail on their
//!    own are skipped, anything else aborts the group

use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use tracing::{debug, info, instrument, warn};
use tributary_catalog::{CatalogError, StreamCatalog};
use tributary_config::ClusterConfig;
use tributary_model::{DATA_FLOW_KEY, GroupRequest, StreamBrief};
use tributary_protocol::DataFlowInfo;

use crate::error::SortError;
use crate::format::convert_fields;
use crate::sink::sink_info;
use crate::source::{MiddlewareSource, parse_delimiter};

/// A stream that was left out of the compiled flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedStream {
  pub stream_id: String,
  pub reason: String,
}

/// Result of compiling one group.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CompiledDataFlows {
  pub group_id: String,
  /// Flows keyed by stream id, in stream listing order.
  pub flows: IndexMap<String, DataFlowInfo>,
  pub skipped: Vec<SkippedStream>,
}

impl CompiledDataFlows {
  fn empty(group_id: &str) -> Self {
    Self {
      group_id: group_id.to_string(),
      ..Default::default()
    }
  }

  /// Whether the group had any streams to compile.
  pub fn has_streams(&self) -> bool {
    !self.flows.is_empty() || !self.skipped.is_empty()
  }

  /// The ext value: the flows serialized as a JSON object keyed by stream id.
  pub fn to_json(&self) -> Result<String, SortError> {
    Ok(serde_json::to_string(&self.flows)?)
  }
}

/// Compiles a group's streams into sort data flows.
pub struct DataFlowCompiler {
  catalog: Arc<dyn StreamCatalog>,
  cluster: ClusterConfig,
}

impl DataFlowCompiler {
  pub fn new(catalog: Arc<dyn StreamCatalog>, cluster: ClusterConfig) -> Self {
    Self { catalog, cluster }
  }

  #[instrument(name = "sort_compile", skip_all, fields(group_id = %group.group_id))]
  pub async fn compile(&self, group: &GroupRequest) -> Result<CompiledDataFlows, SortError> {
    if group.group_id.is_empty() {
      debug!("empty group id, nothing to compile");
      return Ok(CompiledDataFlows::empty(&group.group_id));
    }

    let streams: Vec<StreamBrief> = self
      .catalog
      .list_streams(&group.group_id)
      .await
      .map_err(|source| SortError::Catalog {
        stream_id: None,
        source,
      })?
      .into_iter()
      .filter(|brief| !brief.stream_id.is_empty())
      .collect();

    if streams.is_empty() {
      debug!("group has no streams, nothing to compile");
      return Ok(CompiledDataFlows::empty(&group.group_id));
    }

    let middleware = MiddlewareSource::resolve(group, &self.cluster)?;

    let mut compiled = CompiledDataFlows::empty(&group.group_id);
    for brief in &streams {
      match self.compile_stream(group, &middleware, brief).await {
        Ok(flow) => {
          compiled.flows.insert(brief.stream_id.clone(), flow);
        }
        Err(e) if e.is_stream_scoped() => {
          warn!(
            stream_id = %brief.stream_id,
            error = %e,
            "stream_skipped"
          );
          compiled.skipped.push(SkippedStream {
            stream_id: brief.stream_id.clone(),
            reason: e.to_string(),
          });
        }
        Err(e) => return Err(e),
      }
    }

    info!(
      streams = streams.len(),
      flows = compiled.flows.len(),
      skipped = compiled.skipped.len(),
      "sort_compiled"
    );
    Ok(compiled)
  }

  /// Compile the group and attach the result as its `dataFlow` ext entry.
  ///
  /// The group is left untouched when it has no streams or compilation fails.
  pub async fn apply(&self, group: &mut GroupRequest) -> Result<CompiledDataFlows, SortError> {
    let compiled = self.compile(group).await?;
    if compiled.has_streams() {
      group.upsert_ext(DATA_FLOW_KEY, compiled.to_json()?);
    }
    Ok(compiled)
  }

  async fn compile_stream(
    &self,
    group: &GroupRequest,
    middleware: &MiddlewareSource,
    brief: &StreamBrief,
  ) -> Result<DataFlowInfo, SortError> {
    let stream_id = &brief.stream_id;
    let lookup_failed = |source: CatalogError| SortError::Catalog {
      stream_id: Some(stream_id.clone()),
      source,
    };

    // Only the first sink of a stream is compiled.
    let sink = brief
      .sink_list
      .first()
      .ok_or_else(|| SortError::NoSinkFound {
        stream_id: stream_id.clone(),
      })?;

    let record = self
      .catalog
      .get_sink(sink.id, sink.sink_type)
      .await
      .map_err(lookup_failed)?;
    let stream = self
      .catalog
      .get_stream(&group.group_id, stream_id)
      .await
      .map_err(lookup_failed)?;

    let fields = convert_fields(
      stream
        .field_list
        .iter()
        .map(|field| (field.field_name.as_str(), field.field_type.as_str())),
    )?;
    let deserialization_info = parse_delimiter(&stream)?;
    let source_info = middleware.source_info(&self.cluster, &stream, deserialization_info, fields);
    let target = sink_info(&record)?;

    debug!(
      stream_id = %stream_id,
      sink_id = record.id,
      sink_type = %sink.sink_type,
      "stream_compiled"
    );
    Ok(DataFlowInfo::new(i64::from(record.id), source_info, target))
  }
}

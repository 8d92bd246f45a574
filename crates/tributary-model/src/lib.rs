//! Tributary Model
//!
//! Read models consumed by the process engine and the sort compiler:
//! group requests, stream and sink records, and the process forms that
//! trigger workflows. These types are plain serde structs; their storage
//! is owned by external services.

mod form;
mod group;
mod sink;
mod stream;

pub use form::{GroupResourceForm, NewConsumptionForm, OperateType, ProcessForm, UpdateGroupForm};
pub use group::{DATA_FLOW_KEY, GroupExtInfo, GroupRequest, MIDDLEWARE_PULSAR, MIDDLEWARE_TUBE};
pub use sink::{EsSink, HiveSink, KafkaSink, SinkBrief, SinkDetail, SinkField, SinkRecord, SinkType};
pub use stream::{StreamBrief, StreamField, StreamInfo};

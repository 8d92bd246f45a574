//! Tributary Protocol
//!
//! The data-flow descriptors understood by the downstream sort engine. A
//! [`DataFlowInfo`] pairs one [`SourceInfo`] (where the stream is read from)
//! with one [`SinkInfo`] (where it is written to).
//!
//! All types are serde-serializable with an internal `type` tag, e.g.
//!
//! ```json
//! {
//!   "id": 42,
//!   "source_info": { "type": "tube", "topic": "t", "master_address": "m:8715", ... },
//!   "sink_info": { "type": "kafka", "address": "k:9092", "topic": "out", ... }
//! }
//! ```

mod dataflow;
mod deserialization;
mod field;
mod sink;
mod source;

pub use dataflow::DataFlowInfo;
pub use deserialization::DeserializationInfo;
pub use field::{FieldInfo, FormatInfo};
pub use sink::{EsSinkInfo, HiveSinkInfo, KafkaSinkInfo, SinkInfo};
pub use source::{PulsarSourceInfo, SourceInfo, TubeSourceInfo};

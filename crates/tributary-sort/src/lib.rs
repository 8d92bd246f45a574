//! Tributary Sort
//!
//! Compiles a group's stream, sink and middleware metadata into the data-flow
//! descriptors consumed by the downstream sort engine.
//!
//! - [`convert_field_format`] maps declared field types to [`FormatInfo`](tributary_protocol::FormatInfo)
//! - [`MiddlewareSource`] and [`sink_info`] build source and sink descriptors
//! - [`DataFlowCompiler`] compiles every stream of a group
//! - [`CreateSortConfigListener`] runs the compiler as a workflow task listener

mod compiler;
mod error;
mod format;
mod listener;
mod sink;
mod source;

pub use compiler::{CompiledDataFlows, DataFlowCompiler, SkippedStream};
pub use error::SortError;
pub use format::{DATE_FORMAT, TIME_FORMAT, TIMESTAMP_FORMAT, convert_field_format};
pub use listener::{CreateSortConfigListener, INIT_SORT_TASK};
pub use sink::sink_info;
pub use source::{MiddlewareSource, parse_delimiter};

//! Tributary Catalog
//!
//! Read access to the stream and sink records that the sort compiler needs.
//! The records themselves are owned by external services; the [`StreamCatalog`]
//! trait is the narrow view the compiler consumes.

mod error;
mod fs_catalog;
mod memory;

pub use error::CatalogError;
pub use fs_catalog::FsCatalog;
pub use memory::MemoryCatalog;

use async_trait::async_trait;
use tributary_model::{SinkRecord, SinkType, StreamBrief, StreamInfo};

/// Catalog of streams and sinks.
#[async_trait]
pub trait StreamCatalog: Send + Sync {
  /// List the streams of a group, each with its sink summaries.
  /// An unknown group yields an empty list.
  async fn list_streams(&self, group_id: &str) -> Result<Vec<StreamBrief>, CatalogError>;

  /// Get the full definition of a stream.
  async fn get_stream(&self, group_id: &str, stream_id: &str) -> Result<StreamInfo, CatalogError>;

  /// Get a sink by its id and type.
  async fn get_sink(&self, sink_id: i32, sink_type: SinkType) -> Result<SinkRecord, CatalogError>;
}

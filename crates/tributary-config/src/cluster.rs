use serde::{Deserialize, Serialize};

/// Connection details for the transport middleware clusters.
///
/// Values are read-only once loaded. An empty string means "not configured";
/// consumers decide whether a missing value is fatal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
  /// Application name, used as the prefix of synthesized consumer groups.
  pub app_name: String,

  /// TubeMQ master address list, e.g. "127.0.0.1:8715,127.0.0.2:8715".
  pub tube_master: String,

  /// Pulsar broker service url, e.g. "pulsar://127.0.0.1:6650".
  pub pulsar_service_url: String,

  /// Pulsar admin url, e.g. "http://127.0.0.1:8080".
  pub pulsar_admin_url: String,

  /// Pulsar tenant that owns group namespaces.
  pub default_tenant: String,
}

impl Default for ClusterConfig {
  fn default() -> Self {
    Self {
      app_name: "tributary".to_string(),
      tube_master: String::new(),
      pulsar_service_url: String::new(),
      pulsar_admin_url: String::new(),
      default_tenant: "public".to_string(),
    }
  }
}

impl ClusterConfig {
  /// Consumer group name for a topic: `{app_name}_{topic}_consumer_group`.
  pub fn consumer_group(&self, topic: &str) -> String {
    format!("{}_{}_consumer_group", self.app_name, topic)
  }
}

use serde::{Deserialize, Serialize};

/// Ext key under which the compiled data-flow bundle is stored.
pub const DATA_FLOW_KEY: &str = "dataFlow";

pub const MIDDLEWARE_PULSAR: &str = "PULSAR";
pub const MIDDLEWARE_TUBE: &str = "TUBE";

/// A group-level request: the unit of provisioning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupRequest {
  pub group_id: String,

  #[serde(default)]
  pub name: String,

  /// Transport middleware kind, e.g. "PULSAR" or "TUBE".
  pub middleware_type: String,

  /// Middleware resource bound to the group: the Tube topic, or the Pulsar namespace.
  #[serde(default)]
  pub mq_resource_obj: String,

  #[serde(default)]
  pub ext_list: Vec<GroupExtInfo>,
}

/// A key/value extension attached to a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupExtInfo {
  pub group_id: String,
  pub key_name: String,
  pub key_value: String,
}

impl GroupRequest {
  /// Look up an ext value by key.
  pub fn ext(&self, key_name: &str) -> Option<&str> {
    self
      .ext_list
      .iter()
      .find(|ext| ext.key_name == key_name)
      .map(|ext| ext.key_value.as_str())
  }

  /// Set an ext value, replacing any previous entry with the same key.
  pub fn upsert_ext(&mut self, key_name: &str, key_value: String) {
    let group_id = self.group_id.clone();
    match self.ext_list.iter_mut().find(|ext| ext.key_name == key_name) {
      Some(ext) => ext.key_value = key_value,
      None => self.ext_list.push(GroupExtInfo {
        group_id,
        key_name: key_name.to_string(),
        key_value,
      }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_upsert_ext_appends_then_replaces() {
    let mut group = GroupRequest {
      group_id: "g1".to_string(),
      middleware_type: MIDDLEWARE_TUBE.to_string(),
      ..Default::default()
    };

    group.upsert_ext(DATA_FLOW_KEY, "{}".to_string());
    assert_eq!(group.ext(DATA_FLOW_KEY), Some("{}"));
    assert_eq!(group.ext_list[0].group_id, "g1");

    group.upsert_ext(DATA_FLOW_KEY, r#"{"s1":{}}"#.to_string());
    assert_eq!(group.ext_list.len(), 1);
    assert_eq!(group.ext(DATA_FLOW_KEY), Some(r#"{"s1":{}}"#));
  }

  #[test]
  fn test_ext_missing() {
    let group = GroupRequest::default();
    assert_eq!(group.ext("anything"), None);
  }
}

use serde::{Deserialize, Serialize};

/// Canonical value format of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormatInfo {
  String,
  Boolean,
  Byte,
  Short,
  Int,
  Long,
  Float,
  Double,
  Decimal,
  Date { format: String },
  Time { format: String },
  Timestamp { format: String },
  Binary,
}

/// A named, formatted field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
  pub name: String,
  pub format_info: FormatInfo,
}

impl FieldInfo {
  pub fn new(name: impl Into<String>, format_info: FormatInfo) -> Self {
    Self {
      name: name.into(),
      format_info,
    }
  }
}

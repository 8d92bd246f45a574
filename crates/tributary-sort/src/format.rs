use tributary_protocol::{FieldInfo, FormatInfo};

use crate::error::SortError;

pub const DATE_FORMAT: &str = "yyyy-MM-dd";
pub const TIME_FORMAT: &str = "HH:mm:ss";
pub const TIMESTAMP_FORMAT: &str = "yyyy-MM-dd HH:mm:ss";

/// Map a declared field type to its canonical format. Case-insensitive.
pub fn convert_field_format(field_type: &str) -> Result<FormatInfo, SortError> {
  let format = match field_type.trim().to_ascii_lowercase().as_str() {
    "string" | "varchar" | "char" | "text" => FormatInfo::String,
    "boolean" | "bool" => FormatInfo::Boolean,
    "tinyint" | "byte" => FormatInfo::Byte,
    "smallint" | "short" => FormatInfo::Short,
    "int" | "integer" => FormatInfo::Int,
    "bigint" | "long" => FormatInfo::Long,
    "float" => FormatInfo::Float,
    "double" => FormatInfo::Double,
    "decimal" => FormatInfo::Decimal,
    "date" => FormatInfo::Date {
      format: DATE_FORMAT.to_string(),
    },
    "time" => FormatInfo::Time {
      format: TIME_FORMAT.to_string(),
    },
    "timestamp" | "datetime" => FormatInfo::Timestamp {
      format: TIMESTAMP_FORMAT.to_string(),
    },
    "binary" | "bytes" => FormatInfo::Binary,
    _ => {
      return Err(SortError::UnknownFieldFormat {
        field_type: field_type.to_string(),
      });
    }
  };
  Ok(format)
}

/// Convert `(name, type)` pairs, keeping their order. The first unknown type fails the lot.
pub(crate) fn convert_fields<'a>(
  fields: impl IntoIterator<Item = (&'a str, &'a str)>,
) -> Result<Vec<FieldInfo>, SortError> {
  fields
    .into_iter()
    .map(|(name, field_type)| Ok(FieldInfo::new(name, convert_field_format(field_type)?)))
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_aliases_map_to_the_same_format() {
    for (alias, expected) in [
      ("VARCHAR", FormatInfo::String),
      ("text", FormatInfo::String),
      ("Bool", FormatInfo::Boolean),
      ("tinyint", FormatInfo::Byte),
      ("short", FormatInfo::Short),
      ("INTEGER", FormatInfo::Int),
      ("bigint", FormatInfo::Long),
      ("bytes", FormatInfo::Binary),
    ] {
      assert_eq!(convert_field_format(alias).unwrap(), expected, "{}", alias);
    }
  }

  #[test]
  fn test_temporal_formats_carry_patterns() {
    assert_eq!(
      convert_field_format("datetime").unwrap(),
      FormatInfo::Timestamp {
        format: "yyyy-MM-dd HH:mm:ss".to_string()
      }
    );
    assert_eq!(
      convert_field_format("date").unwrap(),
      FormatInfo::Date {
        format: "yyyy-MM-dd".to_string()
      }
    );
    assert_eq!(
      convert_field_format("time").unwrap(),
      FormatInfo::Time {
        format: "HH:mm:ss".to_string()
      }
    );
  }

  #[test]
  fn test_unknown_type_is_rejected() {
    let err = convert_field_format("geometry").unwrap_err();
    assert!(matches!(err, SortError::UnknownFieldFormat { field_type } if field_type == "geometry"));
  }

  #[test]
  fn test_convert_fields_keeps_order() {
    let fields = convert_fields([("id", "int"), ("name", "string")]).unwrap();
    let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["id", "name"]);

    assert!(convert_fields([("id", "int"), ("shape", "polygon")]).is_err());
  }
}

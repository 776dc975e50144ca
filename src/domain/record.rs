//! Records and the typed keys used to index them.
//!
//! A record is any JSON value. Only objects carry attributes; every attribute of a
//! non-object record is treated as absent.

use std::fmt;

use serde_json::Value;

/// An open-attribute record.
pub type Record = Value;

/// Hashable projection of an attribute value.
///
/// `Absent` is an explicit sentinel for a missing attribute and never equals any
/// present value, `Null` included. Integral numbers compare equal regardless of
/// their JSON spelling (`1` and `1.0`); strings never equal numbers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Absent,
    Null,
    Bool(bool),
    Int(i128),
    /// Bit pattern of a non-integral float; `-0.0` is folded into `Int(0)`.
    Float(u64),
    Str(String),
    /// Arrays and objects, keyed by their JSON text.
    Composite(String),
}

impl RecordKey {
    /// Key of `field` in `record`, `Absent` when the attribute is missing.
    pub fn of(record: &Value, field: &str) -> Self {
        match record.get(field) {
            Some(value) => Self::from_value(value),
            None => Self::Absent,
        }
    }

    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Self::Int(i128::from(i))
                } else if let Some(u) = n.as_u64() {
                    Self::Int(i128::from(u))
                } else {
                    let f = n.as_f64().unwrap_or(f64::NAN);
                    if f.fract() == 0.0 && f.abs() < 1e38 {
                        Self::Int(f as i128)
                    } else {
                        Self::Float(f.to_bits())
                    }
                }
            }
            Value::String(s) => Self::Str(s.clone()),
            Value::Array(_) | Value::Object(_) => Self::Composite(value.to_string()),
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "<absent>"),
            Self::Null => write!(f, "null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            Self::Float(bits) => write!(f, "{}", f64::from_bits(*bits)),
            Self::Str(s) => write!(f, "{:?}", s),
            Self::Composite(s) => write!(f, "{}", s),
        }
    }
}

/// Human-readable label for a record: the string form of `field`, or the key's display.
pub fn record_label(record: &Value, field: &str) -> String {
    match record.get(field) {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => RecordKey::Absent.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_missing_attribute_when_keying_then_absent_differs_from_null() {
        let record = json!({"id": null});
        assert_eq!(RecordKey::of(&record, "id"), RecordKey::Null);
        assert_eq!(RecordKey::of(&record, "parentId"), RecordKey::Absent);
        assert_ne!(RecordKey::Absent, RecordKey::Null);
    }

    #[test]
    fn given_integral_float_when_keying_then_equals_integer() {
        assert_eq!(
            RecordKey::from_value(&json!(1.0)),
            RecordKey::from_value(&json!(1))
        );
        assert_ne!(
            RecordKey::from_value(&json!(1.5)),
            RecordKey::from_value(&json!(1))
        );
    }

    #[test]
    fn given_string_and_number_when_keying_then_they_differ() {
        assert_ne!(
            RecordKey::from_value(&json!("1")),
            RecordKey::from_value(&json!(1))
        );
    }

    #[test]
    fn given_non_object_record_when_keying_then_every_field_is_absent() {
        assert!(RecordKey::of(&json!(42), "id").is_absent());
        assert!(RecordKey::of(&json!(["id"]), "id").is_absent());
    }
}

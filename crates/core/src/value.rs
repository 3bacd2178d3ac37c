//! Dynamically typed property values.
//!
//! Rules read entity properties through [`PropertyAccess`](crate::property::PropertyAccess)
//! and receive them as [`FieldValue`]s, so a single predicate can compare
//! integers, decimals, dates and text without knowing the concrete field type.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;

/// Accepted textual date layouts, tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y"];
const DATE_TIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"];

/// A property value as seen by the rule engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

/// Target type for converting textual bounds in rule declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConvertToType {
    Decimal,
    Date,
}

impl FieldValue {
    /// Short name of the variant, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            FieldValue::Null => "null",
            FieldValue::Bool(_) => "bool",
            FieldValue::Int(_) => "int",
            FieldValue::Float(_) => "float",
            FieldValue::Decimal(_) => "decimal",
            FieldValue::Text(_) => "text",
            FieldValue::Date(_) => "date",
            FieldValue::DateTime(_) => "datetime",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// `true` for null and for text that is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// `true` for null and for empty text (whitespace counts as content).
    pub fn is_null_or_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Display form of the value, `None` for null.
    pub fn as_text(&self) -> Option<String> {
        match self {
            FieldValue::Null => None,
            FieldValue::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn is_numeric(&self) -> bool {
        matches!(
            self,
            FieldValue::Int(_) | FieldValue::Float(_) | FieldValue::Decimal(_)
        )
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Int(i) => Some(*i as f64),
            FieldValue::Float(f) => Some(*f),
            FieldValue::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }

    /// Order two values.
    ///
    /// Numeric variants compare across each other, dates compare with
    /// date-times (a date is midnight). Any other mix is an error.
    pub fn compare(&self, other: &FieldValue) -> Result<Ordering, CoreError> {
        use FieldValue as V;

        let incomparable = || CoreError::Incomparable {
            left: self.kind(),
            right: other.kind(),
        };

        match (self, other) {
            (V::Int(a), V::Int(b)) => Ok(a.cmp(b)),
            (V::Decimal(a), V::Decimal(b)) => Ok(a.cmp(b)),
            (V::Int(a), V::Decimal(b)) => Ok(Decimal::from(*a).cmp(b)),
            (V::Decimal(a), V::Int(b)) => Ok(a.cmp(&Decimal::from(*b))),
            (a, b) if a.is_numeric() && b.is_numeric() => {
                let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) else {
                    return Err(incomparable());
                };
                x.partial_cmp(&y).ok_or_else(incomparable)
            }
            (V::Text(a), V::Text(b)) => Ok(a.as_str().cmp(b.as_str())),
            (V::Bool(a), V::Bool(b)) => Ok(a.cmp(b)),
            (V::Date(a), V::Date(b)) => Ok(a.cmp(b)),
            (V::DateTime(a), V::DateTime(b)) => Ok(a.cmp(b)),
            (V::Date(a), V::DateTime(b)) => Ok(a.and_time(NaiveTime::MIN).cmp(b)),
            (V::DateTime(a), V::Date(b)) => Ok(a.cmp(&b.and_time(NaiveTime::MIN))),
            _ => Err(incomparable()),
        }
    }

    /// Parse a textual bound into a decimal or date value.
    pub fn parse_as(text: &str, target: ConvertToType) -> Result<FieldValue, CoreError> {
        let text = text.trim();
        match target {
            ConvertToType::Decimal => Decimal::from_str(text)
                .map(FieldValue::Decimal)
                .map_err(|e| CoreError::InvalidArgument {
                    name: "value",
                    reason: format!("`{text}` is not a decimal: {e}"),
                }),
            ConvertToType::Date => {
                for fmt in DATE_FORMATS {
                    if let Ok(d) = NaiveDate::parse_from_str(text, fmt) {
                        return Ok(FieldValue::Date(d));
                    }
                }
                for fmt in DATE_TIME_FORMATS {
                    if let Ok(dt) = NaiveDateTime::parse_from_str(text, fmt) {
                        return Ok(FieldValue::DateTime(dt));
                    }
                }
                Err(CoreError::InvalidArgument {
                    name: "value",
                    reason: format!("`{text}` is not a date"),
                })
            }
        }
    }

    /// Convert a JSON value. Arrays and objects are kept as their JSON text.
    pub fn from_json(value: &Value) -> FieldValue {
        match value {
            Value::Null => FieldValue::Null,
            Value::Bool(b) => FieldValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => FieldValue::Int(i),
                None => n.as_f64().map_or(FieldValue::Null, FieldValue::Float),
            },
            Value::String(s) => FieldValue::Text(s.clone()),
            other => FieldValue::Text(other.to_string()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Null => Value::Null,
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Int(i) => Value::from(*i),
            FieldValue::Float(f) => Value::from(*f),
            other => Value::String(other.to_string()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Null => f.write_str("Null"),
            FieldValue::Bool(true) => f.write_str("True"),
            FieldValue::Bool(false) => f.write_str("False"),
            FieldValue::Int(i) => write!(f, "{i}"),
            FieldValue::Float(x) => write!(f, "{x}"),
            FieldValue::Decimal(d) => write!(f, "{d}"),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            FieldValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

// ---------------------------------------------------------------------------
// Conversions
// ---------------------------------------------------------------------------

macro_rules! int_from {
    ($($t:ty),*) => {
        $(impl From<$t> for FieldValue {
            fn from(v: $t) -> Self {
                FieldValue::Int(i64::from(v))
            }
        })*
    };
}

int_from!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for FieldValue {
    fn from(v: f32) -> Self {
        FieldValue::Float(f64::from(v))
    }
}

impl From<f64> for FieldValue {
    fn from(v: f64) -> Self {
        FieldValue::Float(v)
    }
}

impl From<bool> for FieldValue {
    fn from(v: bool) -> Self {
        FieldValue::Bool(v)
    }
}

impl From<Decimal> for FieldValue {
    fn from(v: Decimal) -> Self {
        FieldValue::Decimal(v)
    }
}

impl From<NaiveDate> for FieldValue {
    fn from(v: NaiveDate) -> Self {
        FieldValue::Date(v)
    }
}

impl From<NaiveDateTime> for FieldValue {
    fn from(v: NaiveDateTime) -> Self {
        FieldValue::DateTime(v)
    }
}

impl From<String> for FieldValue {
    fn from(v: String) -> Self {
        FieldValue::Text(v)
    }
}

impl From<&str> for FieldValue {
    fn from(v: &str) -> Self {
        FieldValue::Text(v.to_string())
    }
}

impl From<&String> for FieldValue {
    fn from(v: &String) -> Self {
        FieldValue::Text(v.clone())
    }
}

impl<T: Into<FieldValue>> From<Option<T>> for FieldValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FieldValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;

    #[test]
    fn numeric_kinds_compare_across_each_other() {
        let int = FieldValue::Int(5);
        let dec = FieldValue::Decimal(Decimal::new(55, 1));
        let float = FieldValue::Float(4.5);
        assert_eq!(int.compare(&dec).unwrap(), Ordering::Less);
        assert_eq!(dec.compare(&int).unwrap(), Ordering::Greater);
        assert_eq!(int.compare(&float).unwrap(), Ordering::Greater);
        assert_eq!(float.compare(&FieldValue::Float(4.5)).unwrap(), Ordering::Equal);
    }

    #[test]
    fn dates_compare_with_date_times() {
        let d = FieldValue::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        let dt = FieldValue::DateTime(
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(23, 0, 0)
                .unwrap(),
        );
        assert_eq!(d.compare(&dt).unwrap(), Ordering::Greater);
    }

    #[test]
    fn text_against_number_is_incomparable() {
        let err = FieldValue::from("abc").compare(&FieldValue::Int(1)).unwrap_err();
        assert_matches!(
            err,
            CoreError::Incomparable {
                left: "text",
                right: "int"
            }
        );
    }

    #[test]
    fn nan_is_incomparable() {
        assert!(FieldValue::Float(f64::NAN)
            .compare(&FieldValue::Float(1.0))
            .is_err());
    }

    #[test]
    fn blank_detection() {
        assert!(FieldValue::Null.is_blank());
        assert!(FieldValue::from("   ").is_blank());
        assert!(!FieldValue::from("   ").is_null_or_empty());
        assert!(FieldValue::from("").is_null_or_empty());
        assert!(!FieldValue::Int(0).is_blank());
    }

    #[test]
    fn parse_decimal_and_date_bounds() {
        assert_eq!(
            FieldValue::parse_as("12.50", ConvertToType::Decimal).unwrap(),
            FieldValue::Decimal(Decimal::new(1250, 2))
        );
        assert_eq!(
            FieldValue::parse_as("2020-02-29", ConvertToType::Date).unwrap(),
            FieldValue::Date(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap())
        );
        assert_eq!(
            FieldValue::parse_as("12/31/1999", ConvertToType::Date).unwrap(),
            FieldValue::Date(NaiveDate::from_ymd_opt(1999, 12, 31).unwrap())
        );
        assert!(FieldValue::parse_as("not a date", ConvertToType::Date).is_err());
        assert!(FieldValue::parse_as("1.2.3", ConvertToType::Decimal).is_err());
    }

    #[test]
    fn json_conversion() {
        assert_eq!(FieldValue::from_json(&json!(7)), FieldValue::Int(7));
        assert_eq!(FieldValue::from_json(&json!(1.5)), FieldValue::Float(1.5));
        assert_eq!(FieldValue::from_json(&json!(null)), FieldValue::Null);
        assert_eq!(FieldValue::from_json(&json!("x")), FieldValue::from("x"));
        assert_eq!(FieldValue::from("x").to_json(), json!("x"));
    }

    #[test]
    fn option_conversion() {
        assert_eq!(FieldValue::from(None::<i32>), FieldValue::Null);
        assert_eq!(FieldValue::from(Some(3_i32)), FieldValue::Int(3));
        assert_eq!(FieldValue::Null.to_string(), "Null");
        assert_eq!(FieldValue::Bool(true).to_string(), "True");
    }
}

//! XMP property value types
//!
//! Typed values accepted by `set_property`. Each variant is dispatched to
//! the matching typed setter of the engine.

use crate::core::error::{XmpError, XmpResult};
use crate::utils::datetime::XmpDateTime;
use std::fmt;

/// Typed property value
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// String value
    String(String),
    /// 32-bit integer value
    Int32(i32),
    /// 64-bit integer value
    Int64(i64),
    /// Floating point value
    Float(f64),
    /// Boolean value
    Bool(bool),
    /// Date/time value
    DateTime(XmpDateTime),
}

impl PropertyValue {
    /// Build a value from a type name and its textual form
    ///
    /// Type names are `string`, `bool`, `int`, `int64`, `float` and `date`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use xmpbridge::PropertyValue;
    ///
    /// let value = PropertyValue::from_typed("int", "42").unwrap();
    /// assert_eq!(value, PropertyValue::Int32(42));
    /// assert!(PropertyValue::from_typed("int", "forty-two").is_err());
    /// ```
    pub fn from_typed(kind: &str, raw: &str) -> XmpResult<Self> {
        let bad = |what: &str| XmpError::Argument(format!("Invalid {} value: {}", what, raw));
        match kind.to_ascii_lowercase().as_str() {
            "string" | "str" => Ok(PropertyValue::String(raw.to_string())),
            "bool" | "boolean" => match raw.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(PropertyValue::Bool(true)),
                "false" | "0" | "no" => Ok(PropertyValue::Bool(false)),
                _ => Err(bad("bool")),
            },
            "int" | "int32" => raw
                .trim()
                .parse()
                .map(PropertyValue::Int32)
                .map_err(|_| bad("int32")),
            "int64" | "long" => raw
                .trim()
                .parse()
                .map(PropertyValue::Int64)
                .map_err(|_| bad("int64")),
            "float" | "double" => raw
                .trim()
                .parse()
                .map(PropertyValue::Float)
                .map_err(|_| bad("float")),
            "date" | "datetime" => XmpDateTime::parse(raw)
                .map(PropertyValue::DateTime)
                .map_err(|_| bad("date")),
            other => Err(XmpError::Argument(format!(
                "Unknown property type: {}",
                other
            ))),
        }
    }

    /// Name of the variant, as accepted by [`PropertyValue::from_typed`]
    pub fn kind(&self) -> &'static str {
        match self {
            PropertyValue::String(_) => "string",
            PropertyValue::Int32(_) => "int",
            PropertyValue::Int64(_) => "int64",
            PropertyValue::Float(_) => "float",
            PropertyValue::Bool(_) => "bool",
            PropertyValue::DateTime(_) => "date",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PropertyValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// Textual encoding used when a typed value is stored as XMP
///
/// Booleans are `True`/`False`, floats carry six decimals and dates use
/// the XMP ISO 8601 profile.
impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::String(s) => write!(f, "{}", s),
            PropertyValue::Int32(i) => write!(f, "{}", i),
            PropertyValue::Int64(i) => write!(f, "{}", i),
            PropertyValue::Float(v) => write!(f, "{:.6}", v),
            PropertyValue::Bool(true) => write!(f, "True"),
            PropertyValue::Bool(false) => write!(f, "False"),
            PropertyValue::DateTime(dt) => write!(f, "{}", dt),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        PropertyValue::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        PropertyValue::String(s.to_string())
    }
}

impl From<i32> for PropertyValue {
    fn from(i: i32) -> Self {
        PropertyValue::Int32(i)
    }
}

impl From<i64> for PropertyValue {
    fn from(i: i64) -> Self {
        PropertyValue::Int64(i)
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<bool> for PropertyValue {
    fn from(b: bool) -> Self {
        PropertyValue::Bool(b)
    }
}

impl From<XmpDateTime> for PropertyValue {
    fn from(dt: XmpDateTime) -> Self {
        PropertyValue::DateTime(dt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_encodings() {
        assert_eq!(PropertyValue::Bool(true).to_string(), "True");
        assert_eq!(PropertyValue::Bool(false).to_string(), "False");
        assert_eq!(PropertyValue::Float(42.42).to_string(), "42.420000");
        assert_eq!(PropertyValue::Int64(-7).to_string(), "-7");
    }

    #[test]
    fn test_from_typed() {
        assert_eq!(
            PropertyValue::from_typed("bool", "TRUE").unwrap(),
            PropertyValue::Bool(true)
        );
        assert_eq!(
            PropertyValue::from_typed("int64", "9000000000").unwrap(),
            PropertyValue::Int64(9_000_000_000)
        );
        let date = PropertyValue::from_typed("date", "2024-01-02T03:04:05Z").unwrap();
        assert_eq!(date.to_string(), "2024-01-02T03:04:05Z");
        assert_eq!(date.kind(), "date");
    }

    #[test]
    fn test_from_typed_errors() {
        assert!(matches!(
            PropertyValue::from_typed("int", "3000000000"),
            Err(XmpError::Argument(_))
        ));
        assert!(matches!(
            PropertyValue::from_typed("complex", "1+2i"),
            Err(XmpError::Argument(_))
        ));
        assert!(matches!(
            PropertyValue::from_typed("date", "2024-01-02T03:04+a\u{e9}1"),
            Err(XmpError::Argument(_))
        ));
    }
}

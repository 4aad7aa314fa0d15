//! Conversions between Rust field types and [`Value`].
//!
//! `#[derive(FormEntity)]` generates accessors that go through this trait, so
//! every described field type must implement it. `#[derive(FormEnum)]` and
//! `#[derive(FormEntity)]` provide the impls for enums and referenced
//! entities respectively.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::core::{ConversionError, FieldType, Value};

pub trait FieldValue: Sized {
    /// Whether the field may hold "no value" (`Option<T>`).
    const NULLABLE: bool = false;

    fn field_type() -> FieldType;

    fn to_value(&self) -> Value;

    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

macro_rules! integer_field_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                fn field_type() -> FieldType {
                    FieldType::Integer
                }

                fn to_value(&self) -> Value {
                    Value::Integer(i64::from(*self))
                }

                fn from_value(value: Value) -> Result<Self, ConversionError> {
                    let raw = match value {
                        Value::Integer(i) => i,
                        Value::Float(f) => Value::Float(f).as_i64().ok_or_else(|| {
                            ConversionError::new(format!("{} is not a whole number", f))
                        })?,
                        Value::Text(s) => s.trim().parse::<i64>().map_err(|_| {
                            ConversionError::new(format!("'{}' is not a whole number", s))
                        })?,
                        Value::Null => return Err(ConversionError::new("a value is required")),
                        other => {
                            return Err(ConversionError::mismatch("INTEGER", other.type_name()));
                        }
                    };
                    <$ty>::try_from(raw).map_err(|_| {
                        ConversionError::new(format!(
                            "{} is out of range for {}",
                            raw,
                            stringify!($ty)
                        ))
                    })
                }
            }
        )*
    };
}

integer_field_value!(i8, i16, i32, i64, u8, u16, u32);

impl FieldValue for f64 {
    fn field_type() -> FieldType {
        FieldType::Float
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Float(f) => Ok(f),
            Value::Integer(i) => Ok(i as f64),
            Value::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| ConversionError::new(format!("'{}' is not a number", s))),
            Value::Null => Err(ConversionError::new("a value is required")),
            other => Err(ConversionError::mismatch("FLOAT", other.type_name())),
        }
    }
}

impl FieldValue for f32 {
    fn field_type() -> FieldType {
        FieldType::Float
    }

    fn to_value(&self) -> Value {
        Value::Float(f64::from(*self))
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        f64::from_value(value).map(|f| f as f32)
    }
}

impl FieldValue for Decimal {
    fn field_type() -> FieldType {
        FieldType::Decimal
    }

    fn to_value(&self) -> Value {
        Value::Decimal(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Decimal(d) => Ok(d),
            Value::Integer(i) => Ok(Decimal::from(i)),
            Value::Float(f) => Decimal::try_from(f)
                .map_err(|_| ConversionError::new(format!("{} is not a valid decimal", f))),
            Value::Text(s) => Decimal::from_str(s.trim())
                .map_err(|_| ConversionError::new(format!("'{}' is not a valid decimal", s))),
            Value::Null => Err(ConversionError::new("a value is required")),
            other => Err(ConversionError::mismatch("DECIMAL", other.type_name())),
        }
    }
}

impl FieldValue for bool {
    fn field_type() -> FieldType {
        FieldType::Boolean
    }

    fn to_value(&self) -> Value {
        Value::Boolean(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Boolean(b) => Ok(b),
            Value::Null => Ok(false),
            Value::Text(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(true),
                "false" | "no" | "0" => Ok(false),
                _ => Err(ConversionError::new(format!("'{}' is not a boolean", s))),
            },
            other => Err(ConversionError::mismatch("BOOLEAN", other.type_name())),
        }
    }
}

impl FieldValue for String {
    fn field_type() -> FieldType {
        FieldType::Text
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(s) => Ok(s),
            Value::Null => Ok(String::new()),
            other => Err(ConversionError::mismatch("TEXT", other.type_name())),
        }
    }
}

impl FieldValue for NaiveDate {
    fn field_type() -> FieldType {
        FieldType::Date
    }

    fn to_value(&self) -> Value {
        Value::Date(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Date(d) => Ok(d),
            Value::DateTime(dt) => Ok(dt.date()),
            Value::Text(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                .map_err(|_| ConversionError::new(format!("'{}' is not a date (YYYY-MM-DD)", s))),
            Value::Null => Err(ConversionError::new("a value is required")),
            other => Err(ConversionError::mismatch("DATE", other.type_name())),
        }
    }
}

impl FieldValue for NaiveDateTime {
    fn field_type() -> FieldType {
        FieldType::DateTime
    }

    fn to_value(&self) -> Value {
        Value::DateTime(*self)
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::DateTime(dt) => Ok(dt),
            Value::Text(s) => parse_date_time(&s),
            Value::Null => Err(ConversionError::new("a value is required")),
            other => Err(ConversionError::mismatch("DATETIME", other.type_name())),
        }
    }
}

impl FieldValue for DateTime<Utc> {
    fn field_type() -> FieldType {
        FieldType::DateTime
    }

    fn to_value(&self) -> Value {
        Value::DateTime(self.naive_utc())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        NaiveDateTime::from_value(value).map(|naive| Utc.from_utc_datetime(&naive))
    }
}

impl FieldValue for serde_json::Value {
    fn field_type() -> FieldType {
        FieldType::Other {
            rust_type: "serde_json::Value",
        }
    }

    fn to_value(&self) -> Value {
        Value::Json(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Json(json) => Ok(json),
            Value::Null => Ok(serde_json::Value::Null),
            other => Err(ConversionError::mismatch("JSON", other.type_name())),
        }
    }
}

impl<T: FieldValue> FieldValue for Option<T> {
    const NULLABLE: bool = true;

    fn field_type() -> FieldType {
        T::field_type()
    }

    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: FieldValue> FieldValue for Vec<T> {
    fn field_type() -> FieldType {
        FieldType::Collection(Box::new(T::field_type()))
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(FieldValue::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::List(items) => items.into_iter().map(T::from_value).collect(),
            Value::Null => Ok(Vec::new()),
            other => Err(ConversionError::mismatch("LIST", other.type_name())),
        }
    }
}

/// Parses the date-time forms accepted in default values and text input.
pub fn parse_date_time(text: &str) -> Result<NaiveDateTime, ConversionError> {
    const FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];
    let trimmed = text.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| ConversionError::new(format!("'{}' is not a date-time", text)))
}

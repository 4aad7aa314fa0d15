use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{Level, event};

use crate::core::ConversionError;
use crate::meta::EntityModel;

/// Dynamic value exchanged between entities, the binder, widgets and services.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Enum(String),
    Entity(EntityValue),
    List(Vec<Value>),
    Json(serde_json::Value),
}

/// Snapshot of a referenced entity: enough to show it and to rebuild it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityValue {
    pub type_name: String,
    pub id: Option<i64>,
    pub display: String,
    #[serde(default)]
    pub color: Option<String>,
    pub data: serde_json::Value,
}

impl EntityValue {
    pub fn from_model<E: EntityModel + Serialize>(model: &E) -> Self {
        let data = serde_json::to_value(model).unwrap_or_else(|err| {
            event!(
                Level::WARN,
                entity = E::entity_name(),
                error = %err,
                "entity snapshot serialization failed"
            );
            serde_json::Value::Null
        });

        Self {
            type_name: E::entity_name().to_string(),
            id: model.entity_id(),
            display: model.display_text(),
            color: model.color(),
            data,
        }
    }

    pub fn to_model<E: EntityModel + DeserializeOwned>(&self) -> Result<E, ConversionError> {
        if self.type_name != E::entity_name() {
            return Err(ConversionError::mismatch(E::entity_name(), &self.type_name));
        }
        serde_json::from_value(self.data.clone()).map_err(|err| {
            ConversionError::new(format!(
                "cannot restore {} from snapshot: {}",
                self.type_name, err
            ))
        })
    }

    pub fn is_a(&self, type_name: &str) -> bool {
        self.type_name == type_name
    }
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Null => "NULL",
            Self::Boolean(_) => "BOOLEAN",
            Self::Integer(_) => "INTEGER",
            Self::Float(_) => "FLOAT",
            Self::Decimal(_) => "DECIMAL",
            Self::Text(_) => "TEXT",
            Self::Date(_) => "DATE",
            Self::DateTime(_) => "DATETIME",
            Self::Enum(_) => "ENUM",
            Self::Entity(_) => "ENTITY",
            Self::List(_) => "LIST",
            Self::Json(_) => "JSON",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Null, empty text and empty lists all count as "no value" for
    /// required-field checks.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(s) => s.is_empty(),
            Self::List(items) => items.is_empty(),
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            Self::Float(f) => {
                if f.is_finite() && f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            Self::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&EntityValue> {
        match self {
            Self::Entity(entity) => Some(entity),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Human readable text used for option labels and grid cells.
    pub fn display_text(&self) -> String {
        match self {
            Self::Null => String::new(),
            Self::Entity(entity) => entity.display.clone(),
            Self::List(items) => items
                .iter()
                .map(Value::display_text)
                .collect::<Vec<_>>()
                .join(", "),
            other => other.to_string(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => {
                if a.is_nan() && b.is_nan() {
                    return true;
                }
                (a - b).abs() < f64::EPSILON
            }
            (Self::Decimal(a), Self::Decimal(b)) => a == b,
            (Self::Text(a), Self::Text(b)) => a == b,
            (Self::Date(a), Self::Date(b)) => a == b,
            (Self::DateTime(a), Self::DateTime(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Entity(a), Self::Entity(b)) => {
                // Same persisted row: compare identity when both sides have one.
                match (a.id, b.id) {
                    (Some(x), Some(y)) => a.type_name == b.type_name && x == y,
                    _ => a == b,
                }
            }
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Json(a), Self::Json(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Float(fl) => write!(f, "{}", fl),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Text(s) | Self::Enum(s) => write!(f, "{}", s),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Self::Entity(entity) => write!(f, "{}", entity.display),
            Self::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Self::Json(json) => write!(f, "{}", json),
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Self::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Self::Decimal(d)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Self::Date(d)
    }
}

impl From<EntityValue> for Value {
    fn from(entity: EntityValue) -> Self {
        Self::Entity(entity)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::List(items)
    }
}

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::{Level, event};

use crate::config::EngineConfig;
use crate::core::{FieldType, Value};
use crate::meta::{EntityModel, FieldDescriptor, FieldMeta};

lazy_static! {
    static ref WIDTH_PATTERN: Regex = Regex::new(r"^\d+(\.\d+)?(px|%|em|rem)$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Entity,
    MultiValue,
    Id,
    Integer,
    Decimal,
    Date,
    DateTime,
    Boolean,
    LongText,
    ShortText,
    Generic,
    /// Fallback when a typed column could not be built.
    Property,
}

/// Rendered cell content.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    pub text: String,
    pub color: Option<String>,
}

impl Cell {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub key: String,
    pub header: String,
    pub kind: ColumnKind,
    pub width: Option<String>,
    preview_chars: usize,
}

/// Why a typed column could not be built for a field.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColumnError {
    #[error("invalid column width '{width}'")]
    InvalidWidth { width: String },

    #[error("no cell renderer for {rust_type}")]
    NoRenderer { rust_type: &'static str },
}

pub fn select_column_kind(
    descriptor: &FieldDescriptor,
    meta: &FieldMeta,
    config: &EngineConfig,
    id_pattern: &Regex,
) -> Result<ColumnKind, ColumnError> {
    let name = descriptor.name;
    let kind = match &descriptor.field_type {
        FieldType::Entity { .. } => ColumnKind::Entity,
        FieldType::Collection(_) => ColumnKind::MultiValue,
        FieldType::Integer if id_pattern.is_match(name) => ColumnKind::Id,
        FieldType::Integer => ColumnKind::Integer,
        FieldType::Decimal => ColumnKind::Decimal,
        FieldType::Date => ColumnKind::Date,
        FieldType::DateTime => ColumnKind::DateTime,
        FieldType::Boolean => ColumnKind::Boolean,
        FieldType::Text
            if config.is_long_text_name(name) || meta.max_length > config.grid_long_text_length =>
        {
            ColumnKind::LongText
        }
        FieldType::Text => ColumnKind::ShortText,
        FieldType::Float | FieldType::Enum { .. } => ColumnKind::Generic,
        FieldType::Other { rust_type } => {
            return Err(ColumnError::NoRenderer {
                rust_type: *rust_type,
            });
        }
    };
    Ok(kind)
}

impl Column {
    /// Build a typed column; any construction failure degrades to a property column.
    pub fn build(descriptor: &FieldDescriptor, config: &EngineConfig, id_pattern: &Regex) -> Self {
        Self::try_build(descriptor, config, id_pattern).unwrap_or_else(|err| {
            event!(
                Level::WARN,
                field = descriptor.name,
                error = %err,
                "typed column not built, using a plain property column"
            );
            Self::property(descriptor.name, config)
        })
    }

    pub fn try_build(
        descriptor: &FieldDescriptor,
        config: &EngineConfig,
        id_pattern: &Regex,
    ) -> Result<Self, ColumnError> {
        let meta = descriptor.effective_meta();
        let kind = select_column_kind(descriptor, &meta, config, id_pattern)?;
        let width = match meta.explicit_width() {
            Some(width) if !WIDTH_PATTERN.is_match(width) => {
                return Err(ColumnError::InvalidWidth {
                    width: width.to_string(),
                });
            }
            width => width.map(str::to_string),
        };

        Ok(Self {
            key: descriptor.name.to_string(),
            header: meta.display_name.clone(),
            kind,
            width,
            preview_chars: config.long_text_preview_chars,
        })
    }

    pub fn property(field: &str, config: &EngineConfig) -> Self {
        Self {
            key: field.to_string(),
            header: field.to_string(),
            kind: ColumnKind::Property,
            width: None,
            preview_chars: config.long_text_preview_chars,
        }
    }

    pub fn render<E: EntityModel>(&self, row: &E) -> Cell {
        match row.get_field(&self.key) {
            Ok(value) => self.render_value(&value),
            Err(err) => {
                event!(Level::DEBUG, column = %self.key, error = %err, "cell not readable");
                Cell::default()
            }
        }
    }

    pub fn render_value(&self, value: &Value) -> Cell {
        if value.is_null() {
            return Cell::default();
        }
        match (self.kind, value) {
            (ColumnKind::Entity, Value::Entity(entity)) => Cell {
                text: entity.display.clone(),
                color: entity.color.clone(),
            },
            (ColumnKind::Id, Value::Integer(id)) => Cell::text(format!("#{}", id)),
            (ColumnKind::Decimal, Value::Decimal(d)) => Cell::text(format!("{:.2}", d.round_dp(2))),
            (ColumnKind::Date, Value::Date(d)) => Cell::text(d.format("%Y-%m-%d").to_string()),
            (ColumnKind::DateTime, Value::DateTime(dt)) => {
                Cell::text(dt.format("%Y-%m-%d %H:%M").to_string())
            }
            (ColumnKind::Boolean, Value::Boolean(b)) => Cell::text(if *b { "Yes" } else { "No" }),
            (ColumnKind::LongText, Value::Text(text)) => Cell::text(truncate(text, self.preview_chars)),
            (_, other) => Cell::text(other.display_text()),
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max_chars).collect();
    cut.push_str("...");
    cut
}

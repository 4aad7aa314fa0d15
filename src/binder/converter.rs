use std::str::FromStr;

use rust_decimal::Decimal;

use crate::core::{ConversionError, FieldType, Value};
use crate::widget::WidgetKind;

/// Largest integer magnitude an `f64` holds exactly.
const MAX_EXACT_FLOAT_INT: u64 = 1 << 53;

/// Translates between a model value and what its widget displays.
#[derive(Debug, Clone, PartialEq)]
pub enum Converter {
    Identity,
    /// Text fields. An absent value stays `Null` in the widget, so empty and
    /// absent text stay distinct.
    OptionalText,
    /// Integer model values shown in a floating point number widget; values
    /// an `f64` cannot hold exactly are shown as text.
    IntegerToNumber,
    /// Decimals shown as text so no precision is lost.
    DecimalToText,
    /// Enum constants shown by label.
    EnumToLabel {
        type_name: &'static str,
        constants: &'static [&'static str],
    },
}

impl Converter {
    /// Converter the form builder pairs with `kind` for a field of `field_type`.
    pub fn for_widget(kind: WidgetKind, field_type: &FieldType) -> Self {
        match (kind, field_type) {
            (WidgetKind::TextField | WidgetKind::TextArea | WidgetKind::TextSelect, _) => {
                Self::OptionalText
            }
            (WidgetKind::IntegerField, _) => Self::IntegerToNumber,
            (WidgetKind::DecimalField, _) => Self::DecimalToText,
            (
                WidgetKind::EnumSelect | WidgetKind::RadioGroup,
                FieldType::Enum {
                    type_name,
                    constants,
                },
            ) => Self::EnumToLabel {
                type_name: *type_name,
                constants: *constants,
            },
            _ => Self::Identity,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::OptionalText => "optional-text",
            Self::IntegerToNumber => "integer-to-number",
            Self::DecimalToText => "decimal-to-text",
            Self::EnumToLabel { .. } => "enum-to-label",
        }
    }

    /// Whether this converter can serve a field of `field_type`.
    pub fn check(&self, field_type: &FieldType) -> Result<(), String> {
        let compatible = match self {
            Self::Identity => true,
            Self::OptionalText => field_type.is_text(),
            Self::IntegerToNumber => field_type.is_integral(),
            Self::DecimalToText => matches!(field_type, FieldType::Decimal),
            Self::EnumToLabel { type_name, .. } => matches!(
                field_type,
                FieldType::Enum { type_name: declared, .. } if declared == type_name
            ),
        };
        if compatible {
            Ok(())
        } else {
            Err(format!("field type is {}", field_type))
        }
    }

    pub fn to_presentation(&self, value: Value) -> Result<Value, ConversionError> {
        match (self, value) {
            (Self::Identity, value) => Ok(value),
            (Self::OptionalText, value @ Value::Text(_)) => Ok(value),
            (Self::IntegerToNumber, Value::Integer(i)) if i.unsigned_abs() <= MAX_EXACT_FLOAT_INT => {
                Ok(Value::Float(i as f64))
            }
            (Self::IntegerToNumber, Value::Integer(i)) => Ok(Value::Text(i.to_string())),
            (Self::DecimalToText, Value::Decimal(d)) => Ok(Value::Text(d.to_string())),
            (Self::EnumToLabel { .. }, Value::Enum(name)) => Ok(Value::Text(name)),
            (_, Value::Null) => Ok(Value::Null),
            (converter, other) => Err(ConversionError::new(format!(
                "{} converter cannot display {}",
                converter.name(),
                other.type_name()
            ))),
        }
    }

    pub fn to_model(&self, value: Value, nullable: bool) -> Result<Value, ConversionError> {
        match self {
            Self::Identity => Ok(value),
            Self::OptionalText => match value {
                Value::Null if !nullable => Ok(Value::Text(String::new())),
                value @ (Value::Text(_) | Value::Null) => Ok(value),
                other => Err(ConversionError::mismatch("TEXT", other.type_name())),
            },
            Self::IntegerToNumber => match value {
                Value::Float(f) => Value::Float(f)
                    .as_i64()
                    .map(Value::Integer)
                    .ok_or_else(|| ConversionError::new(format!("{} is not a whole number", f))),
                value @ (Value::Integer(_) | Value::Null) => Ok(value),
                Value::Text(text) if text.trim().is_empty() => Ok(Value::Null),
                Value::Text(text) => text
                    .trim()
                    .parse::<i64>()
                    .map(Value::Integer)
                    .map_err(|_| ConversionError::new(format!("'{}' is not a whole number", text))),
                other => Err(ConversionError::mismatch("INTEGER", other.type_name())),
            },
            Self::DecimalToText => match value {
                Value::Text(text) if text.trim().is_empty() => Ok(Value::Null),
                Value::Text(text) => Decimal::from_str(text.trim())
                    .map(Value::Decimal)
                    .map_err(|_| ConversionError::new(format!("'{}' is not a valid decimal", text))),
                value @ (Value::Decimal(_) | Value::Null) => Ok(value),
                other => Err(ConversionError::mismatch("DECIMAL", other.type_name())),
            },
            Self::EnumToLabel {
                type_name,
                constants,
            } => match value {
                Value::Text(label) | Value::Enum(label) => {
                    if label.is_empty() {
                        Ok(Value::Null)
                    } else if constants.contains(&label.as_str()) {
                        Ok(Value::Enum(label))
                    } else {
                        Err(ConversionError::new(format!(
                            "'{}' is not a constant of {}",
                            label, type_name
                        )))
                    }
                }
                Value::Null => Ok(Value::Null),
                other => Err(ConversionError::mismatch("ENUM", other.type_name())),
            },
        }
    }
}

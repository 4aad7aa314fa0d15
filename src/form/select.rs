use crate::config::EngineConfig;
use crate::core::{FieldType, FormError, Result};
use crate::meta::{FieldDescriptor, FieldMeta};
use crate::widget::WidgetKind;

/// Pick the widget for a field. Precedence: provider-backed selections first,
/// then the declared type. Types with no rule are rejected.
pub fn select_widget_kind(
    entity: &str,
    descriptor: &FieldDescriptor,
    meta: &FieldMeta,
    config: &EngineConfig,
) -> Result<WidgetKind> {
    let field_type = &descriptor.field_type;

    if meta.has_data_provider() && field_type.is_text() {
        return Ok(WidgetKind::TextSelect);
    }
    if meta.has_data_provider() || field_type.is_entity() {
        return Ok(WidgetKind::EntitySelect);
    }

    match field_type {
        FieldType::Boolean => Ok(WidgetKind::Toggle),
        FieldType::Text if meta.max_length >= config.long_text_threshold => Ok(WidgetKind::TextArea),
        FieldType::Text => Ok(WidgetKind::TextField),
        FieldType::Integer => Ok(WidgetKind::IntegerField),
        FieldType::Decimal => Ok(WidgetKind::DecimalField),
        FieldType::Float => Ok(WidgetKind::FloatField),
        FieldType::Date => Ok(WidgetKind::DatePicker),
        FieldType::DateTime => Ok(WidgetKind::DateTimePicker),
        FieldType::Enum { .. } if meta.use_radio_buttons => Ok(WidgetKind::RadioGroup),
        FieldType::Enum { .. } => Ok(WidgetKind::EnumSelect),
        FieldType::Entity { .. } => Ok(WidgetKind::EntitySelect),
        FieldType::Collection(_) | FieldType::Other { .. } => Err(FormError::UnsupportedFieldType {
            entity: entity.to_string(),
            field: descriptor.name.to_string(),
            rust_type: field_type.rust_type_name(),
        }),
    }
}

/// Spinner step for numeric widgets.
pub fn numeric_step(kind: WidgetKind) -> Option<f64> {
    match kind {
        WidgetKind::IntegerField => Some(1.0),
        WidgetKind::DecimalField | WidgetKind::FloatField => Some(0.01),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LEVELS: &[&str] = &["Low", "High"];

    fn kind_of(field_type: FieldType, meta: FieldMeta) -> Result<WidgetKind> {
        let descriptor = FieldDescriptor::new("f", "Task", field_type, false);
        select_widget_kind("Task", &descriptor, &meta, &EngineConfig::default())
    }

    #[test]
    fn test_provider_precedence() {
        let meta = FieldMeta::default().data_provider_bean("statuses");
        assert_eq!(kind_of(FieldType::Text, meta.clone()), Ok(WidgetKind::TextSelect));
        assert_eq!(kind_of(FieldType::Integer, meta), Ok(WidgetKind::EntitySelect));
        assert_eq!(
            kind_of(FieldType::Entity { type_name: "User" }, FieldMeta::default()),
            Ok(WidgetKind::EntitySelect)
        );
    }

    #[test]
    fn test_type_rules() {
        let plain = FieldMeta::default;
        assert_eq!(kind_of(FieldType::Boolean, plain()), Ok(WidgetKind::Toggle));
        assert_eq!(kind_of(FieldType::Text, plain()), Ok(WidgetKind::TextField));
        assert_eq!(
            kind_of(FieldType::Text, plain().max_length(1000)),
            Ok(WidgetKind::TextArea)
        );
        assert_eq!(
            kind_of(FieldType::Text, plain().max_length(999)),
            Ok(WidgetKind::TextField)
        );
        assert_eq!(kind_of(FieldType::Integer, plain()), Ok(WidgetKind::IntegerField));
        assert_eq!(kind_of(FieldType::Decimal, plain()), Ok(WidgetKind::DecimalField));
        assert_eq!(kind_of(FieldType::Float, plain()), Ok(WidgetKind::FloatField));
        assert_eq!(kind_of(FieldType::Date, plain()), Ok(WidgetKind::DatePicker));
        assert_eq!(kind_of(FieldType::DateTime, plain()), Ok(WidgetKind::DateTimePicker));
    }

    #[test]
    fn test_enum_widgets() {
        let levels = FieldType::Enum {
            type_name: "Level",
            constants: LEVELS,
        };
        assert_eq!(kind_of(levels.clone(), FieldMeta::default()), Ok(WidgetKind::EnumSelect));
        assert_eq!(
            kind_of(levels, FieldMeta::default().use_radio_buttons(true)),
            Ok(WidgetKind::RadioGroup)
        );
    }

    #[test]
    fn test_unsupported_type_is_an_error() {
        let err = kind_of(
            FieldType::Other {
                rust_type: "serde_json::Value",
            },
            FieldMeta::default(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            FormError::UnsupportedFieldType {
                entity: "Task".into(),
                field: "f".into(),
                rust_type: "serde_json::Value".into(),
            }
        );
        assert!(kind_of(FieldType::Collection(Box::new(FieldType::Text)), FieldMeta::default()).is_err());
    }
}

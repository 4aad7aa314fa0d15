use tracing::{Level, event, info_span};

use crate::binder::{Binder, Converter};
use crate::config::EngineConfig;
use crate::core::{BindError, ConversionError, FieldType, FormError, Result, Value};
use crate::form::layout::{Container, FieldRow, Label};
use crate::form::select::{numeric_step, select_widget_kind};
use crate::meta::{EntityModel, FieldDescriptor, FieldMeta, FieldValue, ordered_visible_fields, parse_date_time};
use crate::provider::{DataProviderResolver, SelectOption, apply_selection_policy};
use crate::registry::Registry;
use crate::widget::{WidgetKind, WidgetRef, WidgetSpec, WidgetToolkit};

/// One constructed field and the outcome of binding it.
pub struct BuiltField {
    pub row: FieldRow,
    pub options: Vec<SelectOption>,
    pub binding: std::result::Result<(), BindError>,
}

/// Turns field metadata into labelled, bound widgets.
pub struct FormBuilder<'a> {
    registry: &'a Registry,
    config: &'a EngineConfig,
    toolkit: &'a dyn WidgetToolkit,
}

impl<'a> FormBuilder<'a> {
    pub fn new(registry: &'a Registry, config: &'a EngineConfig, toolkit: &'a dyn WidgetToolkit) -> Self {
        Self {
            registry,
            config,
            toolkit,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        self.config
    }

    /// Build a container for the visible fields of `E`, or for exactly
    /// `field_names` in the given order.
    pub fn build_form<E: EntityModel>(
        &self,
        binder: &mut Binder<E>,
        field_names: Option<&[&str]>,
    ) -> Result<Container> {
        let span = info_span!("form.build", entity = E::entity_name());
        let _enter = span.enter();

        let visible = ordered_visible_fields::<E>();
        let selected: Vec<&FieldDescriptor> = match field_names {
            None => visible,
            Some(names) => names
                .iter()
                .map(|name| {
                    visible
                        .iter()
                        .copied()
                        .find(|field| field.name == *name)
                        .ok_or_else(|| FormError::FieldNotFound {
                            entity: E::entity_name().to_string(),
                            field: name.to_string(),
                        })
                })
                .collect::<Result<_>>()?,
        };

        let mut container = Container::new();
        for descriptor in selected {
            let meta = descriptor.effective_meta();
            self.build_into(binder, &mut container, descriptor, &meta)?;
        }

        event!(
            Level::DEBUG,
            fields = container.len(),
            unbound = container.unbound().len(),
            "form built"
        );
        Ok(container)
    }

    /// Build one field and append it to `container`. Binding failures are
    /// recorded on the container; everything else aborts.
    pub fn build_into<E: EntityModel>(
        &self,
        binder: &mut Binder<E>,
        container: &mut Container,
        descriptor: &FieldDescriptor,
        meta: &FieldMeta,
    ) -> Result<()> {
        let built = self.build_field(binder, descriptor, meta)?;
        if let Err(error) = built.binding {
            container.record_unbound(descriptor.name, error);
        }
        container.push_field(built.row);
        Ok(())
    }

    pub fn build_field<E: EntityModel>(
        &self,
        binder: &mut Binder<E>,
        descriptor: &FieldDescriptor,
        meta: &FieldMeta,
    ) -> Result<BuiltField> {
        let field = descriptor.name;
        let kind = select_widget_kind(E::entity_name(), descriptor, meta, self.config)?;

        let provider_backed = matches!(kind, WidgetKind::TextSelect | WidgetKind::EntitySelect);
        let options = if provider_backed {
            DataProviderResolver::new(self.registry, self.config).resolve(descriptor, meta)?
        } else {
            enum_options(&descriptor.field_type)
        };

        let widget = self.create_widget(kind, descriptor, meta, &options)?;
        let converter = Converter::for_widget(kind, &descriptor.field_type);

        {
            let mut w = widget.borrow_mut();
            w.set_required_indicator(meta.required);
            w.set_read_only(meta.read_only || (kind.is_selection() && meta.combobox_read_only));

            if !provider_backed {
                if let Some(default) = meta.default_text() {
                    match parse_default(&descriptor.field_type, default)
                        .and_then(|value| converter.to_presentation(value))
                    {
                        Ok(value) => w.set_value(value),
                        Err(err) => event!(
                            Level::WARN,
                            field,
                            default_value = default,
                            error = %err,
                            "ignoring malformed default value"
                        ),
                    }
                }
            }

            w.set_width(meta.explicit_width().unwrap_or(self.config.full_width.as_str()));
        }

        let binding = binder
            .for_field(widget.clone(), field)
            .converter(converter)
            .required(meta.required)
            .bind(binder);
        if let Err(err) = &binding {
            event!(Level::WARN, field, error = %err, "binding failed, field left unbound");
        }

        if provider_backed {
            apply_selection_policy(field, meta, &options, &mut *widget.borrow_mut());
        }

        let row = FieldRow {
            field: field.to_string(),
            label: Label {
                text: meta.display_name.clone(),
                bold: meta.required,
                min_width: self.config.label_min_width.clone(),
            },
            kind,
            widget,
            meta: meta.clone(),
        };

        Ok(BuiltField {
            row,
            options,
            binding,
        })
    }

    fn create_widget(
        &self,
        kind: WidgetKind,
        descriptor: &FieldDescriptor,
        meta: &FieldMeta,
        options: &[SelectOption],
    ) -> Result<WidgetRef> {
        let mut spec = WidgetSpec::new(kind, descriptor.name, &meta.display_name);
        spec.step = numeric_step(kind);
        spec.min = meta.min;
        spec.max = meta.max;
        spec.max_length = usize::try_from(meta.max_length).ok().filter(|len| *len > 0);
        spec.allow_custom_value = kind.is_selection() && meta.allow_custom_value;
        spec.placeholder = meta.placeholder.clone();
        spec.helper_text = meta.description.clone();
        spec.options = options.to_vec();

        self.toolkit
            .create(&spec)
            .map_err(|message| FormError::WidgetConstruction {
                field: descriptor.name.to_string(),
                message,
            })
    }
}

fn enum_options(field_type: &FieldType) -> Vec<SelectOption> {
    match field_type {
        FieldType::Enum { constants, .. } => constants
            .iter()
            .map(|constant| SelectOption::new(Value::Text(constant.to_string()), *constant))
            .collect(),
        _ => Vec::new(),
    }
}

/// Parse a textual default into a model value of `field_type`.
pub fn parse_default(field_type: &FieldType, text: &str) -> std::result::Result<Value, ConversionError> {
    let text_value = Value::Text(text.to_string());
    match field_type {
        FieldType::Text => Ok(text_value),
        FieldType::Boolean => bool::from_value(text_value).map(Value::Boolean),
        FieldType::Integer => i64::from_value(text_value).map(Value::Integer),
        FieldType::Decimal => rust_decimal::Decimal::from_value(text_value).map(Value::Decimal),
        FieldType::Float => f64::from_value(text_value).map(Value::Float),
        FieldType::Date => chrono::NaiveDate::from_value(text_value).map(Value::Date),
        FieldType::DateTime => parse_date_time(text).map(Value::DateTime),
        FieldType::Enum {
            type_name,
            constants,
        } => constants
            .iter()
            .find(|constant| **constant == text.trim())
            .map(|constant| Value::Enum(constant.to_string()))
            .ok_or_else(|| ConversionError::new(format!("'{}' is not a constant of {}", text, type_name))),
        other => Err(ConversionError::new(format!(
            "defaults are not supported for {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default() {
        assert_eq!(parse_default(&FieldType::Integer, "42"), Ok(Value::Integer(42)));
        assert_eq!(parse_default(&FieldType::Boolean, "true"), Ok(Value::Boolean(true)));
        assert!(parse_default(&FieldType::Integer, "forty").is_err());
        assert!(parse_default(&FieldType::Date, "2024-13-40").is_err());
        assert_eq!(
            parse_default(
                &FieldType::Enum {
                    type_name: "Level",
                    constants: &["Low", "High"]
                },
                "High"
            ),
            Ok(Value::Enum("High".into()))
        );
    }

    #[test]
    fn test_enum_options() {
        let options = enum_options(&FieldType::Enum {
            type_name: "Level",
            constants: &["Low", "High"],
        });
        let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Low", "High"]);
        assert!(enum_options(&FieldType::Text).is_empty());
    }
}

//! Option lists for selection fields, fetched from named services.

pub mod policy;

pub use policy::{PolicyOutcome, apply_selection_policy};
pub use crate::widget::SelectOption;

use std::sync::Arc;

use tracing::{Level, event};

use crate::config::EngineConfig;
use crate::core::{FieldType, FormError, Result, Value};
use crate::meta::{DEFAULT_PROVIDER_METHOD, FieldDescriptor, FieldMeta};
use crate::registry::{InvokeError, LookupError, Registry, ServiceObject};

/// Element type a provider list is filtered down to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Expected {
    Entity(&'static str),
    Text,
}

impl Expected {
    fn of(field_type: &FieldType) -> Self {
        match field_type.entity_type_name() {
            Some(type_name) => Self::Entity(type_name),
            None => Self::Text,
        }
    }

    fn accepts(self, value: &Value) -> bool {
        match (self, value) {
            (Self::Entity(type_name), Value::Entity(entity)) => entity.is_a(type_name),
            (Self::Text, Value::Text(_)) => true,
            _ => false,
        }
    }
}

/// Resolves `data_provider_*` metadata into a list of options.
pub struct DataProviderResolver<'a> {
    registry: &'a Registry,
    config: &'a EngineConfig,
}

impl<'a> DataProviderResolver<'a> {
    pub fn new(registry: &'a Registry, config: &'a EngineConfig) -> Self {
        Self { registry, config }
    }

    /// All options for `field`. An empty list is returned when the bean is the
    /// no-provider sentinel.
    pub fn resolve(&self, field: &FieldDescriptor, meta: &FieldMeta) -> Result<Vec<SelectOption>> {
        let Some((bean, service)) = self.service_for(field, meta)? else {
            return Ok(Vec::new());
        };
        let method = provider_method(meta);

        let raw = match non_empty(meta.data_provider_param_method.as_deref()) {
            Some(param_method) => {
                let param = self.call(field, &bean, service.as_ref(), param_method, &[])?;
                self.call(field, &bean, service.as_ref(), method, &[param])?
            }
            None => self.call(field, &bean, service.as_ref(), method, &[])?,
        };

        let options = self.to_options(field, &bean, method, raw)?;
        event!(
            Level::DEBUG,
            field = field.name,
            service = %bean,
            method,
            options = options.len(),
            "data provider resolved"
        );
        Ok(options)
    }

    /// Options matching `text`. Uses the configured `filter_method` when there
    /// is one; otherwise filters the full list by label.
    pub fn resolve_filtered(
        &self,
        field: &FieldDescriptor,
        meta: &FieldMeta,
        text: &str,
    ) -> Result<Vec<SelectOption>> {
        if let Some(filter_method) = non_empty(meta.filter_method.as_deref()) {
            let Some((bean, service)) = self.service_for(field, meta)? else {
                return Ok(Vec::new());
            };
            let raw = self.call(
                field,
                &bean,
                service.as_ref(),
                filter_method,
                &[Value::Text(text.to_string())],
            )?;
            return self.to_options(field, &bean, filter_method, raw);
        }

        let needle = text.to_lowercase();
        Ok(self
            .resolve(field, meta)?
            .into_iter()
            .filter(|option| option.label.to_lowercase().contains(&needle))
            .collect())
    }

    fn service_for(
        &self,
        field: &FieldDescriptor,
        meta: &FieldMeta,
    ) -> Result<Option<(String, Arc<dyn ServiceObject>)>> {
        if let Some(bean) = meta.provider_bean() {
            if bean == self.config.no_provider_sentinel {
                event!(Level::DEBUG, field = field.name, "data provider disabled");
                return Ok(None);
            }
            let service = self
                .registry
                .require(bean)
                .map_err(|err| err.for_field(field.name))?;
            return Ok(Some((bean.to_string(), service)));
        }

        if let Some(class) = meta.provider_class() {
            return self
                .registry
                .lookup_by_type_name(class)
                .map(|(name, service)| Some((name.to_string(), service)))
                .ok_or_else(|| LookupError::NotFound(class.to_string()).for_field(field.name));
        }

        Err(FormError::MissingDataProvider {
            entity: field.declaring_entity.to_string(),
            field: field.name.to_string(),
        })
    }

    fn call(
        &self,
        field: &FieldDescriptor,
        bean: &str,
        service: &dyn ServiceObject,
        method: &str,
        args: &[Value],
    ) -> Result<Value> {
        service
            .invoke(method, args)
            .map_err(|err| invoke_error(field.name, bean, method, err))
    }

    fn to_options(
        &self,
        field: &FieldDescriptor,
        bean: &str,
        method: &str,
        raw: Value,
    ) -> Result<Vec<SelectOption>> {
        let Value::List(items) = raw else {
            return Err(FormError::ProviderResultNotList {
                field: field.name.to_string(),
                service: bean.to_string(),
                method: method.to_string(),
            });
        };

        let expected = Expected::of(&field.field_type);
        let total = items.len();
        let options: Vec<SelectOption> = items
            .into_iter()
            .filter(|item| expected.accepts(item))
            .map(SelectOption::from_value)
            .collect();

        if options.len() < total {
            event!(
                Level::DEBUG,
                field = field.name,
                dropped = total - options.len(),
                "provider returned elements of an unexpected type"
            );
        }
        Ok(options)
    }
}

pub(crate) fn invoke_error(field: &str, service: &str, method: &str, err: InvokeError) -> FormError {
    match err {
        InvokeError::MethodNotFound(_) => FormError::MethodNotFound {
            field: field.to_string(),
            service: service.to_string(),
            method: method.to_string(),
        },
        InvokeError::ArityMismatch { expected, got, .. } => FormError::MethodArity {
            field: field.to_string(),
            service: service.to_string(),
            method: method.to_string(),
            expected,
            got,
        },
        InvokeError::Failed(message) => FormError::ProviderInvocation {
            field: field.to_string(),
            service: service.to_string(),
            method: method.to_string(),
            message,
        },
    }
}

fn provider_method(meta: &FieldMeta) -> &str {
    non_empty(Some(meta.data_provider_method.as_str())).unwrap_or(DEFAULT_PROVIDER_METHOD)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EntityValue;
    use crate::registry::MethodService;

    fn owner_field() -> FieldDescriptor {
        FieldDescriptor::new(
            "owner",
            "Task",
            FieldType::Entity { type_name: "User" },
            true,
        )
    }

    fn status_field() -> FieldDescriptor {
        FieldDescriptor::new("status", "Task", FieldType::Text, false)
    }

    fn user(id: i64, name: &str) -> Value {
        Value::Entity(EntityValue {
            type_name: "User".into(),
            id: Some(id),
            display: name.into(),
            color: None,
            data: serde_json::Value::Null,
        })
    }

    fn registry() -> Registry {
        Registry::builder()
            .register(
                "users",
                MethodService::for_entity("User")
                    .method0("list", || {
                        Ok(Value::List(vec![
                            user(1, "Ada"),
                            Value::from("stray"),
                            user(2, "Grace"),
                        ]))
                    })
                    .method1("search", |text| {
                        let text = text.as_str().unwrap_or_default().to_string();
                        Ok(Value::List(vec![user(9, &format!("match {text}"))]))
                    }),
            )
            .register(
                "statuses",
                MethodService::new()
                    .method0("current_project", || Ok(Value::Integer(7)))
                    .method1("for_project", |project| {
                        let id = project.as_i64().unwrap_or_default();
                        Ok(Value::List(vec![Value::from(format!("Open-{id}"))]))
                    })
                    .method0("count", || Ok(Value::Integer(3))),
            )
            .build()
    }

    #[test]
    fn test_resolve_filters_mismatched_elements() {
        let registry = registry();
        let config = EngineConfig::default();
        let resolver = DataProviderResolver::new(&registry, &config);

        let options = resolver
            .resolve(&owner_field(), &FieldMeta::named("Owner").data_provider_bean("users"))
            .unwrap();
        let labels: Vec<_> = options.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(labels, vec!["Ada", "Grace"]);
    }

    #[test]
    fn test_param_method_feeds_data_method() {
        let registry = registry();
        let config = EngineConfig::default();
        let resolver = DataProviderResolver::new(&registry, &config);
        let meta = FieldMeta::named("Status")
            .data_provider_bean("statuses")
            .data_provider_method("for_project")
            .data_provider_param_method("current_project");

        let options = resolver.resolve(&status_field(), &meta).unwrap();
        assert_eq!(options, vec![SelectOption::from_value(Value::from("Open-7"))]);
    }

    #[test]
    fn test_sentinel_yields_empty() {
        let registry = Registry::empty();
        let config = EngineConfig::default();
        let resolver = DataProviderResolver::new(&registry, &config);
        let options = resolver
            .resolve(&owner_field(), &FieldMeta::named("Owner").data_provider_bean("none"))
            .unwrap();
        assert!(options.is_empty());
    }

    #[test]
    fn test_configuration_errors_name_the_field() {
        let registry = registry();
        let config = EngineConfig::default();
        let resolver = DataProviderResolver::new(&registry, &config);

        let err = resolver
            .resolve(&owner_field(), &FieldMeta::named("Owner").data_provider_bean("ghosts"))
            .unwrap_err();
        assert_eq!(
            err,
            FormError::ServiceNotFound {
                field: "owner".into(),
                service: "ghosts".into()
            }
        );

        let err = resolver
            .resolve(
                &owner_field(),
                &FieldMeta::named("Owner")
                    .data_provider_bean("users")
                    .data_provider_method("all"),
            )
            .unwrap_err();
        assert!(matches!(err, FormError::MethodNotFound { ref method, .. } if method == "all"));

        let err = resolver
            .resolve(
                &status_field(),
                &FieldMeta::named("Status")
                    .data_provider_bean("statuses")
                    .data_provider_method("count"),
            )
            .unwrap_err();
        assert!(matches!(err, FormError::ProviderResultNotList { .. }));

        let err = resolver
            .resolve(&owner_field(), &FieldMeta::named("Owner"))
            .unwrap_err();
        assert!(matches!(err, FormError::MissingDataProvider { .. }));
    }

    #[test]
    fn test_class_lookup() {
        let registry = registry();
        let config = EngineConfig::default();
        let resolver = DataProviderResolver::new(&registry, &config);
        let options = resolver
            .resolve(&owner_field(), &FieldMeta::named("Owner").data_provider_class("User"))
            .unwrap();
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn test_resolve_filtered() {
        let registry = registry();
        let config = EngineConfig::default();
        let resolver = DataProviderResolver::new(&registry, &config);

        let meta = FieldMeta::named("Owner").data_provider_bean("users");
        let options = resolver.resolve_filtered(&owner_field(), &meta, "gra").unwrap();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].label, "Grace");

        let meta = meta.filter_method("search");
        let options = resolver.resolve_filtered(&owner_field(), &meta, "x").unwrap();
        assert_eq!(options[0].label, "match x");
    }
}

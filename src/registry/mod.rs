//! Named service objects looked up by data providers and grid loaders.
//!
//! A [`Registry`] is assembled once with [`RegistryBuilder`] and then frozen;
//! reads need no locking and the registry can be shared across sessions as an
//! `Arc<Registry>`.

pub mod service;

pub use service::{InvokeError, MethodService, ServiceObject, entity_list};

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{Level, event};

use crate::core::FormError;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("service '{0}' is not registered")]
    NotFound(String),

    #[error("service '{service}' is registered but is not a '{expected}'")]
    WrongType { service: String, expected: String },
}

impl LookupError {
    /// Attach the field whose configuration triggered the lookup.
    pub fn for_field(self, field: &str) -> FormError {
        match self {
            Self::NotFound(service) => FormError::ServiceNotFound {
                field: field.to_string(),
                service,
            },
            Self::WrongType { service, expected } => {
                FormError::ServiceTypeMismatch { service, expected }
            }
        }
    }
}

struct Entry {
    service: Arc<dyn ServiceObject>,
    concrete: Arc<dyn Any + Send + Sync>,
    rust_type: &'static str,
}

#[derive(Default)]
pub struct RegistryBuilder {
    entries: IndexMap<String, Entry>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service` under `name`. A later registration with the same
    /// name replaces the earlier one.
    pub fn register<S: ServiceObject>(mut self, name: &str, service: S) -> Self {
        let service = Arc::new(service);
        let entry = Entry {
            service: service.clone(),
            concrete: service,
            rust_type: type_name::<S>(),
        };
        if self.entries.insert(name.to_string(), entry).is_some() {
            event!(Level::WARN, service = name, "service registered twice, keeping the last one");
        }
        self
    }

    pub fn build(self) -> Registry {
        event!(
            Level::INFO,
            services = self.entries.len(),
            "service registry frozen"
        );
        Registry {
            entries: self.entries,
        }
    }
}

/// Read-only name -> service lookup.
pub struct Registry {
    entries: IndexMap<String, Entry>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    pub fn empty() -> Self {
        RegistryBuilder::new().build()
    }

    pub fn lookup(&self, name: &str) -> Option<Arc<dyn ServiceObject>> {
        self.entries.get(name).map(|entry| entry.service.clone())
    }

    pub fn require(&self, name: &str) -> Result<Arc<dyn ServiceObject>, LookupError> {
        self.lookup(name)
            .ok_or_else(|| LookupError::NotFound(name.to_string()))
    }

    /// Look up a service and check its concrete type.
    pub fn lookup_typed<S: ServiceObject>(&self, name: &str) -> Result<Arc<S>, LookupError> {
        let entry = self
            .entries
            .get(name)
            .ok_or_else(|| LookupError::NotFound(name.to_string()))?;
        entry
            .concrete
            .clone()
            .downcast::<S>()
            .map_err(|_| LookupError::WrongType {
                service: name.to_string(),
                expected: type_name::<S>().to_string(),
            })
    }

    /// First service declaring it serves `entity_type`.
    pub fn lookup_by_type_name(
        &self,
        entity_type: &str,
    ) -> Option<(&str, Arc<dyn ServiceObject>)> {
        self.entries.iter().find_map(|(name, entry)| {
            (entry.service.entity_type() == Some(entity_type))
                .then(|| (name.as_str(), entry.service.clone()))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|(name, entry)| (name, entry.rust_type)),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;

    struct Counter;

    impl ServiceObject for Counter {
        fn invoke(&self, method: &str, _args: &[Value]) -> Result<Value, InvokeError> {
            match method {
                "count" => Ok(Value::Integer(3)),
                other => Err(InvokeError::MethodNotFound(other.to_string())),
            }
        }

        fn has_method(&self, method: &str) -> bool {
            method == "count"
        }
    }

    fn registry() -> Registry {
        Registry::builder()
            .register("counter", Counter)
            .register(
                "users",
                MethodService::for_entity("User").method0("list", || Ok(Value::List(vec![]))),
            )
            .build()
    }

    #[test]
    fn test_lookup_absent_vs_wrong_type() {
        let registry = registry();

        assert!(registry.lookup("counter").is_some());
        assert!(registry.lookup("missing").is_none());

        assert!(registry.lookup_typed::<Counter>("counter").is_ok());
        assert_eq!(
            registry.lookup_typed::<Counter>("missing").err(),
            Some(LookupError::NotFound("missing".to_string()))
        );
        assert!(matches!(
            registry.lookup_typed::<Counter>("users"),
            Err(LookupError::WrongType { .. })
        ));
    }

    #[test]
    fn test_lookup_by_type_name() {
        let registry = registry();
        let (name, service) = registry.lookup_by_type_name("User").unwrap();
        assert_eq!(name, "users");
        assert!(service.has_method("list"));
        assert!(registry.lookup_by_type_name("Project").is_none());
    }

    #[test]
    fn test_lookup_error_names_field() {
        let err = LookupError::NotFound("users".into()).for_field("owner");
        assert_eq!(err.field(), Some("owner"));
        assert!(err.to_string().contains("users"));
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Registry>();
        assert_eq!(registry().names(), vec!["counter", "users"]);
    }
}

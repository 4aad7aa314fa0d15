use indexmap::IndexMap;
use serde::Serialize;
use thiserror::Error;

use crate::core::{EntityValue, Value};
use crate::meta::EntityModel;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvokeError {
    #[error("method '{0}' not found")]
    MethodNotFound(String),

    #[error("method '{method}' expects {expected} argument(s), called with {got}")]
    ArityMismatch {
        method: String,
        expected: usize,
        got: usize,
    },

    #[error("{0}")]
    Failed(String),
}

/// A service callable by method name.
///
/// Data providers and grid loaders only know service and method names taken
/// from metadata, so every call goes through [`ServiceObject::invoke`].
pub trait ServiceObject: Send + Sync + 'static {
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, InvokeError>;

    fn has_method(&self, method: &str) -> bool;

    /// Number of arguments `method` takes, when known.
    fn arity(&self, _method: &str) -> Option<usize> {
        None
    }

    /// Services whose list queries are filtered by the active project.
    fn is_project_scoped(&self) -> bool {
        false
    }

    /// Entity type this service manages, used for class-based provider lookup.
    fn entity_type(&self) -> Option<&str> {
        None
    }
}

type Handler = Box<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

struct Method {
    arity: usize,
    handler: Handler,
}

/// [`ServiceObject`] assembled from named closures.
#[derive(Default)]
pub struct MethodService {
    entity_type: Option<String>,
    project_scoped: bool,
    methods: IndexMap<String, Method>,
}

impl MethodService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_entity(entity_type: &str) -> Self {
        Self {
            entity_type: Some(entity_type.to_string()),
            ..Self::default()
        }
    }

    pub fn project_scoped(mut self) -> Self {
        self.project_scoped = true;
        self
    }

    pub fn method0<F>(self, name: &str, f: F) -> Self
    where
        F: Fn() -> Result<Value, String> + Send + Sync + 'static,
    {
        self.with_method(name, 0, Box::new(move |_| f()))
    }

    pub fn method1<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.with_method(name, 1, Box::new(move |args| f(&args[0])))
    }

    pub fn method2<F>(self, name: &str, f: F) -> Self
    where
        F: Fn(&Value, &Value) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.with_method(name, 2, Box::new(move |args| f(&args[0], &args[1])))
    }

    fn with_method(mut self, name: &str, arity: usize, handler: Handler) -> Self {
        self.methods
            .insert(name.to_string(), Method { arity, handler });
        self
    }
}

impl ServiceObject for MethodService {
    fn invoke(&self, method: &str, args: &[Value]) -> Result<Value, InvokeError> {
        let entry = self
            .methods
            .get(method)
            .ok_or_else(|| InvokeError::MethodNotFound(method.to_string()))?;

        // handlers index args directly, so arity is enforced before the call
        if entry.arity != args.len() {
            return Err(InvokeError::ArityMismatch {
                method: method.to_string(),
                expected: entry.arity,
                got: args.len(),
            });
        }

        (entry.handler)(args).map_err(InvokeError::Failed)
    }

    fn has_method(&self, method: &str) -> bool {
        self.methods.contains_key(method)
    }

    fn arity(&self, method: &str) -> Option<usize> {
        self.methods.get(method).map(|entry| entry.arity)
    }

    fn is_project_scoped(&self) -> bool {
        self.project_scoped
    }

    fn entity_type(&self) -> Option<&str> {
        self.entity_type.as_deref()
    }
}

/// Snapshot a slice of entities into the list value services return.
pub fn entity_list<E: EntityModel + Serialize>(items: &[E]) -> Value {
    Value::List(
        items
            .iter()
            .map(|item| Value::Entity(EntityValue::from_model(item)))
            .collect(),
    )
}

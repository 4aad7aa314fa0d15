use thiserror::Error;

/// Configuration errors raised while building forms, screens and grids.
///
/// Every variant names the entity, field or configuration entry that caused
/// it; these messages are the primary diagnostic surface of a declarative UI.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FormError {
    #[error("Unsupported field type '{rust_type}' for field '{field}' on entity '{entity}'")]
    UnsupportedFieldType {
        entity: String,
        field: String,
        rust_type: String,
    },

    #[error("Field '{field}' not found on entity '{entity}'")]
    FieldNotFound { entity: String, field: String },

    #[error("Field '{field}' on entity '{entity}' references an entity type but has no data provider configured")]
    MissingDataProvider { entity: String, field: String },

    #[error("Service '{service}' required by field '{field}' is not registered")]
    ServiceNotFound { field: String, service: String },

    #[error("Service '{service}' is registered but is not a '{expected}'")]
    ServiceTypeMismatch { service: String, expected: String },

    #[error("Method '{method}' not found on service '{service}' (field '{field}')")]
    MethodNotFound {
        field: String,
        service: String,
        method: String,
    },

    #[error("Method '{method}' on service '{service}' (field '{field}') expects {expected} argument(s), called with {got}")]
    MethodArity {
        field: String,
        service: String,
        method: String,
        expected: usize,
        got: usize,
    },

    #[error("Method '{method}' on service '{service}' failed for field '{field}': {message}")]
    ProviderInvocation {
        field: String,
        service: String,
        method: String,
        message: String,
    },

    #[error("Method '{method}' on service '{service}' (field '{field}') did not return a list")]
    ProviderResultNotList {
        field: String,
        service: String,
        method: String,
    },

    #[error("Screen '{screen}' targets entity '{found}', expected '{expected}'")]
    EntityTypeMismatch {
        screen: String,
        expected: String,
        found: String,
    },

    #[error("Cannot convert value for field '{field}': {message}")]
    Conversion { field: String, message: String },

    #[error("Validation failed for field '{field}': {message}")]
    Validation { field: String, message: String },

    #[error("Widget construction failed for field '{field}': {message}")]
    WidgetConstruction { field: String, message: String },

    #[error("Invalid definition '{definition}': {message}")]
    InvalidDefinition { definition: String, message: String },

    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, FormError>;

/// Reasons a single widget could not be attached to the binder.
///
/// These never abort a build: the failing binding is removed and the rest of
/// the form stays usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BindError {
    #[error("Property '{property}' does not exist on entity '{entity}'")]
    UnknownProperty { entity: String, property: String },

    #[error("Property '{property}' is already bound")]
    AlreadyBound { property: String },

    #[error("Converter {converter} cannot handle property '{property}': {message}")]
    IncompatibleConverter {
        property: String,
        converter: String,
        message: String,
    },
}

/// A value that could not be turned into the requested Rust type.
///
/// Carries no field name; callers attach one with [`ConversionError::for_field`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ConversionError(pub String);

impl ConversionError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn mismatch(expected: &str, found: &str) -> Self {
        Self(format!("expected {expected}, got {found}"))
    }

    pub fn for_field(self, field: &str) -> FormError {
        FormError::Conversion {
            field: field.to_string(),
            message: self.0,
        }
    }
}

impl FormError {
    /// Returns the field this error points at, when it is field-scoped.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::UnsupportedFieldType { field, .. }
            | Self::FieldNotFound { field, .. }
            | Self::MissingDataProvider { field, .. }
            | Self::ServiceNotFound { field, .. }
            | Self::MethodNotFound { field, .. }
            | Self::MethodArity { field, .. }
            | Self::ProviderInvocation { field, .. }
            | Self::ProviderResultNotList { field, .. }
            | Self::Conversion { field, .. }
            | Self::Validation { field, .. }
            | Self::WidgetConstruction { field, .. } => Some(field),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_field() {
        let err = FormError::UnsupportedFieldType {
            entity: "Task".into(),
            field: "payload".into(),
            rust_type: "serde_json::Value".into(),
        };
        let message = err.to_string();
        assert!(message.contains("payload"));
        assert!(message.contains("serde_json::Value"));
        assert_eq!(err.field(), Some("payload"));
    }

    #[test]
    fn test_conversion_error_for_field() {
        let err = ConversionError::mismatch("INTEGER", "TEXT").for_field("estimate");
        assert_eq!(
            err,
            FormError::Conversion {
                field: "estimate".into(),
                message: "expected INTEGER, got TEXT".into(),
            }
        );
    }
}

use std::fmt;

/// Declared shape of an entity field.
///
/// Widget and column selection match on this exhaustively; `Other` is the
/// explicit "no handling rule" arm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Boolean,
    Text,
    Integer,
    Decimal,
    Float,
    Date,
    DateTime,
    Enum {
        type_name: &'static str,
        constants: &'static [&'static str],
    },
    Entity {
        type_name: &'static str,
    },
    Collection(Box<FieldType>),
    Other {
        rust_type: &'static str,
    },
}

impl FieldType {
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Text)
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, Self::Entity { .. })
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, Self::Integer)
    }

    /// Entity type name of a reference or of a collection's elements.
    pub fn entity_type_name(&self) -> Option<&'static str> {
        match self {
            Self::Entity { type_name } => Some(type_name),
            Self::Collection(inner) => inner.entity_type_name(),
            _ => None,
        }
    }

    pub fn rust_type_name(&self) -> String {
        match self {
            Self::Boolean => "bool".to_string(),
            Self::Text => "String".to_string(),
            Self::Integer => "integer".to_string(),
            Self::Decimal => "Decimal".to_string(),
            Self::Float => "float".to_string(),
            Self::Date => "NaiveDate".to_string(),
            Self::DateTime => "NaiveDateTime".to_string(),
            Self::Enum { type_name, .. } | Self::Entity { type_name } => type_name.to_string(),
            Self::Collection(inner) => format!("Vec<{}>", inner.rust_type_name()),
            Self::Other { rust_type } => rust_type.to_string(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "BOOLEAN"),
            Self::Text => write!(f, "TEXT"),
            Self::Integer => write!(f, "INTEGER"),
            Self::Decimal => write!(f, "DECIMAL"),
            Self::Float => write!(f, "FLOAT"),
            Self::Date => write!(f, "DATE"),
            Self::DateTime => write!(f, "DATETIME"),
            Self::Enum { type_name, .. } => write!(f, "ENUM({})", type_name),
            Self::Entity { type_name } => write!(f, "ENTITY({})", type_name),
            Self::Collection(inner) => write!(f, "LIST({})", inner),
            Self::Other { rust_type } => write!(f, "OTHER({})", rust_type),
        }
    }
}

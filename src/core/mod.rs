pub mod error;
pub mod types;
pub mod value;

pub use error::{BindError, ConversionError, FormError, Result};
pub use types::FieldType;
pub use value::{EntityValue, Value};

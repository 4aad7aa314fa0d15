//! Form and widget construction.

pub mod builder;
pub mod instance;
pub mod layout;
pub mod select;

pub use builder::{BuiltField, FormBuilder, parse_default};
pub use instance::BoundForm;
pub use layout::{Component, Container, FieldRow, Label, UnboundField};
pub use select::select_widget_kind;

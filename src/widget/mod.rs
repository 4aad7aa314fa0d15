//! Toolkit boundary: the small capability set the engine needs from a widget.
//!
//! Any UI toolkit can host generated forms by implementing [`WidgetToolkit`];
//! [`HeadlessToolkit`] is an in-memory implementation used by servers and tests.

pub mod headless;

pub use headless::{HeadlessToolkit, HeadlessWidget};

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::core::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    /// Selection over string options.
    TextSelect,
    /// Selection over entity options.
    EntitySelect,
    Toggle,
    TextArea,
    TextField,
    IntegerField,
    DecimalField,
    FloatField,
    DatePicker,
    DateTimePicker,
    RadioGroup,
    EnumSelect,
}

impl WidgetKind {
    pub fn is_selection(self) -> bool {
        matches!(
            self,
            Self::TextSelect | Self::EntitySelect | Self::RadioGroup | Self::EnumSelect
        )
    }

    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::IntegerField | Self::DecimalField | Self::FloatField
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::TextSelect => "text-select",
            Self::EntitySelect => "entity-select",
            Self::Toggle => "toggle",
            Self::TextArea => "text-area",
            Self::TextField => "text-field",
            Self::IntegerField => "integer-field",
            Self::DecimalField => "decimal-field",
            Self::FloatField => "float-field",
            Self::DatePicker => "date-picker",
            Self::DateTimePicker => "date-time-picker",
            Self::RadioGroup => "radio-group",
            Self::EnumSelect => "enum-select",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One selectable item: the value written to the model and its caption.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectOption {
    pub value: Value,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: Value, label: impl Into<String>) -> Self {
        Self {
            value,
            label: label.into(),
        }
    }

    /// Option whose label is the value's own display text.
    pub fn from_value(value: Value) -> Self {
        let label = value.display_text();
        Self { value, label }
    }
}

/// Everything a toolkit needs to construct a widget for one field.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetSpec {
    pub kind: WidgetKind,
    pub field: String,
    pub caption: String,
    pub step: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub max_length: Option<usize>,
    pub allow_custom_value: bool,
    pub placeholder: Option<String>,
    pub helper_text: Option<String>,
    pub options: Vec<SelectOption>,
}

impl WidgetSpec {
    pub fn new(kind: WidgetKind, field: &str, caption: &str) -> Self {
        Self {
            kind,
            field: field.to_string(),
            caption: caption.to_string(),
            step: None,
            min: None,
            max: None,
            max_length: None,
            allow_custom_value: false,
            placeholder: None,
            helper_text: None,
            options: Vec::new(),
        }
    }
}

pub trait Widget {
    fn kind(&self) -> WidgetKind;

    fn value(&self) -> Value;

    fn set_value(&mut self, value: Value);

    fn clear(&mut self) {
        self.set_value(Value::Null);
    }

    fn set_read_only(&mut self, read_only: bool);

    fn is_read_only(&self) -> bool;

    fn set_required_indicator(&mut self, visible: bool);

    fn is_required_indicator_visible(&self) -> bool;

    fn set_width(&mut self, width: &str);

    fn width(&self) -> Option<String>;

    /// Replace the option list of a selection widget. Other kinds ignore it.
    fn set_options(&mut self, _options: Vec<SelectOption>) {}

    fn options(&self) -> Vec<SelectOption> {
        Vec::new()
    }
}

/// Widgets are owned by one form and shared with its binder.
pub type WidgetRef = Rc<RefCell<dyn Widget>>;

pub trait WidgetToolkit {
    fn create(&self, spec: &WidgetSpec) -> Result<WidgetRef, String>;
}

use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;

use crate::core::Value;
use crate::widget::{SelectOption, Widget, WidgetKind, WidgetRef, WidgetSpec, WidgetToolkit};

/// A widget that only holds state.
#[derive(Debug, Clone)]
pub struct HeadlessWidget {
    spec: WidgetSpec,
    value: Value,
    read_only: bool,
    required_indicator: bool,
    width: Option<String>,
}

impl HeadlessWidget {
    pub fn new(spec: WidgetSpec) -> Self {
        Self {
            spec,
            value: Value::Null,
            read_only: false,
            required_indicator: false,
            width: None,
        }
    }

    pub fn spec(&self) -> &WidgetSpec {
        &self.spec
    }
}

impl Widget for HeadlessWidget {
    fn kind(&self) -> WidgetKind {
        self.spec.kind
    }

    fn value(&self) -> Value {
        self.value.clone()
    }

    fn set_value(&mut self, value: Value) {
        self.value = value;
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn is_read_only(&self) -> bool {
        self.read_only
    }

    fn set_required_indicator(&mut self, visible: bool) {
        self.required_indicator = visible;
    }

    fn is_required_indicator_visible(&self) -> bool {
        self.required_indicator
    }

    fn set_width(&mut self, width: &str) {
        self.width = Some(width.to_string());
    }

    fn width(&self) -> Option<String> {
        self.width.clone()
    }

    fn set_options(&mut self, options: Vec<SelectOption>) {
        if self.spec.kind.is_selection() {
            self.spec.options = options;
        }
    }

    fn options(&self) -> Vec<SelectOption> {
        self.spec.options.clone()
    }
}

/// Toolkit producing [`HeadlessWidget`]s.
#[derive(Debug, Clone, Default)]
pub struct HeadlessToolkit {
    unavailable: HashSet<WidgetKind>,
}

impl HeadlessToolkit {
    pub fn new() -> Self {
        Self::default()
    }

    /// A toolkit that refuses to construct `kind`.
    pub fn without(mut self, kind: WidgetKind) -> Self {
        self.unavailable.insert(kind);
        self
    }
}

impl WidgetToolkit for HeadlessToolkit {
    fn create(&self, spec: &WidgetSpec) -> Result<WidgetRef, String> {
        if self.unavailable.contains(&spec.kind) {
            return Err(format!("{} widgets are not available", spec.kind));
        }
        let widget: WidgetRef = Rc::new(RefCell::new(HeadlessWidget::new(spec.clone())));
        Ok(widget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_widget_state() {
        let toolkit = HeadlessToolkit::new();
        let widget = toolkit
            .create(&WidgetSpec::new(WidgetKind::TextField, "name", "Name"))
            .unwrap();

        {
            let mut widget = widget.borrow_mut();
            widget.set_value(Value::from("Alpha"));
            widget.set_read_only(true);
            widget.set_required_indicator(true);
            widget.set_width("50%");
        }

        let widget = widget.borrow();
        assert_eq!(widget.kind(), WidgetKind::TextField);
        assert_eq!(widget.value(), Value::from("Alpha"));
        assert!(widget.is_read_only());
        assert!(widget.is_required_indicator_visible());
        assert_eq!(widget.width().as_deref(), Some("50%"));
    }

    #[test]
    fn test_options_only_on_selection_widgets() {
        let mut select = HeadlessWidget::new(WidgetSpec::new(WidgetKind::TextSelect, "s", "S"));
        select.set_options(vec![SelectOption::from_value(Value::from("A"))]);
        assert_eq!(select.options().len(), 1);

        let mut text = HeadlessWidget::new(WidgetSpec::new(WidgetKind::TextField, "t", "T"));
        text.set_options(vec![SelectOption::from_value(Value::from("A"))]);
        assert!(text.options().is_empty());
    }

    #[test]
    fn test_unavailable_kind() {
        let toolkit = HeadlessToolkit::new().without(WidgetKind::DatePicker);
        assert!(toolkit
            .create(&WidgetSpec::new(WidgetKind::DatePicker, "due", "Due"))
            .is_err());
    }
}

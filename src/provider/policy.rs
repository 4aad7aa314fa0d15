use tracing::{Level, event};

use crate::meta::FieldMeta;
use crate::widget::{SelectOption, Widget};

#[derive(Debug, Clone, PartialEq)]
pub enum PolicyOutcome {
    Cleared,
    Selected(SelectOption),
    Untouched,
}

/// Apply the empty-data, default-value and auto-select rules to a freshly
/// populated selection widget.
pub fn apply_selection_policy(
    field: &str,
    meta: &FieldMeta,
    options: &[SelectOption],
    widget: &mut dyn Widget,
) -> PolicyOutcome {
    if options.is_empty() {
        if meta.clear_on_empty_data {
            widget.clear();
            return PolicyOutcome::Cleared;
        }
        return PolicyOutcome::Untouched;
    }

    if let Some(default) = meta.default_text() {
        return match options.iter().find(|option| option.label == default) {
            Some(option) => {
                widget.set_value(option.value.clone());
                PolicyOutcome::Selected(option.clone())
            }
            None => {
                event!(
                    Level::WARN,
                    field,
                    default_value = default,
                    "default value not found among options"
                );
                PolicyOutcome::Untouched
            }
        };
    }

    if meta.auto_select_first {
        let first = options[0].clone();
        widget.set_value(first.value.clone());
        return PolicyOutcome::Selected(first);
    }

    PolicyOutcome::Untouched
}

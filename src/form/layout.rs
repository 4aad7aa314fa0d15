use std::fmt;

use crate::core::BindError;
use crate::meta::FieldMeta;
use crate::widget::{WidgetKind, WidgetRef};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub text: String,
    pub bold: bool,
    pub min_width: String,
}

/// Caption and widget for one field.
#[derive(Clone)]
pub struct FieldRow {
    pub field: String,
    pub label: Label,
    pub kind: WidgetKind,
    pub widget: WidgetRef,
    /// Metadata the row was built from, overrides included.
    pub meta: FieldMeta,
}

impl fmt::Debug for FieldRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRow")
            .field("field", &self.field)
            .field("label", &self.label)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum Component {
    Field(FieldRow),
    Section(Container),
}

/// A field that has a widget but no binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnboundField {
    pub field: String,
    pub error: BindError,
}

#[derive(Debug, Clone, Default)]
pub struct Container {
    name: Option<String>,
    caption: Option<String>,
    components: Vec<Component>,
    unbound: Vec<UnboundField>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn section(name: &str, caption: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            caption: Some(caption.to_string()),
            ..Self::default()
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn components(&self) -> &[Component] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    pub fn push_field(&mut self, row: FieldRow) {
        self.components.push(Component::Field(row));
    }

    /// Append a nested section and return its position.
    pub fn push_section(&mut self, section: Container) -> usize {
        self.components.push(Component::Section(section));
        self.components.len() - 1
    }

    pub fn section_at(&self, index: usize) -> Option<&Container> {
        match self.components.get(index) {
            Some(Component::Section(section)) => Some(section),
            _ => None,
        }
    }

    pub fn section_at_mut(&mut self, index: usize) -> Option<&mut Container> {
        match self.components.get_mut(index) {
            Some(Component::Section(section)) => Some(section),
            _ => None,
        }
    }

    /// Field rows directly inside this container.
    pub fn rows(&self) -> impl Iterator<Item = &FieldRow> {
        self.components.iter().filter_map(|component| match component {
            Component::Field(row) => Some(row),
            Component::Section(_) => None,
        })
    }

    pub fn sections(&self) -> impl Iterator<Item = &Container> {
        self.components.iter().filter_map(|component| match component {
            Component::Section(section) => Some(section),
            Component::Field(_) => None,
        })
    }

    /// Every field row, depth first, in display order.
    pub fn all_rows(&self) -> Vec<&FieldRow> {
        let mut rows = Vec::new();
        self.collect_rows(&mut rows);
        rows
    }

    fn collect_rows<'a>(&'a self, rows: &mut Vec<&'a FieldRow>) {
        for component in &self.components {
            match component {
                Component::Field(row) => rows.push(row),
                Component::Section(section) => section.collect_rows(rows),
            }
        }
    }

    pub fn find_row(&self, field: &str) -> Option<&FieldRow> {
        self.all_rows().into_iter().find(|row| row.field == field)
    }

    pub fn record_unbound(&mut self, field: &str, error: BindError) {
        self.unbound.push(UnboundField {
            field: field.to_string(),
            error,
        });
    }

    /// Fields whose binding failed, nested sections included.
    pub fn unbound(&self) -> Vec<&UnboundField> {
        let mut unbound: Vec<&UnboundField> = self.unbound.iter().collect();
        for section in self.sections() {
            unbound.extend(section.unbound());
        }
        unbound
    }
}

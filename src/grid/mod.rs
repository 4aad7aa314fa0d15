//! Grid columns and row loading from persisted grid definitions.

pub mod column;
pub mod definition;
pub mod loader;
pub mod view;

pub use column::{Cell, Column, ColumnError, ColumnKind, select_column_kind};
pub use definition::{FieldSelection, GridDefinition};
pub use loader::GridDataLoader;
pub use view::{GridView, ProjectChangeListener, SelectionListener};

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{Level, event, info_span};

use crate::config::EngineConfig;
use crate::core::{FormError, Result};
use crate::meta::{EntityModel, FieldDescriptor};
use crate::registry::Registry;

/// Columns plus the currently loaded rows.
pub struct Grid<E> {
    columns: Vec<Column>,
    items: Vec<E>,
    selected: Option<usize>,
}

impl<E: EntityModel> Grid<E> {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            items: Vec::new(),
            selected: None,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, key: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.key == key)
    }

    pub fn column_keys(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.key.as_str()).collect()
    }

    pub fn items(&self) -> &[E] {
        &self.items
    }

    pub fn set_items(&mut self, items: Vec<E>) {
        self.items = items;
        self.selected = None;
    }

    /// Rendered cells, one row per item.
    pub fn rows(&self) -> Vec<Vec<Cell>> {
        self.items
            .iter()
            .map(|item| self.columns.iter().map(|column| column.render(item)).collect())
            .collect()
    }

    pub fn select(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.selected = Some(index);
            true
        } else {
            false
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&E> {
        self.selected.and_then(|index| self.items.get(index))
    }
}

/// Field of `E` named `name`; own fields win over inherited ones.
fn resolve_field<E: EntityModel>(name: &str) -> Option<&'static FieldDescriptor> {
    let fields = E::fields();
    fields
        .iter()
        .find(|field| field.name == name && field.declaring_entity == E::entity_name())
        .or_else(|| fields.iter().find(|field| field.name == name))
}

/// Build the columns of `definition` and a loader for its data service.
pub fn build_grid<E: EntityModel + DeserializeOwned>(
    definition: &GridDefinition,
    registry: Arc<Registry>,
    config: &EngineConfig,
) -> Result<(Grid<E>, GridDataLoader<E>)> {
    let span = info_span!("grid.build", grid = %definition.name, entity = E::entity_name());
    let _enter = span.enter();

    if definition.entity_type != E::entity_name() {
        return Err(FormError::EntityTypeMismatch {
            screen: definition.name.clone(),
            expected: E::entity_name().to_string(),
            found: definition.entity_type.clone(),
        });
    }

    let id_pattern = config.id_regex()?;
    let mut columns = Vec::new();
    for selection in definition.ordered_selections() {
        match resolve_field::<E>(&selection.field) {
            Some(descriptor) => columns.push(Column::build(descriptor, config, &id_pattern)),
            None => event!(
                Level::WARN,
                field = %selection.field,
                "grid field not found on entity, column skipped"
            ),
        }
    }

    event!(Level::DEBUG, columns = columns.len(), "grid built");
    let loader = GridDataLoader::new(registry, &definition.data_service, config);
    Ok((Grid::new(columns), loader))
}

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use tracing::{Level, event};

use crate::binder::Binder;
use crate::core::{EntityValue, FormError, Result};
use crate::engine::Engine;
use crate::form::{Container, FieldRow, UnboundField};
use crate::meta::{EntityModel, find_field};
use crate::provider::{DataProviderResolver, SelectOption};
use crate::screen::{BuiltScreen, ScreenDefinition, ScreenInterpreter};
use crate::widget::{WidgetRef, WidgetToolkit};

/// A live form for one entity type: widgets, binder and lookup indexes.
///
/// Populate it from an entity with [`BoundForm::populate`], write edits back
/// with [`BoundForm::write_into`] and call [`BoundForm::unbind`] before
/// replacing it.
pub struct BoundForm<E: EntityModel> {
    engine: Engine,
    screen: BuiltScreen,
    binder: Binder<E>,
    widgets: IndexMap<String, WidgetRef>,
}

impl<E: EntityModel> BoundForm<E> {
    /// Build from `screen`, or from every visible field in metadata order
    /// when no screen is given.
    pub fn build(
        engine: &Engine,
        toolkit: &dyn WidgetToolkit,
        screen: Option<&ScreenDefinition>,
    ) -> Result<Self> {
        let builder = engine.form_builder(toolkit);
        let mut binder = Binder::new();
        let built = match screen {
            Some(screen) => ScreenInterpreter::new(&builder).interpret(screen, &mut binder)?,
            None => BuiltScreen::from_container(builder.build_form(&mut binder, None)?),
        };

        // a field placed twice resolves to its first (bound) widget
        let mut widgets = IndexMap::new();
        for row in built.root.all_rows() {
            widgets
                .entry(row.field.clone())
                .or_insert_with(|| row.widget.clone());
        }

        Ok(Self {
            engine: engine.clone(),
            screen: built,
            binder,
            widgets,
        })
    }

    pub fn container(&self) -> &Container {
        &self.screen.root
    }

    pub fn binder(&self) -> &Binder<E> {
        &self.binder
    }

    pub fn populate(&self, entity: &E) -> Result<()> {
        self.binder.read_bean(entity)
    }

    pub fn write_into(&self, entity: &mut E) -> Result<()> {
        self.binder.write_bean(entity)
    }

    pub fn widget(&self, field: &str) -> Option<WidgetRef> {
        self.widgets.get(field).cloned()
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.widgets.keys().map(String::as_str).collect()
    }

    pub fn section(&self, name: &str) -> Option<&Container> {
        self.screen.section(name)
    }

    pub fn component(&self, section: &str, field: &str) -> Option<&FieldRow> {
        self.screen.component(section, field)
    }

    pub fn unbound(&self) -> Vec<&UnboundField> {
        self.screen.root.unbound()
    }

    /// Options of a provider-backed field that match `text`.
    pub fn filter_options(&self, field: &str, text: &str) -> Result<Vec<SelectOption>> {
        let not_found = || FormError::FieldNotFound {
            entity: E::entity_name().to_string(),
            field: field.to_string(),
        };
        let row = self.screen.root.find_row(field).ok_or_else(not_found)?;
        let descriptor = find_field::<E>(field).ok_or_else(not_found)?;

        if !row.meta.has_data_provider() {
            let needle = text.to_lowercase();
            return Ok(row
                .widget
                .borrow()
                .options()
                .into_iter()
                .filter(|option| option.label.to_lowercase().contains(&needle))
                .collect());
        }

        DataProviderResolver::new(self.engine.registry(), self.engine.config())
            .resolve_filtered(descriptor, &row.meta, text)
    }

    /// Re-populate from an entity snapshot, typically a selected grid row.
    pub fn populate_from_selection(&self, selected: &EntityValue) -> Result<()>
    where
        E: DeserializeOwned,
    {
        let entity: E = selected
            .to_model()
            .map_err(|err| FormError::Conversion {
                field: E::entity_name().to_string(),
                message: err.to_string(),
            })?;
        self.populate(&entity)
    }

    /// Release every binding and clear the widgets.
    pub fn unbind(&mut self) {
        self.binder.clear();
        self.binder.unbind_all();
        self.widgets.clear();
        event!(Level::DEBUG, entity = E::entity_name(), "form unbound");
    }
}

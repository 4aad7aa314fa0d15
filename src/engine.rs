use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{Level, event};

use crate::binder::Binder;
use crate::config::EngineConfig;
use crate::core::Result;
use crate::form::{BoundForm, Container, FormBuilder};
use crate::grid::{GridView, GridDefinition, build_grid};
use crate::meta::EntityModel;
use crate::provider::DataProviderResolver;
use crate::registry::Registry;
use crate::screen::{BuiltScreen, ScreenDefinition, ScreenInterpreter};
use crate::widget::WidgetToolkit;

/// Entry point handed to every UI session.
///
/// Created once at start-up; cloning is cheap and every clone shares the same
/// frozen registry and configuration.
#[derive(Debug, Clone)]
pub struct Engine {
    registry: Arc<Registry>,
    config: Arc<EngineConfig>,
}

impl Engine {
    pub fn new(registry: Registry, config: EngineConfig) -> Result<Self> {
        Self::shared(Arc::new(registry), config)
    }

    pub fn shared(registry: Arc<Registry>, config: EngineConfig) -> Result<Self> {
        config.validate()?;
        event!(
            Level::INFO,
            services = registry.len(),
            "form engine initialized"
        );
        Ok(Self {
            registry,
            config: Arc::new(config),
        })
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn form_builder<'a>(&'a self, toolkit: &'a dyn WidgetToolkit) -> FormBuilder<'a> {
        FormBuilder::new(&self.registry, &self.config, toolkit)
    }

    pub fn resolver(&self) -> DataProviderResolver<'_> {
        DataProviderResolver::new(&self.registry, &self.config)
    }

    pub fn build_form<E: EntityModel>(
        &self,
        toolkit: &dyn WidgetToolkit,
        binder: &mut Binder<E>,
        field_names: Option<&[&str]>,
    ) -> Result<Container> {
        self.form_builder(toolkit).build_form(binder, field_names)
    }

    pub fn interpret_screen<E: EntityModel>(
        &self,
        toolkit: &dyn WidgetToolkit,
        screen: &ScreenDefinition,
        binder: &mut Binder<E>,
    ) -> Result<BuiltScreen> {
        let builder = self.form_builder(toolkit);
        ScreenInterpreter::new(&builder).interpret(screen, binder)
    }

    pub fn bound_form<E: EntityModel>(
        &self,
        toolkit: &dyn WidgetToolkit,
        screen: Option<&ScreenDefinition>,
    ) -> Result<BoundForm<E>> {
        BoundForm::build(self, toolkit, screen)
    }

    /// Build a grid view and load its first page.
    pub fn grid_view<E: EntityModel + DeserializeOwned>(
        &self,
        definition: &GridDefinition,
    ) -> Result<GridView<E>> {
        let (grid, loader) = build_grid::<E>(definition, self.registry.clone(), &self.config)?;
        let mut view = GridView::new(grid, loader, definition.project.clone());
        view.refresh();
        Ok(view)
    }
}

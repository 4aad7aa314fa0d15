use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{Level, event};

use crate::core::EntityValue;
use crate::grid::{Grid, GridDataLoader};
use crate::meta::EntityModel;
use crate::screen::ProjectRef;

/// Receives "active project changed" notifications.
pub trait ProjectChangeListener {
    fn on_project_changed(&mut self, project: Option<ProjectRef>);
}

/// Receives row selection changes.
pub trait SelectionListener<E> {
    fn on_selection_changed(&mut self, selected: Option<&E>);
}

impl<E, F: FnMut(Option<&E>)> SelectionListener<E> for F {
    fn on_selection_changed(&mut self, selected: Option<&E>) {
        self(selected)
    }
}

/// A grid together with its loader and the project it is scoped to.
pub struct GridView<E: EntityModel> {
    grid: Grid<E>,
    loader: GridDataLoader<E>,
    project: Option<ProjectRef>,
    listeners: Vec<Box<dyn SelectionListener<E>>>,
}

impl<E: EntityModel + DeserializeOwned> GridView<E> {
    pub fn new(grid: Grid<E>, loader: GridDataLoader<E>, project: Option<ProjectRef>) -> Self {
        Self {
            grid,
            loader,
            project,
            listeners: Vec::new(),
        }
    }

    pub fn grid(&self) -> &Grid<E> {
        &self.grid
    }

    pub fn project(&self) -> Option<&ProjectRef> {
        self.project.as_ref()
    }

    pub fn add_selection_listener(&mut self, listener: impl SelectionListener<E> + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Reload rows. The selection is dropped. When the loader skips the
    /// reload, rows and selection are left as they are.
    pub fn refresh(&mut self) {
        let Some(rows) = self.loader.load(self.project.as_ref()) else {
            return;
        };
        let had_selection = self.grid.selected().is_some();
        self.grid.set_items(rows);
        if had_selection {
            self.notify();
        }
    }

    pub fn select(&mut self, index: usize) -> Option<&E> {
        if !self.grid.select(index) {
            event!(Level::DEBUG, index, "selection index out of range");
            return None;
        }
        self.notify();
        self.grid.selected()
    }

    pub fn clear_selection(&mut self) {
        if self.grid.selected().is_some() {
            self.grid.clear_selection();
            self.notify();
        }
    }

    pub fn selected(&self) -> Option<&E> {
        self.grid.selected()
    }

    /// Snapshot of the selected row, for re-populating a form.
    pub fn selected_snapshot(&self) -> Option<EntityValue>
    where
        E: Serialize,
    {
        self.grid.selected().map(EntityValue::from_model)
    }

    fn notify(&mut self) {
        let selected = self.grid.selected();
        for listener in &mut self.listeners {
            listener.on_selection_changed(selected);
        }
    }
}

impl<E: EntityModel + DeserializeOwned> ProjectChangeListener for GridView<E> {
    fn on_project_changed(&mut self, project: Option<ProjectRef>) {
        event!(
            Level::INFO,
            entity = E::entity_name(),
            project = project.as_ref().map(|p| p.id),
            "project changed, reloading grid"
        );
        self.project = project;
        self.refresh();
    }
}

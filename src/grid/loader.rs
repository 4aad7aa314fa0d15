use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::{Level, event, info_span};

use crate::config::EngineConfig;
use crate::core::Value;
use crate::meta::EntityModel;
use crate::registry::Registry;
use crate::screen::ProjectRef;

/// Fetches grid rows from a named data service.
///
/// Every failure is logged and produces an empty row set so the grid stays
/// usable. A project-scoped service is never queried without a project.
pub struct GridDataLoader<E> {
    registry: Arc<Registry>,
    service: String,
    page_size: usize,
    list_method: String,
    project_method: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: EntityModel + DeserializeOwned> GridDataLoader<E> {
    pub fn new(registry: Arc<Registry>, service: &str, config: &EngineConfig) -> Self {
        Self {
            registry,
            service: service.to_string(),
            page_size: config.grid_page_size,
            list_method: config.grid_list_method.clone(),
            project_method: config.grid_project_method.clone(),
            _entity: PhantomData,
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Rows for `project`, or `None` when the service is project-scoped and
    /// no project is active; the caller keeps what it shows.
    pub fn load(&self, project: Option<&ProjectRef>) -> Option<Vec<E>> {
        let span = info_span!(
            "grid.load",
            entity = E::entity_name(),
            service = %self.service,
            project = project.map(|p| p.id)
        );
        let _enter = span.enter();

        let Some(service) = self.registry.lookup(&self.service) else {
            event!(Level::WARN, "grid data service is not registered");
            return Some(Vec::new());
        };

        if project.is_none() && service.is_project_scoped() {
            event!(Level::WARN, "no active project available for grid refresh");
            return None;
        }

        let page = Value::Integer(i64::try_from(self.page_size).unwrap_or(i64::MAX));
        let (method, result) = match project {
            Some(project) if service.is_project_scoped() => (
                &self.project_method,
                service.invoke(&self.project_method, &[Value::Integer(project.id), page]),
            ),
            _ => (&self.list_method, service.invoke(&self.list_method, &[page])),
        };

        let items = match result {
            Ok(Value::List(items)) => items,
            Ok(other) => {
                event!(
                    Level::WARN,
                    method = %method,
                    returned = other.type_name(),
                    "grid data method did not return a list"
                );
                return Some(Vec::new());
            }
            Err(err) => {
                event!(Level::WARN, method = %method, error = %err, "grid data load failed");
                return Some(Vec::new());
            }
        };

        let total = items.len().min(self.page_size);
        let rows: Vec<E> = items
            .into_iter()
            .take(self.page_size)
            .filter_map(|item| match item {
                Value::Entity(entity) => entity.to_model::<E>().ok(),
                _ => None,
            })
            .collect();

        if rows.len() < total {
            event!(
                Level::WARN,
                dropped = total - rows.len(),
                "grid rows of an unexpected type were dropped"
            );
        }
        event!(Level::DEBUG, rows = rows.len(), "grid loaded");
        Some(rows)
    }
}

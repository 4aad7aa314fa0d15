use serde::{Deserialize, Deserializer, Serialize};
use tracing::{Level, event};

use crate::core::{FormError, Result};
use crate::screen::ProjectRef;

/// One selected column: a field name and its left-to-right position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSelection {
    pub field: String,
    pub order: i32,
}

impl FieldSelection {
    pub fn new(field: &str, order: i32) -> Self {
        Self {
            field: field.to_string(),
            order,
        }
    }

    /// Parse the compact `"name:1,status:2"` form. Malformed pairs are
    /// logged and skipped.
    pub fn parse_list(text: &str) -> Vec<FieldSelection> {
        text.split(',')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .filter_map(|pair| {
                let parsed = pair.split_once(':').and_then(|(field, order)| {
                    let field = field.trim();
                    let order = order.trim().parse::<i32>().ok()?;
                    (!field.is_empty()).then(|| FieldSelection::new(field, order))
                });
                if parsed.is_none() {
                    event!(Level::WARN, pair, "skipping malformed field selection");
                }
                parsed
            })
            .collect()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SelectedFields {
    List(Vec<FieldSelection>),
    Compact(String),
}

fn selected_fields<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Vec<FieldSelection>, D::Error> {
    Ok(match SelectedFields::deserialize(deserializer)? {
        SelectedFields::List(list) => list,
        SelectedFields::Compact(text) => FieldSelection::parse_list(&text),
    })
}

/// Persisted column layout of an entity grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridDefinition {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    #[serde(default)]
    pub project: Option<ProjectRef>,
    pub entity_type: String,
    pub data_service: String,
    #[serde(default, deserialize_with = "selected_fields")]
    pub selected_fields: Vec<FieldSelection>,
}

impl GridDefinition {
    pub fn new(name: &str, entity_type: &str, data_service: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            project: None,
            entity_type: entity_type.to_string(),
            data_service: data_service.to_string(),
            selected_fields: Vec::new(),
        }
    }

    pub fn project(mut self, project: ProjectRef) -> Self {
        self.project = Some(project);
        self
    }

    pub fn select(mut self, field: &str, order: i32) -> Self {
        self.selected_fields.push(FieldSelection::new(field, order));
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| FormError::InvalidDefinition {
            definition: "grid".to_string(),
            message: err.to_string(),
        })
    }

    /// Selections stable-sorted by ascending order.
    pub fn ordered_selections(&self) -> Vec<&FieldSelection> {
        let mut selections: Vec<&FieldSelection> = self.selected_fields.iter().collect();
        selections.sort_by_key(|selection| selection.order);
        selections
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_compact_list() {
        let selections = FieldSelection::parse_list("name:2, status:1,bogus,owner:x,:3,");
        assert_eq!(
            selections,
            vec![FieldSelection::new("name", 2), FieldSelection::new("status", 1)]
        );
    }

    #[test]
    fn test_both_json_forms() {
        let compact = GridDefinition::from_json(
            r#"{"name": "Tasks", "entityType": "Task", "dataService": "tasks",
                "selectedFields": "name:2,done:1"}"#,
        )
        .unwrap();
        let listed = GridDefinition::from_json(
            r#"{"name": "Tasks", "entityType": "Task", "dataService": "tasks",
                "selectedFields": [{"field": "name", "order": 2}, {"field": "done", "order": 1}]}"#,
        )
        .unwrap();
        assert_eq!(compact.selected_fields, listed.selected_fields);

        let order: Vec<_> = compact
            .ordered_selections()
            .iter()
            .map(|s| s.field.as_str())
            .collect();
        assert_eq!(order, vec!["done", "name"]);
    }
}

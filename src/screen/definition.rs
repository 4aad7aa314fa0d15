use serde::{Deserialize, Serialize};

use crate::core::{FormError, Result};
use crate::meta::MetaOverrides;

/// Project a definition belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRef {
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// Persisted layout of an entity form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenDefinition {
    #[serde(default)]
    pub id: Option<i64>,
    pub name: String,
    pub project: ProjectRef,
    pub entity_type: String,
    #[serde(default)]
    pub lines: Vec<ScreenLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenLine {
    pub line_order: i32,
    #[serde(default = "active_by_default")]
    pub active: bool,
    #[serde(flatten)]
    pub kind: LineKind,
}

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum LineKind {
    Section {
        name: String,
        #[serde(default)]
        caption: Option<String>,
    },
    Field {
        field: String,
        #[serde(default)]
        overrides: MetaOverrides,
    },
}

impl ScreenLine {
    pub fn section(line_order: i32, name: &str) -> Self {
        Self {
            line_order,
            active: true,
            kind: LineKind::Section {
                name: name.to_string(),
                caption: None,
            },
        }
    }

    pub fn field(line_order: i32, field: &str) -> Self {
        Self::field_with(line_order, field, MetaOverrides::default())
    }

    pub fn field_with(line_order: i32, field: &str, overrides: MetaOverrides) -> Self {
        Self {
            line_order,
            active: true,
            kind: LineKind::Field {
                field: field.to_string(),
                overrides,
            },
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

impl ScreenDefinition {
    pub fn new(name: &str, project: ProjectRef, entity_type: &str) -> Self {
        Self {
            id: None,
            name: name.to_string(),
            project,
            entity_type: entity_type.to_string(),
            lines: Vec::new(),
        }
    }

    pub fn line(mut self, line: ScreenLine) -> Self {
        self.lines.push(line);
        self
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|err| FormError::InvalidDefinition {
            definition: "screen".to_string(),
            message: err.to_string(),
        })
    }

    /// Active lines, stable-sorted by `line_order`.
    pub fn ordered_lines(&self) -> Vec<&ScreenLine> {
        let mut lines: Vec<&ScreenLine> = self.lines.iter().filter(|line| line.active).collect();
        lines.sort_by_key(|line| line.line_order);
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_screen_json() {
        let screen = ScreenDefinition::from_json(
            r#"{
                "name": "Task details",
                "project": {"id": 3, "name": "Apollo"},
                "entityType": "Task",
                "lines": [
                    {"lineOrder": 2, "type": "field", "field": "name",
                     "overrides": {"displayName": "Title", "required": true}},
                    {"lineOrder": 1, "type": "section", "name": "Info"},
                    {"lineOrder": 3, "type": "field", "field": "done", "active": false}
                ]
            }"#,
        )
        .unwrap();

        assert_eq!(screen.project.id, 3);
        let lines = screen.ordered_lines();
        assert_eq!(lines.len(), 2);
        assert!(matches!(&lines[0].kind, LineKind::Section { name, .. } if name == "Info"));
        match &lines[1].kind {
            LineKind::Field { field, overrides } => {
                assert_eq!(field, "name");
                assert_eq!(overrides.display_name.as_deref(), Some("Title"));
                assert_eq!(overrides.required, Some(true));
            }
            other => panic!("unexpected line {:?}", other),
        }
    }

    #[test]
    fn test_equal_orders_keep_declaration_order() {
        let screen = ScreenDefinition::new("s", ProjectRef { id: 1, name: String::new() }, "Task")
            .line(ScreenLine::field(1, "b"))
            .line(ScreenLine::field(1, "a"))
            .line(ScreenLine::field(0, "c"));
        let names: Vec<_> = screen
            .ordered_lines()
            .iter()
            .map(|line| match &line.kind {
                LineKind::Field { field, .. } => field.clone(),
                LineKind::Section { name, .. } => name.clone(),
            })
            .collect();
        assert_eq!(names, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_invalid_json() {
        let err = ScreenDefinition::from_json("{\"name\": 1}").unwrap_err();
        assert!(matches!(err, FormError::InvalidDefinition { .. }));
    }
}

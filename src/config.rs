use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::{FormError, Result};

/// Matches `id`, `user_id`, `id_owner` or camel-case `ownerId`.
pub const DEFAULT_ID_COLUMN_PATTERN: &str = r"(^|_)(?i:id)($|_)|[a-z]I[dD]$";

lazy_static! {
    static ref DEFAULT_ID_PATTERN: Regex = Regex::new(DEFAULT_ID_COLUMN_PATTERN).unwrap();
}

/// Tunables shared by every builder the engine hands out.
///
/// Loaded once at start-up (usually from JSON) and frozen inside
/// [`Engine`](crate::engine::Engine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    /// `max_length` at or above which a text field becomes a text area.
    pub long_text_threshold: i32,

    /// `max_length` above which a grid text column is rendered as long text.
    pub grid_long_text_length: i32,

    /// Field-name fragments that mark a grid text column as long text.
    pub long_text_name_markers: Vec<String>,

    /// Characters shown before a long-text cell is cut with an ellipsis.
    pub long_text_preview_chars: usize,

    /// Upper bound on rows fetched by a grid data loader.
    pub grid_page_size: usize,

    pub label_min_width: String,

    pub full_width: String,

    /// Bean name that disables option loading for a field.
    pub no_provider_sentinel: String,

    pub grid_list_method: String,

    pub grid_project_method: String,

    pub id_column_pattern: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            long_text_threshold: 1000,
            grid_long_text_length: 100,
            long_text_name_markers: vec!["description".to_string(), "comment".to_string()],
            long_text_preview_chars: 60,
            grid_page_size: 1000,
            label_min_width: "210px".to_string(),
            full_width: "100%".to_string(),
            no_provider_sentinel: "none".to_string(),
            grid_list_method: "list_page".to_string(),
            grid_project_method: "list_by_project".to_string(),
            id_column_pattern: DEFAULT_ID_COLUMN_PATTERN.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn long_text_threshold(mut self, threshold: i32) -> Self {
        self.long_text_threshold = threshold;
        self
    }

    pub fn grid_long_text_length(mut self, length: i32) -> Self {
        self.grid_long_text_length = length;
        self
    }

    pub fn long_text_preview_chars(mut self, chars: usize) -> Self {
        self.long_text_preview_chars = chars;
        self
    }

    pub fn grid_page_size(mut self, size: usize) -> Self {
        self.grid_page_size = size;
        self
    }

    pub fn label_min_width(mut self, width: &str) -> Self {
        self.label_min_width = width.to_string();
        self
    }

    pub fn no_provider_sentinel(mut self, sentinel: &str) -> Self {
        self.no_provider_sentinel = sentinel.to_string();
        self
    }

    pub fn grid_methods(mut self, list: &str, by_project: &str) -> Self {
        self.grid_list_method = list.to_string();
        self.grid_project_method = by_project.to_string();
        self
    }

    pub fn id_column_pattern(mut self, pattern: &str) -> Self {
        self.id_column_pattern = pattern.to_string();
        self
    }

    /// Parse a JSON document; missing keys keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|err| FormError::InvalidConfig(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.grid_page_size == 0 {
            return Err(FormError::InvalidConfig(
                "gridPageSize must be > 0".to_string(),
            ));
        }

        if self.long_text_threshold <= 0 {
            return Err(FormError::InvalidConfig(
                "longTextThreshold must be > 0".to_string(),
            ));
        }

        if self.no_provider_sentinel.trim().is_empty() {
            return Err(FormError::InvalidConfig(
                "noProviderSentinel cannot be empty".to_string(),
            ));
        }

        if self.grid_list_method.is_empty() || self.grid_project_method.is_empty() {
            return Err(FormError::InvalidConfig(
                "grid method names cannot be empty".to_string(),
            ));
        }

        self.id_regex().map(|_| ())
    }

    pub fn id_regex(&self) -> Result<Regex> {
        if self.id_column_pattern == DEFAULT_ID_COLUMN_PATTERN {
            return Ok(DEFAULT_ID_PATTERN.clone());
        }
        Regex::new(&self.id_column_pattern).map_err(|err| {
            FormError::InvalidConfig(format!(
                "idColumnPattern '{}' is not a valid regex: {}",
                self.id_column_pattern, err
            ))
        })
    }

    pub fn is_long_text_name(&self, field_name: &str) -> bool {
        let lowered = field_name.to_lowercase();
        self.long_text_name_markers
            .iter()
            .any(|marker| lowered.contains(&marker.to_lowercase()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.long_text_threshold, 1000);
        assert_eq!(config.grid_page_size, 1000);
        assert_eq!(config.label_min_width, "210px");
        assert_eq!(config.no_provider_sentinel, "none");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::new()
            .long_text_threshold(255)
            .grid_page_size(50)
            .grid_methods("all", "for_project");

        assert_eq!(config.long_text_threshold, 255);
        assert_eq!(config.grid_page_size, 50);
        assert_eq!(config.grid_list_method, "all");
        assert_eq!(config.grid_project_method, "for_project");
    }

    #[test]
    fn test_from_json_keeps_defaults() {
        let config = EngineConfig::from_json(r#"{"gridPageSize": 25}"#).unwrap();
        assert_eq!(config.grid_page_size, 25);
        assert_eq!(config.full_width, "100%");
    }

    #[test]
    fn test_invalid_config() {
        assert!(EngineConfig::from_json("{").is_err());
        assert!(EngineConfig::new().grid_page_size(0).validate().is_err());
        assert!(EngineConfig::new().id_column_pattern("(").validate().is_err());
    }

    #[test]
    fn test_id_regex() {
        let regex = EngineConfig::default().id_regex().unwrap();
        assert!(regex.is_match("id"));
        assert!(regex.is_match("owner_id"));
        assert!(regex.is_match("ownerId"));
        assert!(regex.is_match("userID"));
        assert!(!regex.is_match("valid"));
        assert!(!regex.is_match("idea"));
    }

    #[test]
    fn test_long_text_name() {
        let config = EngineConfig::default();
        assert!(config.is_long_text_name("shortDescription"));
        assert!(config.is_long_text_name("COMMENTS"));
        assert!(!config.is_long_text_name("name"));
    }
}

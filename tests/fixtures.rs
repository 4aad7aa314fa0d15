#![allow(dead_code)]

use std::io;
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, NaiveDateTime};
use metaform::{
    Engine, EngineConfig, FormEntity, FormEnum, MethodService, ProjectRef, Registry,
    RegistryBuilder, Value, entity_list,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing_subscriber::fmt::MakeWriter;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FormEntity)]
pub struct Task {
    #[meta(display_name = "Name", order = 1, required)]
    pub name: String,
    #[meta(display_name = "Done", order = 2)]
    pub done: bool,
    #[meta(display_name = "Due", order = 3, hidden)]
    pub due: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, FormEnum)]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FormEntity)]
pub struct EntityBase {
    #[meta(display_name = "Id", order = 0, hidden)]
    pub id: Option<i64>,
    #[meta(display_name = "Name", order = 1, required, max_length = 80)]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FormEntity)]
#[form(name = "User", color = "color")]
pub struct User {
    #[form(base)]
    pub base: EntityBase,
    #[meta(display_name = "Login", order = 2)]
    pub login: String,
    #[meta(display_name = "Color", order = 3)]
    pub color: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FormEntity)]
pub struct Issue {
    #[form(base)]
    pub base: EntityBase,
    #[meta(display_name = "Description", order = 2, max_length = 4000)]
    pub description: String,
    #[meta(display_name = "Priority", order = 3, use_radio_buttons, default_value = "Medium")]
    pub priority: Priority,
    #[meta(display_name = "Status", order = 4, data_provider_bean = "statuses", auto_select_first)]
    pub status: String,
    #[meta(display_name = "Assignee", order = 5, data_provider_bean = "users")]
    pub assignee: Option<User>,
    #[meta(display_name = "Estimate", order = 6, min = 0, max = 100)]
    pub estimate: i32,
    #[meta(display_name = "Cost", order = 7, width = "8em")]
    pub cost: Decimal,
    #[meta(display_name = "Created", order = 8, read_only)]
    pub created: Option<NaiveDateTime>,
    pub project_id: i64,
    #[form(skip)]
    #[serde(skip)]
    pub scratch: String,
}

/// Holds a field type no widget rule covers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FormEntity)]
pub struct Payload {
    #[meta(display_name = "Title", order = 1)]
    pub title: String,
    #[meta(display_name = "Body", order = 2)]
    pub body: serde_json::Value,
}

pub fn user(id: i64, name: &str, color: &str) -> User {
    User {
        base: EntityBase {
            id: Some(id),
            name: name.to_string(),
        },
        login: name.to_lowercase(),
        color: color.to_string(),
    }
}

pub fn users() -> Vec<User> {
    vec![user(1, "Alice", "#ff0000"), user(2, "Bob", "")]
}

pub fn issue(id: i64, name: &str, project_id: i64) -> Issue {
    Issue {
        base: EntityBase {
            id: Some(id),
            name: name.to_string(),
        },
        description: format!("{} in detail", name),
        priority: Priority::High,
        status: "Closed".to_string(),
        assignee: Some(match id % 2 {
            1 => user(1, "Alice", "#ff0000"),
            _ => user(2, "Bob", ""),
        }),
        estimate: 5,
        cost: Decimal::new(12345, 2),
        created: NaiveDate::from_ymd_opt(2024, 5, 1)
            .and_then(|date| date.and_hms_opt(9, 30, 0)),
        project_id,
        scratch: String::new(),
    }
}

pub fn issues() -> Vec<Issue> {
    vec![issue(1, "Login fails", 7), issue(2, "Slow grid", 7), issue(3, "Typo", 8)]
}

pub fn project(id: i64) -> ProjectRef {
    ProjectRef {
        id,
        name: format!("Project {}", id),
    }
}

pub fn statuses_service() -> MethodService {
    MethodService::new().method0("list", || {
        Ok(Value::List(vec![
            Value::Text("Open".into()),
            Value::Text("Closed".into()),
        ]))
    })
}

pub fn users_service() -> MethodService {
    MethodService::for_entity("User").method0("list", || Ok(entity_list(&users())))
}

pub fn issues_service() -> MethodService {
    MethodService::for_entity("Issue")
        .project_scoped()
        .method1("list_page", |_page| Ok(entity_list(&issues())))
        .method2("list_by_project", |project_id, _page| {
            let wanted = project_id.as_i64();
            let scoped: Vec<Issue> = issues()
                .into_iter()
                .filter(|issue| Some(issue.project_id) == wanted)
                .collect();
            Ok(entity_list(&scoped))
        })
}

/// Issue service that is not project-scoped.
pub fn all_issues_service() -> MethodService {
    MethodService::for_entity("Issue").method1("list_page", |_page| Ok(entity_list(&issues())))
}

pub fn registry_builder() -> RegistryBuilder {
    Registry::builder()
        .register("statuses", statuses_service())
        .register("users", users_service())
        .register("issues", issues_service())
        .register("all_issues", all_issues_service())
}

pub fn engine() -> Engine {
    Engine::new(registry_builder().build(), EngineConfig::default()).unwrap()
}

pub fn engine_with(registry: Registry) -> Engine {
    Engine::new(registry, EngineConfig::default()).unwrap()
}

/// In-memory sink for formatted log lines.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogCapture {
    type Writer = LogCapture;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Run `f` with a subscriber that records WARN and above; returns the log text.
pub fn capture_warnings<T>(f: impl FnOnce() -> T) -> (T, String) {
    let capture = LogCapture::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(capture.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::WARN)
        .finish();
    let result = tracing::subscriber::with_default(subscriber, f);
    (result, capture.contents())
}

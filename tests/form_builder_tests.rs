use metaform::{
    Binder, BindError, Component, Engine, EngineConfig, FormError, HeadlessToolkit, MethodService,
    Registry, Value, WidgetKind,
};

#[path = "fixtures.rs"]
mod fixtures;

use fixtures::{Issue, Payload, Task, capture_warnings, engine, engine_with, registry_builder};

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize, metaform::FormEntity)]
struct Ticket {
    #[meta(display_name = "Title", order = 1)]
    title: String,
    #[meta(display_name = "Points", order = 2, default_value = "many")]
    points: i64,
    #[meta(display_name = "Owner", order = 3, data_provider_bean = "owners", clear_on_empty_data)]
    owner: Option<fixtures::User>,
    #[meta(display_name = "Reviewer", order = 4, data_provider_bean = "none")]
    reviewer: Option<fixtures::User>,
}

#[test]
fn test_task_form_has_text_field_then_toggle() {
    let engine = engine();
    let toolkit = HeadlessToolkit::new();
    let mut binder = Binder::<Task>::new();

    let container = engine.build_form(&toolkit, &mut binder, None).unwrap();

    let kinds: Vec<(String, WidgetKind)> = container
        .rows()
        .map(|row| (row.field.clone(), row.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("name".to_string(), WidgetKind::TextField),
            ("done".to_string(), WidgetKind::Toggle),
        ]
    );

    let name = container.find_row("name").unwrap();
    assert_eq!(name.label.text, "Name");
    assert!(name.label.bold);
    assert_eq!(name.label.min_width, "210px");
    assert!(name.widget.borrow().is_required_indicator_visible());
    assert_eq!(name.widget.borrow().width().as_deref(), Some("100%"));

    let done = container.find_row("done").unwrap();
    assert!(!done.label.bold);
    assert_eq!(binder.bound_properties(), vec!["name", "done"]);
}

#[test]
fn test_explicit_field_names_keep_the_given_order() {
    let engine = engine();
    let toolkit = HeadlessToolkit::new();
    let mut binder = Binder::<Task>::new();

    let container = engine
        .build_form(&toolkit, &mut binder, Some(&["done", "name"]))
        .unwrap();

    let fields: Vec<&str> = container.rows().map(|row| row.field.as_str()).collect();
    assert_eq!(fields, vec!["done", "name"]);
}

#[test]
fn test_explicit_unknown_or_hidden_name_is_an_error() {
    let engine = engine();
    let toolkit = HeadlessToolkit::new();

    let err = engine
        .build_form(&toolkit, &mut Binder::<Task>::new(), Some(&["name", "title"]))
        .unwrap_err();
    assert_eq!(
        err,
        FormError::FieldNotFound {
            entity: "Task".into(),
            field: "title".into(),
        }
    );

    let err = engine
        .build_form(&toolkit, &mut Binder::<Task>::new(), Some(&["due"]))
        .unwrap_err();
    assert_eq!(err.field(), Some("due"));
}

#[test]
fn test_unsupported_field_type_names_the_field() {
    let engine = engine();
    let toolkit = HeadlessToolkit::new();
    let mut binder = Binder::<Payload>::new();

    let err = engine.build_form(&toolkit, &mut binder, None).unwrap_err();

    match &err {
        FormError::UnsupportedFieldType {
            entity,
            field,
            rust_type,
        } => {
            assert_eq!(entity, "Payload");
            assert_eq!(field, "body");
            assert_eq!(rust_type, "serde_json::Value");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().contains("body"));
}

#[test]
fn test_building_twice_is_deterministic() {
    let engine = engine();
    let toolkit = HeadlessToolkit::new();

    let describe = || {
        let mut binder = Binder::<Issue>::new();
        let container = engine.build_form(&toolkit, &mut binder, None).unwrap();
        container
            .rows()
            .map(|row| {
                let widget = row.widget.borrow();
                (
                    row.field.clone(),
                    row.kind,
                    row.label.text.clone(),
                    widget.value(),
                    widget.options(),
                )
            })
            .collect::<Vec<_>>()
    };

    assert_eq!(describe(), describe());
}

#[test]
fn test_issue_form_widgets_follow_metadata() {
    let engine = engine();
    let toolkit = HeadlessToolkit::new();
    let mut binder = Binder::<Issue>::new();

    let container = engine.build_form(&toolkit, &mut binder, None).unwrap();

    let kinds: Vec<(&str, WidgetKind)> = container
        .rows()
        .map(|row| (row.field.as_str(), row.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("name", WidgetKind::TextField),
            ("description", WidgetKind::TextArea),
            ("priority", WidgetKind::RadioGroup),
            ("status", WidgetKind::TextSelect),
            ("assignee", WidgetKind::EntitySelect),
            ("estimate", WidgetKind::IntegerField),
            ("cost", WidgetKind::DecimalField),
            ("created", WidgetKind::DateTimePicker),
        ]
    );
    assert!(container.unbound().is_empty());

    let priority = container.find_row("priority").unwrap().widget.borrow();
    assert_eq!(priority.value(), Value::Text("Medium".into()));
    let labels: Vec<String> = priority.options().into_iter().map(|o| o.label).collect();
    assert_eq!(labels, vec!["Low", "Medium", "High"]);
    drop(priority);

    let cost = container.find_row("cost").unwrap();
    assert_eq!(cost.widget.borrow().width().as_deref(), Some("8em"));

    let created = container.find_row("created").unwrap();
    assert!(created.widget.borrow().is_read_only());
}

#[test]
fn test_provider_field_auto_selects_first_option() {
    let engine = engine();
    let toolkit = HeadlessToolkit::new();
    let mut binder = Binder::<Issue>::new();

    let container = engine.build_form(&toolkit, &mut binder, None).unwrap();

    let status = container.find_row("status").unwrap().widget.borrow();
    assert_eq!(status.value(), Value::Text("Open".into()));
    assert_eq!(status.options().len(), 2);

    let assignee = container.find_row("assignee").unwrap().widget.borrow();
    let labels: Vec<String> = assignee.options().into_iter().map(|o| o.label).collect();
    assert_eq!(labels, vec!["Alice", "Bob"]);
    assert_eq!(assignee.value(), Value::Null);
}

#[test]
fn test_empty_provider_clears_and_sentinel_skips_lookup() {
    let registry = registry_builder()
        .register(
            "owners",
            MethodService::for_entity("User").method0("list", || Ok(Value::List(Vec::new()))),
        )
        .build();
    let engine = engine_with(registry);
    let toolkit = HeadlessToolkit::new();
    let mut binder = Binder::<Ticket>::new();

    let (container, warnings) =
        capture_warnings(|| engine.build_form(&toolkit, &mut binder, None).unwrap());

    let owner = container.find_row("owner").unwrap().widget.borrow();
    assert!(owner.options().is_empty());
    assert_eq!(owner.value(), Value::Null);

    let reviewer = container.find_row("reviewer").unwrap().widget.borrow();
    assert_eq!(reviewer.kind(), WidgetKind::EntitySelect);
    assert!(reviewer.options().is_empty());

    // the malformed default is ignored, the field still renders
    let points = container.find_row("points").unwrap().widget.borrow();
    assert_eq!(points.kind(), WidgetKind::IntegerField);
    assert_eq!(points.value(), Value::Null);
    assert!(warnings.contains("ignoring malformed default value"));
    assert!(warnings.contains("many"));
}

#[test]
fn test_missing_provider_service_is_an_error() {
    let engine = engine_with(Registry::empty());
    let toolkit = HeadlessToolkit::new();

    let err = engine
        .build_form(&toolkit, &mut Binder::<Issue>::new(), None)
        .unwrap_err();

    assert_eq!(
        err,
        FormError::ServiceNotFound {
            field: "status".into(),
            service: "statuses".into(),
        }
    );
}

#[test]
fn test_widget_construction_failure_is_reported() {
    let engine = engine();
    let toolkit = HeadlessToolkit::new().without(WidgetKind::Toggle);

    let err = engine
        .build_form(&toolkit, &mut Binder::<Task>::new(), None)
        .unwrap_err();

    match err {
        FormError::WidgetConstruction { field, message } => {
            assert_eq!(field, "done");
            assert!(message.contains("toggle"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn test_rebuilding_with_the_same_binder_leaves_fields_unbound() {
    let engine = engine();
    let toolkit = HeadlessToolkit::new();
    let mut binder = Binder::<Task>::new();
    engine.build_form(&toolkit, &mut binder, None).unwrap();

    let (second, warnings) =
        capture_warnings(|| engine.build_form(&toolkit, &mut binder, None).unwrap());

    assert_eq!(second.len(), 2);
    let unbound: Vec<(&str, &BindError)> = second
        .unbound()
        .into_iter()
        .map(|u| (u.field.as_str(), &u.error))
        .collect();
    assert_eq!(
        unbound,
        vec![
            (
                "name",
                &BindError::AlreadyBound {
                    property: "name".into()
                }
            ),
            (
                "done",
                &BindError::AlreadyBound {
                    property: "done".into()
                }
            ),
        ]
    );
    assert!(warnings.contains("binding failed"));
    assert_eq!(binder.len(), 2);
}

#[test]
fn test_long_text_threshold_comes_from_config() {
    let engine = Engine::new(
        registry_builder().build(),
        EngineConfig::new().long_text_threshold(50),
    )
    .unwrap();
    let toolkit = HeadlessToolkit::new();
    let mut binder = Binder::<Issue>::new();

    let container = engine
        .build_form(&toolkit, &mut binder, Some(&["name"]))
        .unwrap();

    assert_eq!(container.find_row("name").unwrap().kind, WidgetKind::TextArea);
    assert!(matches!(container.components()[0], Component::Field(_)));
}

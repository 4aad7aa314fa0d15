//! Metadata-driven forms, screens and grids.
//!
//! Entities describe their fields with `#[derive(FormEntity)]`; the
//! [`Engine`] turns those descriptions, plus persisted screen and grid
//! definitions, into bound widget trees and tabular views.

extern crate self as metaform;

pub mod binder;
pub mod config;
pub mod core;
pub mod engine;
pub mod form;
pub mod grid;
pub mod meta;
pub mod provider;
pub mod registry;
pub mod screen;
pub mod widget;

pub use binder::{Binder, Converter, PendingBinding};
pub use config::EngineConfig;
pub use crate::core::{BindError, ConversionError, EntityValue, FieldType, FormError, Result, Value};
pub use engine::Engine;
pub use form::{BoundForm, Component, Container, FieldRow, FormBuilder};
pub use grid::{Cell, Column, ColumnError, ColumnKind, Grid, GridDefinition, GridView, ProjectChangeListener, SelectionListener};
pub use meta::{EntityModel, FieldDescriptor, FieldMeta, FieldValue, MetaOverrides, find_field, ordered_visible_fields};
pub use metaform_derive::{FormEntity, FormEnum};
pub use provider::{DataProviderResolver, SelectOption};
pub use registry::{MethodService, Registry, RegistryBuilder, ServiceObject, entity_list};
pub use screen::{BuiltScreen, LineKind, ProjectRef, ScreenDefinition, ScreenLine};
pub use widget::{HeadlessToolkit, Widget, WidgetKind, WidgetRef, WidgetToolkit};

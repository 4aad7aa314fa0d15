use indexmap::IndexMap;
use tracing::{Level, event, info_span};

use crate::binder::Binder;
use crate::core::{FormError, Result};
use crate::form::{Container, FieldRow, FormBuilder};
use crate::meta::{EntityModel, find_field};
use crate::screen::definition::{LineKind, ScreenDefinition};

/// Result of interpreting a screen: the root container plus a section index.
#[derive(Debug, Clone, Default)]
pub struct BuiltScreen {
    pub root: Container,
    sections: IndexMap<String, usize>,
}

impl BuiltScreen {
    /// A screen without sections.
    pub fn from_container(root: Container) -> Self {
        Self {
            root,
            sections: IndexMap::new(),
        }
    }

    pub fn section(&self, name: &str) -> Option<&Container> {
        self.sections
            .get(name)
            .and_then(|index| self.root.section_at(*index))
    }

    /// Field row `field` inside section `section`.
    pub fn component(&self, section: &str, field: &str) -> Option<&FieldRow> {
        self.section(section)?.find_row(field)
    }

    pub fn section_names(&self) -> Vec<&str> {
        self.sections.keys().map(String::as_str).collect()
    }
}

#[derive(Clone, Copy)]
enum State {
    NoSection,
    Open(usize),
}

pub struct ScreenInterpreter<'b, 'a> {
    builder: &'b FormBuilder<'a>,
}

impl<'b, 'a> ScreenInterpreter<'b, 'a> {
    pub fn new(builder: &'b FormBuilder<'a>) -> Self {
        Self { builder }
    }

    pub fn interpret<E: EntityModel>(
        &self,
        screen: &ScreenDefinition,
        binder: &mut Binder<E>,
    ) -> Result<BuiltScreen> {
        let span = info_span!(
            "screen.interpret",
            screen = %screen.name,
            entity = E::entity_name(),
            project = screen.project.id
        );
        let _enter = span.enter();

        if screen.entity_type != E::entity_name() {
            return Err(FormError::EntityTypeMismatch {
                screen: screen.name.clone(),
                expected: E::entity_name().to_string(),
                found: screen.entity_type.clone(),
            });
        }

        let mut built = BuiltScreen::default();
        let lines = screen.ordered_lines();
        if lines.is_empty() {
            event!(Level::WARN, "screen has no lines, nothing to build");
            return Ok(built);
        }

        let mut state = State::NoSection;
        for line in lines {
            match &line.kind {
                LineKind::Section { name, caption } => {
                    let caption = caption.as_deref().unwrap_or(name);
                    let index = built.root.push_section(Container::section(name, caption));
                    if built.sections.insert(name.clone(), index).is_some() {
                        event!(Level::WARN, section = %name, "duplicate section name, later one wins");
                    }
                    state = State::Open(index);
                }
                LineKind::Field { field, overrides } => {
                    let descriptor =
                        find_field::<E>(field).ok_or_else(|| FormError::FieldNotFound {
                            entity: E::entity_name().to_string(),
                            field: field.clone(),
                        })?;
                    // an explicit line shows the field unless the line itself hides it
                    if overrides.hidden == Some(true) {
                        event!(Level::DEBUG, field = %field, "hidden screen line skipped");
                        continue;
                    }
                    let meta = overrides.apply_to(&descriptor.effective_meta());

                    let target = match state {
                        State::Open(index) => built
                            .root
                            .section_at_mut(index)
                            .ok_or_else(|| FormError::InvalidDefinition {
                                definition: screen.name.clone(),
                                message: format!("section at {} vanished", index),
                            })?,
                        State::NoSection => &mut built.root,
                    };
                    self.builder.build_into(binder, target, descriptor, &meta)?;
                }
            }
        }

        event!(
            Level::DEBUG,
            sections = built.sections.len(),
            unbound = built.root.unbound().len(),
            "screen built"
        );
        Ok(built)
    }
}

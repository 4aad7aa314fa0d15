//! Two-way binding between widgets and entity properties.
//!
//! A binding is created in two steps: [`Binder::for_field`] returns a
//! [`PendingBinding`] which must be either bound or discarded. Dropping a
//! pending binding without doing either panics.

pub mod converter;

pub use converter::Converter;

use std::marker::PhantomData;

use drop_bomb::DropBomb;
use indexmap::IndexMap;
use tracing::{Level, event};

use crate::core::{BindError, FormError, Result, Value};
use crate::meta::{EntityModel, FieldDescriptor, find_field};
use crate::widget::WidgetRef;

struct Binding {
    widget: WidgetRef,
    converter: Converter,
    descriptor: &'static FieldDescriptor,
    required: bool,
}

pub struct Binder<E: EntityModel> {
    bindings: IndexMap<String, Binding>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: EntityModel> Default for Binder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EntityModel> Binder<E> {
    pub fn new() -> Self {
        Self {
            bindings: IndexMap::new(),
            _entity: PhantomData,
        }
    }

    pub fn for_field(&self, widget: WidgetRef, property: &str) -> PendingBinding<E> {
        PendingBinding {
            widget,
            property: property.to_string(),
            converter: Converter::Identity,
            required: false,
            bomb: DropBomb::new("pending binding must be bound or discarded"),
            _entity: PhantomData,
        }
    }

    pub fn is_bound(&self, property: &str) -> bool {
        self.bindings.contains_key(property)
    }

    /// Bound property names in binding order.
    pub fn bound_properties(&self) -> Vec<&str> {
        self.bindings.keys().map(String::as_str).collect()
    }

    pub fn widget(&self, property: &str) -> Option<WidgetRef> {
        self.bindings
            .get(property)
            .map(|binding| binding.widget.clone())
    }

    pub fn converter(&self, property: &str) -> Option<&Converter> {
        self.bindings.get(property).map(|binding| &binding.converter)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn remove_binding(&mut self, property: &str) -> bool {
        self.bindings.shift_remove(property).is_some()
    }

    pub fn unbind_all(&mut self) {
        if !self.bindings.is_empty() {
            event!(
                Level::DEBUG,
                entity = E::entity_name(),
                bindings = self.bindings.len(),
                "binder released"
            );
        }
        self.bindings.clear();
    }

    /// Copy every bound property of `bean` into its widget.
    pub fn read_bean(&self, bean: &E) -> Result<()> {
        for (property, binding) in &self.bindings {
            let value = bean.get_field(property)?;
            let shown = binding
                .converter
                .to_presentation(value)
                .map_err(|err| err.for_field(property))?;
            binding.widget.borrow_mut().set_value(shown);
        }
        Ok(())
    }

    /// Clear every bound widget.
    pub fn clear(&self) {
        for binding in self.bindings.values() {
            binding.widget.borrow_mut().clear();
        }
    }

    /// Convert and validate every binding; nothing is written.
    pub fn validate(&self) -> Result<Vec<(String, Value)>> {
        let mut converted = Vec::with_capacity(self.bindings.len());
        for (property, binding) in &self.bindings {
            let shown = binding.widget.borrow().value();
            if binding.required && shown.is_empty() {
                return Err(FormError::Validation {
                    field: property.clone(),
                    message: "a value is required".to_string(),
                });
            }
            let value = binding
                .converter
                .to_model(shown, binding.descriptor.nullable)
                .map_err(|err| err.for_field(property))?;
            E::check_field(property, &value)?;
            converted.push((property.clone(), value));
        }
        Ok(converted)
    }

    /// Write widget values into `bean`. All bindings are validated first;
    /// on any failure `bean` is left untouched.
    pub fn write_bean(&self, bean: &mut E) -> Result<()> {
        let converted = self.validate()?;
        for (property, value) in converted {
            bean.set_field(&property, value)?;
        }
        Ok(())
    }
}

/// A binding under construction.
#[must_use = "a pending binding must be bound or discarded"]
pub struct PendingBinding<E: EntityModel> {
    widget: WidgetRef,
    property: String,
    converter: Converter,
    required: bool,
    bomb: DropBomb,
    _entity: PhantomData<fn() -> E>,
}

impl<E: EntityModel> PendingBinding<E> {
    pub fn converter(mut self, converter: Converter) -> Self {
        self.converter = converter;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn property(&self) -> &str {
        &self.property
    }

    pub fn bind(mut self, binder: &mut Binder<E>) -> std::result::Result<(), BindError> {
        self.bomb.defuse();

        let descriptor =
            find_field::<E>(&self.property).ok_or_else(|| BindError::UnknownProperty {
                entity: E::entity_name().to_string(),
                property: self.property.clone(),
            })?;

        if binder.bindings.contains_key(&self.property) {
            return Err(BindError::AlreadyBound {
                property: self.property.clone(),
            });
        }

        self.converter
            .check(&descriptor.field_type)
            .map_err(|message| BindError::IncompatibleConverter {
                property: self.property.clone(),
                converter: self.converter.name().to_string(),
                message,
            })?;

        binder.bindings.insert(
            self.property.clone(),
            Binding {
                widget: self.widget.clone(),
                converter: self.converter.clone(),
                descriptor,
                required: self.required,
            },
        );
        Ok(())
    }

    /// Abandon the binding.
    pub fn discard(mut self) {
        self.bomb.defuse();
    }
}

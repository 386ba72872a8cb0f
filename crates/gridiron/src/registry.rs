//! Control type registry.
//!
//! Maps the type name of a framework tag to a constructor, so an
//! `auto="true"` tag can instantiate its control without any code
//! declaring it. The registry is built once at startup and only read
//! afterwards; it holds plain function pointers and is `Send + Sync`.

use std::fmt;

use crate::control::{Control, ControlHandle, RegisteredControl};
use crate::error::GridResult;
use crate::page::Page;
use crate::ui::{Label, Value};

/// Describes one registered control type.
#[derive(Clone, Copy)]
pub struct ControlDescriptor {
    type_name: &'static str,
    allow_autonomous: bool,
    create: fn(&str) -> Box<dyn Control>,
}

impl fmt::Debug for ControlDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControlDescriptor")
            .field("type_name", &self.type_name)
            .field("allow_autonomous", &self.allow_autonomous)
            .finish()
    }
}

fn construct<C: RegisteredControl>(id: &str) -> Box<dyn Control> {
    Box::new(C::from_markup(id))
}

impl ControlDescriptor {
    pub fn of<C: RegisteredControl>() -> Self {
        Self {
            type_name: C::TYPE_NAME,
            allow_autonomous: C::ALLOW_AUTONOMOUS,
            create: construct::<C>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn allow_autonomous(&self) -> bool {
        self.allow_autonomous
    }

    /// Build an instance for markup, or `None` if the type refuses
    /// autonomous creation.
    pub fn create_object(&self, id: &str) -> Option<Box<dyn Control>> {
        self.allow_autonomous.then(|| (self.create)(id))
    }
}

/// Ordered list of control descriptors. The first match wins on lookup.
#[derive(Debug, Clone, Default)]
pub struct ControlRegistry {
    descriptors: Vec<ControlDescriptor>,
}

impl ControlRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in controls (`Label`, `Value`).
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register::<Label>();
        registry.register::<Value>();
        registry
    }

    pub fn register<C: RegisteredControl>(&mut self) -> &mut Self {
        self.register_descriptor(ControlDescriptor::of::<C>())
    }

    pub fn register_descriptor(&mut self, descriptor: ControlDescriptor) -> &mut Self {
        if self.contains(descriptor.type_name) {
            tracing::debug!(
                "Control type '{}' registered twice; the first registration wins",
                descriptor.type_name
            );
        }
        self.descriptors.push(descriptor);
        self
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Descriptor at `index`, in registration order.
    pub fn get(&self, index: usize) -> Option<&ControlDescriptor> {
        self.descriptors.get(index)
    }

    /// First descriptor registered under `type_name`.
    pub fn find(&self, type_name: &str) -> Option<&ControlDescriptor> {
        self.descriptors.iter().find(|d| d.type_name == type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.find(type_name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ControlDescriptor> {
        self.descriptors.iter()
    }

    /// Create an autonomous control of `type_name` under `parent`.
    ///
    /// Returns `Ok(None)` when the type is unknown or disallows autonomous
    /// creation; id errors from the page are passed through.
    pub fn create_by_type(
        &self,
        page: &mut Page,
        type_name: &str,
        id: &str,
        parent: ControlHandle,
    ) -> GridResult<Option<ControlHandle>> {
        let Some(control) = self.find(type_name).and_then(|d| d.create_object(id)) else {
            return Ok(None);
        };
        page.insert_control(parent, id, control, true).map(Some)
    }
}

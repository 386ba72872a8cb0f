//! Page variables.
//!
//! Controls publish values under dotted names (`lbl.Text`,
//! `gi.frontPage`) so other controls and templates can read them at
//! render time. A read/write variable shares its storage with the control
//! that registered it through a [`SharedText`] handle; a read-only one is
//! a fixed string.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// Text shared between a control and the page's variable table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SharedText(Rc<RefCell<String>>);

impl SharedText {
    pub fn new(text: impl Into<String>) -> Self {
        Self(Rc::new(RefCell::new(text.into())))
    }

    pub fn get(&self) -> String {
        self.0.borrow().clone()
    }

    pub fn set(&self, text: impl Into<String>) {
        *self.0.borrow_mut() = text.into();
    }
}

#[derive(Debug, Clone)]
enum Variable {
    Shared(SharedText),
    ReadOnly(String),
}

impl Variable {
    fn value(&self) -> String {
        match self {
            Variable::Shared(text) => text.get(),
            Variable::ReadOnly(text) => text.clone(),
        }
    }
}

/// Name → value table owned by a page.
#[derive(Debug, Clone, Default)]
pub struct VariableRegistry {
    vars: BTreeMap<String, Variable>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a read/write variable. Returns `false` if the name is
    /// invalid or already taken.
    pub fn register(&mut self, name: &str, text: SharedText) -> bool {
        self.insert(name, Variable::Shared(text))
    }

    /// Register a fixed value. Same rules as [`register`](Self::register).
    pub fn register_read_only(&mut self, name: &str, value: impl Into<String>) -> bool {
        self.insert(name, Variable::ReadOnly(value.into()))
    }

    fn insert(&mut self, name: &str, var: Variable) -> bool {
        if !is_valid_variable_name(name) {
            tracing::debug!("Rejected variable name '{}'", name);
            return false;
        }
        if self.vars.contains_key(name) {
            tracing::debug!("Variable '{}' is already registered", name);
            return false;
        }
        self.vars.insert(name.to_string(), var);
        true
    }

    /// Current value of `name`.
    pub fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).map(Variable::value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn is_read_only(&self, name: &str) -> bool {
        matches!(self.vars.get(name), Some(Variable::ReadOnly(_)))
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.vars.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

/// Variable names are non-empty runs of `A-Z a-z 0-9 _ - .`.
pub fn is_valid_variable_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

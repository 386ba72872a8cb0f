//! Controls and their page-side state.
//!
//! A control is a server-side object that renders one framework tag. The
//! page owns every control in an arena and hands out [`ControlHandle`]s;
//! parent and child links are handles into that arena, so a control never
//! points back at its page directly.

use std::any::Any;

use gridiron_parser::{Node, NodeId, Tree};

use crate::error::{GridError, GridResult};
use crate::page::RenderContext;
use crate::variables::{SharedText, VariableRegistry};

/// Control identifier (index into the page's control arena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ControlHandle(pub(crate) u32);

impl ControlHandle {
    /// The page itself, root of the control tree.
    pub const ROOT: ControlHandle = ControlHandle(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Behaviour of a control class.
///
/// `render` is the only required hook. `on_attach` runs once when the
/// control joins a page, `on_bind` once when a template node is bound to it.
pub trait Control: Any {
    /// Type name used in markup, e.g. `Label` for `<gi::Label>`.
    fn control_type(&self) -> &'static str;

    /// HTML tag the control renders as.
    fn render_tag(&self) -> &'static str {
        "div"
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String;

    fn on_attach(&mut self, _ctx: &mut AttachContext<'_>) {}

    fn on_bind(&mut self, _ctx: &BindContext<'_>) {}

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A control class the registry can build from markup.
pub trait RegisteredControl: Control + Sized {
    const TYPE_NAME: &'static str;

    /// Whether `auto="true"` tags may instantiate this type.
    const ALLOW_AUTONOMOUS: bool;

    /// Build an instance for a tag carrying `id`.
    fn from_markup(id: &str) -> Self;
}

/// Page-side bookkeeping for one control.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    id: String,
    parent: Option<ControlHandle>,
    children: Vec<ControlHandle>,
    autonomous: bool,
    bound_node: Option<NodeId>,
    view_state_enabled: bool,
    view_state_valid: bool,
}

impl ControlState {
    pub(crate) fn new(
        id: impl Into<String>,
        parent: Option<ControlHandle>,
        autonomous: bool,
    ) -> Self {
        Self {
            id: id.into(),
            parent,
            children: Vec::new(),
            autonomous,
            bound_node: None,
            view_state_enabled: false,
            view_state_valid: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// `None` only for the page root.
    pub fn parent(&self) -> Option<ControlHandle> {
        self.parent
    }

    /// Child controls in insertion order.
    pub fn children(&self) -> &[ControlHandle] {
        &self.children
    }

    /// True when the control was created from an `auto="true"` tag.
    pub fn is_autonomous(&self) -> bool {
        self.autonomous
    }

    pub fn bound_node(&self) -> Option<NodeId> {
        self.bound_node
    }

    pub fn view_state_enabled(&self) -> bool {
        self.view_state_enabled
    }

    pub fn set_view_state_enabled(&mut self, enabled: bool) {
        self.view_state_enabled = enabled;
    }

    pub fn view_state_valid(&self) -> bool {
        self.view_state_valid
    }

    pub fn set_view_state_valid(&mut self, valid: bool) {
        self.view_state_valid = valid;
    }

    pub(crate) fn add_child(&mut self, child: ControlHandle) {
        self.children.push(child);
    }

    pub(crate) fn remove_child(&mut self, child: ControlHandle) {
        self.children.retain(|&c| c != child);
    }

    /// Bind once; a second bind fails.
    pub(crate) fn bind(&mut self, node: NodeId) -> GridResult<()> {
        if self.bound_node.is_some() {
            return Err(GridError::AlreadyBound {
                id: self.id.clone(),
            });
        }
        self.bound_node = Some(node);
        Ok(())
    }
}

/// What a control sees when it joins a page.
pub struct AttachContext<'a> {
    pub(crate) id: &'a str,
    pub(crate) autonomous: bool,
    pub(crate) namespace: &'a str,
    pub(crate) variables: &'a mut VariableRegistry,
}

impl AttachContext<'_> {
    pub fn id(&self) -> &str {
        self.id
    }

    pub fn is_autonomous(&self) -> bool {
        self.autonomous
    }

    pub fn namespace(&self) -> &str {
        self.namespace
    }

    /// Publish a read/write variable. Returns `false` if the name is
    /// invalid or taken.
    pub fn register_variable(&mut self, name: &str, text: SharedText) -> bool {
        self.variables.register(name, text)
    }

    pub fn register_read_only_variable(&mut self, name: &str, value: impl Into<String>) -> bool {
        self.variables.register_read_only(name, value)
    }
}

/// What a control sees when a template node is bound to it.
pub struct BindContext<'a> {
    pub(crate) id: &'a str,
    pub(crate) node_id: NodeId,
    pub(crate) node: &'a Node,
    pub(crate) tree: &'a Tree,
}

impl BindContext<'_> {
    pub fn id(&self) -> &str {
        self.id
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn node(&self) -> &Node {
        self.node
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.node.attribute(key)
    }

    /// Raw template markup between the node's opening and closing tag.
    pub fn inner_html(&self) -> String {
        self.tree.inner_html(self.node_id)
    }
}

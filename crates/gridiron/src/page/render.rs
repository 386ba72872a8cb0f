use gridiron_parser::{Node, NodeId};

use super::{Page, PageStatus};
use crate::control::{ControlHandle, ControlState};

/// Emitted in place of a framework tag that has no bound control.
pub const ERROR_MARKER: &str = "<!-- ERROR rendering control: no instance found -->";

/// What a control sees while it renders.
pub struct RenderContext<'a> {
    page: &'a Page,
    handle: ControlHandle,
}

impl<'a> RenderContext<'a> {
    pub fn handle(&self) -> ControlHandle {
        self.handle
    }

    pub fn id(&self) -> &'a str {
        self.state().map(ControlState::id).unwrap_or_default()
    }

    pub fn state(&self) -> Option<&'a ControlState> {
        self.page.control_state(self.handle)
    }

    pub fn namespace(&self) -> &'a str {
        self.page.namespace()
    }

    /// Template node bound to the control.
    pub fn node(&self) -> Option<&'a Node> {
        let node = self.state()?.bound_node()?;
        self.page.tree().get(node)
    }

    pub fn variable(&self, name: &str) -> Option<String> {
        self.page.variable(name)
    }

    /// The bound node's content, with nested framework tags rendered by
    /// their own controls.
    pub fn render_children(&self) -> String {
        let mut out = String::new();
        if let Some(node) = self.state().and_then(ControlState::bound_node) {
            self.page.render_nodes(node, &mut out);
        }
        out
    }

    /// Child controls attached in code, rendered in order.
    pub fn render_child_controls(&self) -> String {
        let Some(state) = self.state() else {
            return String::new();
        };
        state
            .children()
            .iter()
            .map(|&child| self.page.render_control(child))
            .collect()
    }
}

impl Page {
    /// Render the page.
    ///
    /// Runs [`match_controls`](Page::match_controls) first if it has not
    /// run yet. The template tree is left untouched, so rendering again
    /// gives the same output unless controls or variables changed.
    pub fn render(&mut self) -> String {
        self.match_controls();
        self.advance(PageStatus::Rendering);

        let out = if self.source.is_empty() {
            self.render_control(ControlHandle::ROOT)
        } else {
            let mut out = String::new();
            self.render_nodes(self.tree.root(), &mut out);
            out
        };

        self.advance(PageStatus::RenderedReady);
        tracing::debug!("Rendered {} ({} bytes)", self.template_name, out.len());
        out
    }

    /// Render one control on its own.
    pub fn render_control(&self, handle: ControlHandle) -> String {
        match self.dyn_control(handle) {
            Some(control) => control.render(&RenderContext { page: self, handle }),
            None => String::new(),
        }
    }

    /// Append the markup of the children of `parent` to `out`.
    ///
    /// Plain nodes are copied through with their opening and closing text.
    /// A framework tag is handed to its bound control, which renders the
    /// whole subtree, or replaced by [`ERROR_MARKER`] when nothing is bound.
    pub(crate) fn render_nodes(&self, parent: NodeId, out: &mut String) {
        for &child in self.tree.children(parent) {
            let Some(node) = self.tree.get(child) else {
                continue;
            };

            if self.framework_tag(child).is_some() {
                match self.bound_control(child) {
                    Some(handle) => out.push_str(&self.render_control(handle)),
                    None => out.push_str(ERROR_MARKER),
                }
                continue;
            }

            out.push_str(node.text());
            self.render_nodes(child, out);
            out.push_str(node.closing_text());
        }
    }
}

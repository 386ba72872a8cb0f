//! Front-end pages.
//!
//! A page owns one template, its parsed tree, every control attached to
//! it and the variables those controls publish. Its life is a fixed
//! sequence of [`PageStatus`] steps:
//!
//! 1. construction reads and parses the template, then runs the discovery
//!    pass that instantiates `auto="true"` controls;
//! 2. application code declares its own controls with [`Page::add_control`];
//! 3. [`Page::match_controls`] binds the remaining tags to those controls;
//! 4. [`Page::render`] produces the output, as often as needed.
//!
//! A page is single-threaded; build one per request.

mod matching;
mod render;

pub use render::{RenderContext, ERROR_MARKER};

use std::any::Any;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use gridiron_parser::{NodeId, Parser, Tree};

use crate::config::Config;
use crate::control::{AttachContext, BindContext, Control, ControlHandle, ControlState};
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::error::{GridError, GridResult};
use crate::registry::ControlRegistry;
use crate::variables::{SharedText, VariableRegistry};

/// Template name of a page built without a template.
pub const MEMORY_TEMPLATE: &str = "::memory:";

/// Lifecycle of a page. Statuses only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PageStatus {
    Initializing,
    Reading,
    Parsing,
    ParsedReady,
    Matching,
    MatchedReady,
    Rendering,
    RenderedReady,
}

struct ControlSlot {
    state: ControlState,
    control: Box<dyn Control>,
}

/// Control behind the page root. Renders the page's top-level controls.
struct PageRoot;

impl Control for PageRoot {
    fn control_type(&self) -> &'static str {
        "Page"
    }

    fn render_tag(&self) -> &'static str {
        "html"
    }

    fn render(&self, ctx: &RenderContext<'_>) -> String {
        ctx.render_child_controls()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub struct Page {
    config: Config,
    template_name: String,
    template_path: Option<PathBuf>,
    source: String,
    tree: Tree,
    status: PageStatus,
    controls: Vec<Option<ControlSlot>>,
    ids: HashMap<String, ControlHandle>,
    bindings: HashMap<NodeId, ControlHandle>,
    variables: VariableRegistry,
    diagnostics: Vec<Diagnostic>,
}

impl Page {
    /// A page with no template. Rendering it renders its top-level
    /// controls in the order they were added.
    pub fn new(config: Config) -> Self {
        let mut page = Self::blank(config, MEMORY_TEMPLATE);
        page.advance(PageStatus::ParsedReady);
        page
    }

    /// Load `template` from the document root.
    ///
    /// Templates must be UTF-8; other bytes fail with [`GridError::Encoding`].
    /// An empty name gives the same template-less page as [`Page::new`].
    pub fn open(config: Config, registry: &ControlRegistry, template: &str) -> GridResult<Self> {
        if template.is_empty() {
            return Ok(Self::new(config));
        }

        let path = config.resolve(template);
        let mut page = Self::blank(config, template);
        page.advance(PageStatus::Reading);
        tracing::info!("Loading front-end page {}", path.display());

        let bytes = std::fs::read(&path).map_err(|source| GridError::FileOpen {
            path: path.clone(),
            source,
        })?;
        let source = String::from_utf8(bytes).map_err(|source| GridError::Encoding {
            path: path.clone(),
            source,
        })?;
        page.template_path = Some(path);
        page.load(registry, source)?;
        Ok(page)
    }

    /// Build a page from template text already in memory.
    pub fn from_source(
        config: Config,
        registry: &ControlRegistry,
        name: &str,
        source: impl Into<String>,
    ) -> GridResult<Self> {
        let mut page = Self::blank(config, name);
        page.advance(PageStatus::Reading);
        page.load(registry, source.into())?;
        Ok(page)
    }

    fn blank(config: Config, template_name: &str) -> Self {
        let id = format!("{}::Page::{}", config.namespace, template_name);
        let root = ControlSlot {
            state: ControlState::new(id.clone(), None, false),
            control: Box::new(PageRoot),
        };
        Self {
            config,
            template_name: template_name.to_string(),
            template_path: None,
            source: String::new(),
            tree: Tree::new(0),
            status: PageStatus::Initializing,
            controls: vec![Some(root)],
            ids: HashMap::from([(id, ControlHandle::ROOT)]),
            bindings: HashMap::new(),
            variables: VariableRegistry::new(),
            diagnostics: Vec::new(),
        }
    }

    fn load(&mut self, registry: &ControlRegistry, source: String) -> GridResult<()> {
        if source.is_empty() {
            return Err(GridError::EmptyTemplate {
                path: self.front_page(),
            });
        }

        self.advance(PageStatus::Parsing);
        let (tree, errors) = Parser::parse(&source);
        self.tree = tree;
        self.source = source;
        tracing::debug!("Parsed {} nodes from {}", self.tree.len(), self.template_name);
        for error in errors {
            let node = self.node_at(error.offset);
            self.diagnose(node, DiagnosticKind::MalformedMarkup { message: error.message });
        }

        self.register_builtin_variables();
        self.advance(PageStatus::ParsedReady);
        self.discover_autonomous(registry);
        Ok(())
    }

    /// First node starting at `offset`, or the root.
    fn node_at(&self, offset: usize) -> NodeId {
        let root = self.tree.root();
        self.tree
            .descendants(root)
            .find(|&id| self.tree.get(id).is_some_and(|n| n.offset() == offset))
            .unwrap_or(root)
    }

    fn front_page(&self) -> PathBuf {
        self.template_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(&self.template_name))
    }

    fn register_builtin_variables(&mut self) {
        let ns = self.config.namespace.clone();
        let front_page = self.front_page().display().to_string();
        self.variables
            .register_read_only(&format!("{ns}.frontPage"), front_page);
        self.variables
            .register_read_only(&format!("{ns}.codeBesideFilename"), self.template_name.clone());
        self.variables
            .register_read_only(&format!("{ns}.namespace"), ns.clone());
    }

    fn advance(&mut self, next: PageStatus) {
        if next > self.status {
            tracing::trace!("Page {}: {:?} -> {:?}", self.id(), self.status, next);
            self.status = next;
        }
    }

    // --- Accessors ---

    /// `<namespace>::Page::<template>`
    pub fn id(&self) -> &str {
        self.control_state(ControlHandle::ROOT)
            .map(ControlState::id)
            .unwrap_or_default()
    }

    pub fn status(&self) -> PageStatus {
        self.status
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn namespace(&self) -> &str {
        &self.config.namespace
    }

    pub fn template_name(&self) -> &str {
        &self.template_name
    }

    /// Resolved template path; `None` unless the page was opened from disk.
    pub fn template_path(&self) -> Option<&Path> {
        self.template_path.as_deref()
    }

    /// The template text as read.
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Mutable tree access for editing node text and attributes before
    /// rendering.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    // --- Controls ---

    /// Attach a control declared in code under `parent`.
    ///
    /// Fails if `id` is empty or already used anywhere on the page (the
    /// page's own id included); nothing is attached on failure.
    pub fn add_control<C: Control>(
        &mut self,
        parent: ControlHandle,
        id: &str,
        control: C,
    ) -> GridResult<ControlHandle> {
        self.insert_control(parent, id, Box::new(control), false)
    }

    pub(crate) fn insert_control(
        &mut self,
        parent: ControlHandle,
        id: &str,
        mut control: Box<dyn Control>,
        autonomous: bool,
    ) -> GridResult<ControlHandle> {
        if id.is_empty() {
            return Err(GridError::InvalidIdentifier);
        }
        if self.slot(parent).is_none() {
            return Err(GridError::UnknownControl);
        }
        if self.ids.contains_key(id) {
            return Err(GridError::DuplicateIdentifier { id: id.to_string() });
        }

        let mut ctx = AttachContext {
            id,
            autonomous,
            namespace: &self.config.namespace,
            variables: &mut self.variables,
        };
        control.on_attach(&mut ctx);

        let handle = ControlHandle(self.controls.len() as u32);
        tracing::debug!("Attached {} control '{}'", control.control_type(), id);
        self.controls.push(Some(ControlSlot {
            state: ControlState::new(id, Some(parent), autonomous),
            control,
        }));
        self.ids.insert(id.to_string(), handle);
        if let Some(slot) = self.slot_mut(parent) {
            slot.state.add_child(handle);
        }
        Ok(handle)
    }

    /// Detach `handle` and everything below it, leaves first.
    ///
    /// Returns `false` if the control is already gone or is the page root.
    pub fn remove_control(&mut self, handle: ControlHandle) -> bool {
        if handle == ControlHandle::ROOT {
            return false;
        }
        let Some(parent) = self.slot(handle).map(|s| s.state.parent()) else {
            return false;
        };

        let mut order = Vec::new();
        let mut stack = vec![handle];
        while let Some(current) = stack.pop() {
            order.push(current);
            if let Some(slot) = self.slot(current) {
                stack.extend(slot.state.children().iter().copied());
            }
        }

        for current in order.into_iter().rev() {
            let Some(slot) = self.controls.get_mut(current.index()).and_then(Option::take) else {
                continue;
            };
            self.ids.remove(slot.state.id());
            if let Some(node) = slot.state.bound_node() {
                self.bindings.remove(&node);
            }
            tracing::debug!("Removed control '{}'", slot.state.id());
        }

        if let Some(parent) = parent.and_then(|p| self.slot_mut(p)) {
            parent.state.remove_child(handle);
        }
        true
    }

    /// Look `id` up among the direct children of `scope`, then across the
    /// whole page when `search_global` is set.
    pub fn find_by_id(
        &self,
        scope: ControlHandle,
        id: &str,
        search_global: bool,
    ) -> Option<ControlHandle> {
        let child = self.slot(scope).and_then(|slot| {
            slot.state
                .children()
                .iter()
                .copied()
                .find(|&c| self.control_state(c).is_some_and(|s| s.id() == id))
        });
        match child {
            Some(handle) => Some(handle),
            None if search_global => self.find(id),
            None => None,
        }
    }

    /// Page-wide lookup by id.
    pub fn find(&self, id: &str) -> Option<ControlHandle> {
        self.ids.get(id).copied()
    }

    pub fn control_state(&self, handle: ControlHandle) -> Option<&ControlState> {
        self.slot(handle).map(|s| &s.state)
    }

    pub fn control_state_mut(&mut self, handle: ControlHandle) -> Option<&mut ControlState> {
        self.slot_mut(handle).map(|s| &mut s.state)
    }

    pub fn dyn_control(&self, handle: ControlHandle) -> Option<&dyn Control> {
        self.slot(handle).map(|s| s.control.as_ref())
    }

    /// The control behind `handle`, if it is a `C`.
    pub fn control<C: Control>(&self, handle: ControlHandle) -> Option<&C> {
        self.slot(handle)?.control.as_any().downcast_ref::<C>()
    }

    pub fn control_mut<C: Control>(&mut self, handle: ControlHandle) -> Option<&mut C> {
        self.slot_mut(handle)?.control.as_any_mut().downcast_mut::<C>()
    }

    /// `<namespace>::<type>` of the control behind `handle`.
    pub fn namespaced_tag(&self, handle: ControlHandle) -> Option<String> {
        self.dyn_control(handle)
            .map(|c| format!("{}::{}", self.config.namespace, c.control_type()))
    }

    /// Handles of every live control, the page root first.
    pub fn controls(&self) -> impl Iterator<Item = ControlHandle> + '_ {
        self.controls
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(i, _)| ControlHandle(i as u32))
    }

    /// Number of live controls, the page root included.
    pub fn control_count(&self) -> usize {
        self.controls.iter().filter(|s| s.is_some()).count()
    }

    /// Bind a template node to a control.
    ///
    /// A control binds at most once and a node belongs to at most one
    /// control.
    pub fn bind_node(&mut self, handle: ControlHandle, node: NodeId) -> GridResult<()> {
        let Some(node_ref) = self.tree.get(node) else {
            return Err(GridError::UnknownNode(node));
        };
        if let Some(&owner) = self.bindings.get(&node) {
            let id = self
                .control_state(owner)
                .map(|s| s.id().to_string())
                .unwrap_or_default();
            return Err(GridError::NodeAlreadyBound { node, id });
        }

        let slot = self
            .controls
            .get_mut(handle.index())
            .and_then(Option::as_mut)
            .ok_or(GridError::UnknownControl)?;
        slot.state.bind(node)?;

        let ctx = BindContext {
            id: slot.state.id(),
            node_id: node,
            node: node_ref,
            tree: &self.tree,
        };
        slot.control.on_bind(&ctx);
        self.bindings.insert(node, handle);
        Ok(())
    }

    /// Control bound to `node`, if any.
    pub fn bound_control(&self, node: NodeId) -> Option<ControlHandle> {
        self.bindings.get(&node).copied()
    }

    fn slot(&self, handle: ControlHandle) -> Option<&ControlSlot> {
        self.controls.get(handle.index()).and_then(Option::as_ref)
    }

    fn slot_mut(&mut self, handle: ControlHandle) -> Option<&mut ControlSlot> {
        self.controls.get_mut(handle.index()).and_then(Option::as_mut)
    }

    // --- Variables ---

    /// Publish a read/write variable. Returns `false` if `name` is invalid
    /// or taken.
    pub fn register_variable(&mut self, name: &str, text: SharedText) -> bool {
        self.variables.register(name, text)
    }

    pub fn register_read_only_variable(&mut self, name: &str, value: impl Into<String>) -> bool {
        self.variables.register_read_only(name, value)
    }

    pub fn variable(&self, name: &str) -> Option<String> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> &VariableRegistry {
        &self.variables
    }
}

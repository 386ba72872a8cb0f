//! Tag-to-control matching.
//!
//! Framework tags are matched in two passes over the tree. Discovery runs
//! while the page is built: every `auto="true"` tag gets a control created
//! through the registry and bound on the spot. The declared pass runs once
//! application code has attached its own controls, and binds each
//! remaining tag to the control carrying its id. Problems are recorded as
//! diagnostics and the tag renders as an error marker.

use gridiron_parser::NodeId;

use super::{Page, PageStatus};
use crate::control::ControlHandle;
use crate::diagnostic::{Diagnostic, DiagnosticKind};
use crate::registry::ControlRegistry;
use crate::tag::{parse_tag_name, FrameworkTag};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchPass {
    Discovery,
    Declared,
}

/// A well-formed framework tag found in the tree.
struct TagSite {
    node: NodeId,
    control_type: String,
    id: String,
    autonomous: bool,
}

impl Page {
    /// Parsed framework tag at `node`, if the node is one in this page's namespace.
    pub(crate) fn framework_tag(&self, node: NodeId) -> Option<FrameworkTag> {
        let node = self.tree.get(node)?;
        if !node.is_tag() {
            return None;
        }
        parse_tag_name(node.tag_name()).filter(|tag| tag.namespace == self.config.namespace)
    }

    /// Bind every tag not handled by discovery to the control declared
    /// with its id. Runs once; later calls do nothing.
    pub fn match_controls(&mut self) {
        if self.status >= PageStatus::Matching {
            return;
        }
        self.advance(PageStatus::Matching);

        let sites = self.tag_sites(MatchPass::Declared);
        tracing::debug!("Matching {} declared tags in {}", sites.len(), self.template_name);
        for site in sites.into_iter().filter(|s| !s.autonomous) {
            self.bind_declared(site);
        }

        self.advance(PageStatus::MatchedReady);
    }

    pub(super) fn discover_autonomous(&mut self, registry: &ControlRegistry) {
        let sites = self.tag_sites(MatchPass::Discovery);
        tracing::debug!("Discovering {} framework tags in {}", sites.len(), self.template_name);
        for site in sites.into_iter().filter(|s| s.autonomous) {
            self.create_autonomous(registry, site);
        }
    }

    fn create_autonomous(&mut self, registry: &ControlRegistry, site: TagSite) {
        if let Some(existing) = self.find(&site.id) {
            let existing = self.namespaced_tag(existing).unwrap_or_default();
            self.diagnose(
                site.node,
                DiagnosticKind::DuplicateAutonomousId {
                    id: site.id,
                    existing,
                },
            );
            return;
        }
        if !registry.contains(&site.control_type) {
            self.diagnose(
                site.node,
                DiagnosticKind::UnknownControlType {
                    control_type: site.control_type,
                    id: site.id,
                },
            );
            return;
        }

        let parent = self.enclosing_control(site.node);
        match registry.create_by_type(self, &site.control_type, &site.id, parent) {
            Ok(Some(handle)) => {
                if let Err(e) = self.bind_node(handle, site.node) {
                    tracing::warn!("Unable to bind '{}': {}", site.id, e);
                }
            }
            Ok(None) => self.diagnose(
                site.node,
                DiagnosticKind::AutonomyDenied {
                    control_type: site.control_type,
                    id: site.id,
                },
            ),
            Err(e) => tracing::warn!("Unable to create control '{}': {}", site.id, e),
        }
    }

    fn bind_declared(&mut self, site: TagSite) {
        let Some(handle) = self.find(&site.id) else {
            self.diagnose(site.node, DiagnosticKind::Unresolved { id: site.id });
            return;
        };

        let found = self.dyn_control(handle).map(|c| c.control_type());
        if let Some(found) = found.filter(|&found| found != site.control_type) {
            self.diagnose(
                site.node,
                DiagnosticKind::TypeMismatch {
                    id: site.id.clone(),
                    expected: site.control_type.clone(),
                    found: found.to_string(),
                },
            );
        }

        if self.bind_node(handle, site.node).is_err() {
            self.diagnose(site.node, DiagnosticKind::AlreadyBound { id: site.id });
        }
    }

    /// Well-formed framework tags in document order.
    ///
    /// Tags without a type or id are skipped; discovery reports them so
    /// they are reported once.
    fn tag_sites(&mut self, pass: MatchPass) -> Vec<TagSite> {
        let tags: Vec<(NodeId, FrameworkTag)> = self
            .tree
            .traverse()
            .filter_map(|node| self.framework_tag(node).map(|tag| (node, tag)))
            .collect();

        let mut sites = Vec::with_capacity(tags.len());
        for (node, tag) in tags {
            if tag.control_type.is_empty() {
                if pass == MatchPass::Discovery {
                    self.diagnose(node, DiagnosticKind::MissingType);
                }
                continue;
            }

            let Some(element) = self.tree.get(node) else {
                continue;
            };
            let id = element.attribute("id").filter(|id| !id.is_empty());
            let autonomous = element.attribute("auto") == Some("true");
            let Some(id) = id.map(str::to_string) else {
                if pass == MatchPass::Discovery {
                    self.diagnose(
                        node,
                        DiagnosticKind::MissingId {
                            control_type: tag.control_type,
                        },
                    );
                }
                continue;
            };

            sites.push(TagSite {
                node,
                control_type: tag.control_type,
                id,
                autonomous,
            });
        }
        sites
    }

    /// Nearest control bound to an ancestor of `node`, or the page root.
    fn enclosing_control(&self, node: NodeId) -> ControlHandle {
        let mut current = self.tree.parent(node);
        while let Some(ancestor) = current {
            if let Some(handle) = self.bound_control(ancestor) {
                return handle;
            }
            current = self.tree.parent(ancestor);
        }
        ControlHandle::ROOT
    }

    pub(super) fn diagnose(&mut self, node: NodeId, kind: DiagnosticKind) {
        let offset = self.tree.get(node).map(|n| n.offset()).unwrap_or(0);
        let diagnostic = Diagnostic { node, offset, kind };
        tracing::warn!("{}: {}", self.template_name, diagnostic);
        self.diagnostics.push(diagnostic);
    }
}

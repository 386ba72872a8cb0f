//! Template tree (arena-based allocation).

use crate::node::Node;

/// Node identifier (index into the tree arena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Root node ID
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Ordered N-ary tree of template nodes.
///
/// The root is a synthetic document node; nodes are never removed, so a
/// `NodeId` stays valid for the life of the tree.
#[derive(Debug, Clone)]
pub struct Tree {
    slots: Vec<Slot>,
}

impl Tree {
    /// Create a tree holding only a document root spanning `source_len` bytes.
    pub fn new(source_len: usize) -> Self {
        Self {
            slots: vec![Slot {
                node: Node::document(source_len),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by ID
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(id.index()).map(|s| &s.node)
    }

    /// Get a mutable node by ID
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(id.index()).map(|s| &mut s.node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.get(id.index()).and_then(|s| s.parent)
    }

    /// Children of `id` in document order (sibling iteration).
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.slots
            .get(id.index())
            .map(|s| s.children.as_slice())
            .unwrap_or(&[])
    }

    /// Append `node` as the last child of `parent`.
    pub fn append(&mut self, parent: NodeId, node: Node) -> NodeId {
        let id = NodeId(self.slots.len() as u32);
        self.slots.push(Slot {
            node,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(slot) = self.slots.get_mut(parent.index()) {
            slot.children.push(id);
        }
        id
    }

    /// Number of nodes, the document root included.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when nothing was parsed beyond the document root.
    pub fn is_empty(&self) -> bool {
        self.slots.len() <= 1
    }

    /// Every node in document order (pre-order), starting with the root.
    pub fn traverse(&self) -> Traverse<'_> {
        Traverse {
            tree: self,
            stack: vec![NodeId::ROOT],
        }
    }

    /// Every node below `id` in document order, `id` itself excluded.
    pub fn descendants(&self, id: NodeId) -> Traverse<'_> {
        Traverse {
            tree: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// Append the markup of `id` and its subtree to `out`.
    pub fn write_subtree(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.get(id) else {
            return;
        };
        out.push_str(node.text());
        for &child in self.children(id) {
            self.write_subtree(child, out);
        }
        out.push_str(node.closing_text());
    }

    /// Markup between the opening and closing tag of `id`.
    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_subtree(child, &mut out);
        }
        out
    }

    /// The whole tree serialized back to markup.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_subtree(NodeId::ROOT, &mut out);
        out
    }
}

/// Pre-order iterator over node IDs.
pub struct Traverse<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl Iterator for Traverse<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        self.stack
            .extend(self.tree.children(id).iter().rev().copied());
        Some(id)
    }
}

#![forbid(unsafe_code)]

//! The tree arena: node storage, structural validation, and change events.
//!
//! A [`Tree`] owns every [`TreeNode`] and hands out [`NodeId`]s. Consumers
//! hold ids, never references, so stale ids from removed subtrees are caught
//! by [`Tree::validate_node`] instead of dangling.
//!
//! Structural consistency (mutual parent/child links, reachability from the
//! root, absence of cycles) is checked on construction and on
//! [`Tree::refresh`]; mutations through the public API preserve it.

use std::collections::BTreeMap;
use std::fmt;

use crate::event::Emitter;
use crate::iter::{BreadthFirst, PreOrder, TraversalOptions};
use crate::node::{NodeId, NodeIdAllocator, TreeNode};

/// Structural validation and mutation errors for the tree arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    ZeroNodeId,
    NodeIdOverflow {
        current: NodeId,
    },
    UnknownNode {
        node_id: NodeId,
    },
    RootHasParent {
        root: NodeId,
        parent: NodeId,
    },
    MissingParent {
        node_id: NodeId,
        parent: NodeId,
    },
    MissingChild {
        parent: NodeId,
        child: NodeId,
    },
    DuplicateChild {
        parent: NodeId,
        child: NodeId,
    },
    ParentMismatch {
        node_id: NodeId,
        expected: Option<NodeId>,
        actual: Option<NodeId>,
    },
    CycleDetected {
        node_id: NodeId,
    },
    UnreachableNode {
        node_id: NodeId,
    },
    RemoveRoot {
        root: NodeId,
    },
}

impl fmt::Display for TreeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroNodeId => write!(f, "node id 0 is invalid"),
            Self::NodeIdOverflow { current } => {
                write!(f, "node id overflow after {current}")
            }
            Self::UnknownNode { node_id } => write!(f, "node {node_id} is not in this tree"),
            Self::RootHasParent { root, parent } => {
                write!(f, "root node {root} must not have parent {parent}")
            }
            Self::MissingParent { node_id, parent } => {
                write!(f, "node {node_id} references missing parent {parent}")
            }
            Self::MissingChild { parent, child } => {
                write!(f, "node {parent} references missing child {child}")
            }
            Self::DuplicateChild { parent, child } => {
                write!(f, "node {parent} lists child {child} more than once")
            }
            Self::ParentMismatch {
                node_id,
                expected,
                actual,
            } => write!(
                f,
                "node {node_id} parent link mismatch (expected {expected:?}, actual {actual:?})"
            ),
            Self::CycleDetected { node_id } => {
                write!(f, "cycle through node {node_id}")
            }
            Self::UnreachableNode { node_id } => {
                write!(f, "node {node_id} is unreachable from the root")
            }
            Self::RemoveRoot { root } => {
                write!(f, "cannot remove the root node {root}")
            }
        }
    }
}

impl std::error::Error for TreeError {}

/// Declarative description of a node used to build or extend a [`Tree`].
///
/// ```
/// use treetop_core::tree::{NodeSpec, Tree};
///
/// let tree = Tree::build(
///     NodeSpec::new("root")
///         .expanded(true)
///         .child(NodeSpec::new("a"))
///         .child(NodeSpec::new("b")),
/// )
/// .unwrap();
///
/// assert_eq!(tree.len(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct NodeSpec {
    label: String,
    children: Vec<NodeSpec>,
    expanded: Option<bool>,
    selectable: bool,
    visible: bool,
}

impl NodeSpec {
    /// Describe a leaf node with the given label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
            expanded: None,
            selectable: true,
            visible: true,
        }
    }

    /// Append a child description.
    #[must_use]
    pub fn child(mut self, child: NodeSpec) -> Self {
        self.children.push(child);
        self
    }

    /// Mark the node expandable with the given initial expansion state.
    #[must_use]
    pub fn expanded(mut self, expanded: bool) -> Self {
        self.expanded = Some(expanded);
        self
    }

    /// Set whether the node can take part in a selection.
    #[must_use]
    pub fn selectable(mut self, selectable: bool) -> Self {
        self.selectable = selectable;
        self
    }

    /// Set the node's own visibility flag.
    #[must_use]
    pub fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
}

/// The tree arena.
#[derive(Debug)]
pub struct Tree {
    nodes: BTreeMap<NodeId, TreeNode>,
    root: NodeId,
    allocator: NodeIdAllocator,
    on_changed: Emitter<()>,
    on_node_refreshed: Emitter<NodeId>,
}

impl Tree {
    /// Build a validated tree from a spec. Ids are assigned in pre-order
    /// starting at [`NodeId::MIN`].
    pub fn build(spec: NodeSpec) -> Result<Self, TreeError> {
        let mut tree = Self {
            nodes: BTreeMap::new(),
            root: NodeId::MIN,
            allocator: NodeIdAllocator::default(),
            on_changed: Emitter::new(),
            on_node_refreshed: Emitter::new(),
        };
        let root = tree.insert_spec(None, spec)?;
        tree.root = root;
        tree.validate()?;
        Ok(tree)
    }

    fn insert_spec(&mut self, parent: Option<NodeId>, spec: NodeSpec) -> Result<NodeId, TreeError> {
        let id = self.allocator.allocate()?;
        let mut node = TreeNode::new(spec.label);
        node.parent = parent;
        node.expanded = spec.expanded;
        node.selectable = spec.selectable;
        node.visible = spec.visible;
        self.nodes.insert(id, node);
        if let Some(parent) = parent {
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.children.push(id);
            }
        }
        for child in spec.children {
            self.insert_spec(Some(id), child)?;
        }
        Ok(id)
    }

    /// The current root id.
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Reassign the root. The new root must be part of the tree.
    pub fn set_root(&mut self, id: NodeId) -> Result<(), TreeError> {
        if !self.nodes.contains_key(&id) {
            return Err(TreeError::UnknownNode { node_id: id });
        }
        if self.root != id {
            self.root = id;
            self.on_changed.emit(&());
        }
        Ok(())
    }

    /// Look up a node.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(&id)
    }

    /// Identity check: returns the id back iff it names a node of this tree.
    #[must_use]
    pub fn validate_node(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.contains_key(&id).then_some(id)
    }

    /// Whether `id` names a node of this tree.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Total number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First node with the given label in pre-order from the root.
    #[must_use]
    pub fn find(&self, label: &str) -> Option<NodeId> {
        PreOrder::new(self, self.root, TraversalOptions::new())
            .find(|id| self.node(*id).is_some_and(|node| node.label() == label))
    }

    /// Transitive closure of the parent relation. A node is not its own
    /// ancestor.
    #[must_use]
    pub fn is_ancestor(&self, ancestor: NodeId, descendant: NodeId) -> bool {
        let mut current = self.node(descendant).and_then(TreeNode::parent);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).and_then(TreeNode::parent);
        }
        false
    }

    /// Effective visibility: the node's own flag, every ancestor's flag,
    /// and every expandable ancestor expanded.
    #[must_use]
    pub fn is_node_visible(&self, id: NodeId) -> bool {
        let Some(node) = self.node(id) else {
            return false;
        };
        if !node.is_visible() {
            return false;
        }
        let mut current = node.parent();
        while let Some(parent_id) = current {
            let Some(parent) = self.node(parent_id) else {
                return false;
            };
            if !parent.is_visible() || !parent.is_expanded() {
                return false;
            }
            current = parent.parent();
        }
        true
    }

    /// Insert a subtree under `parent`, returning the new subtree's root id.
    pub fn insert_child(&mut self, parent: NodeId, spec: NodeSpec) -> Result<NodeId, TreeError> {
        if !self.nodes.contains_key(&parent) {
            return Err(TreeError::UnknownNode { node_id: parent });
        }
        let id = self.insert_spec(Some(parent), spec)?;
        self.on_changed.emit(&());
        Ok(id)
    }

    /// Remove a node and its whole subtree. The root cannot be removed.
    pub fn remove_subtree(&mut self, id: NodeId) -> Result<(), TreeError> {
        if !self.nodes.contains_key(&id) {
            return Err(TreeError::UnknownNode { node_id: id });
        }
        if id == self.root {
            return Err(TreeError::RemoveRoot { root: self.root });
        }
        let doomed: Vec<NodeId> = PreOrder::new(self, id, TraversalOptions::new()).collect();
        if let Some(parent) = self.nodes.get(&id).and_then(TreeNode::parent) {
            if let Some(parent_node) = self.nodes.get_mut(&parent) {
                parent_node.children.retain(|child| *child != id);
            }
        }
        for node_id in doomed {
            self.nodes.remove(&node_id);
        }
        self.on_changed.emit(&());
        Ok(())
    }

    /// Set a node's own visibility flag. Returns whether the flag changed.
    pub fn set_visible(&mut self, id: NodeId, visible: bool) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) if node.visible != visible => {
                node.visible = visible;
                self.on_changed.emit(&());
                true
            }
            _ => false,
        }
    }

    /// Flip an expandable node's expansion flag. Returns whether it changed.
    ///
    /// This is the raw flag write; the expansion service is the intended
    /// caller and owns the corresponding change event.
    pub fn set_expanded(&mut self, id: NodeId, expanded: bool) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) if node.expanded.is_some() && node.expanded != Some(expanded) => {
                node.expanded = Some(expanded);
                true
            }
            _ => false,
        }
    }

    /// Write the cached `selected` flag. Returns whether it changed.
    ///
    /// The selection service's diff protocol is the intended caller; writing
    /// the flag from anywhere else desynchronizes it from the projection.
    pub fn set_selected(&mut self, id: NodeId, selected: bool) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) if node.selected != selected && node.selectable => {
                node.selected = selected;
                true
            }
            _ => false,
        }
    }

    /// Re-run structural validation and announce a whole-tree refresh.
    pub fn refresh(&mut self) -> Result<(), TreeError> {
        let root = self.root;
        self.refresh_node(root)
    }

    /// Re-run structural validation and announce a refresh rooted at `id`.
    pub fn refresh_node(&mut self, id: NodeId) -> Result<(), TreeError> {
        if !self.nodes.contains_key(&id) {
            return Err(TreeError::UnknownNode { node_id: id });
        }
        self.validate()?;
        self.on_node_refreshed.emit(&id);
        self.on_changed.emit(&());
        Ok(())
    }

    /// Structure change events (root reassignment, inserts, removals,
    /// visibility flips, refreshes).
    #[must_use]
    pub fn on_changed(&self) -> &Emitter<()> {
        &self.on_changed
    }

    /// Per-node refresh announcements.
    #[must_use]
    pub fn on_node_refreshed(&self) -> &Emitter<NodeId> {
        &self.on_node_refreshed
    }

    /// Check the arena's structural invariants.
    pub fn validate(&self) -> Result<(), TreeError> {
        let root_id = self.root;
        let root = self
            .nodes
            .get(&root_id)
            .ok_or(TreeError::UnknownNode { node_id: root_id })?;
        if let Some(parent) = root.parent() {
            return Err(TreeError::RootHasParent {
                root: root_id,
                parent,
            });
        }

        for (&id, node) in &self.nodes {
            if let Some(parent) = node.parent() {
                let parent_node = self
                    .nodes
                    .get(&parent)
                    .ok_or(TreeError::MissingParent { node_id: id, parent })?;
                if !parent_node.children().contains(&id) {
                    return Err(TreeError::ParentMismatch {
                        node_id: id,
                        expected: Some(parent),
                        actual: None,
                    });
                }
            }
            let mut seen = Vec::with_capacity(node.children().len());
            for &child in node.children() {
                if seen.contains(&child) {
                    return Err(TreeError::DuplicateChild { parent: id, child });
                }
                seen.push(child);
                let child_node = self
                    .nodes
                    .get(&child)
                    .ok_or(TreeError::MissingChild { parent: id, child })?;
                if child_node.parent() != Some(id) {
                    return Err(TreeError::ParentMismatch {
                        node_id: child,
                        expected: Some(id),
                        actual: child_node.parent(),
                    });
                }
            }
        }

        // Level-order sweep: every node reachable exactly once.
        let mut visited = Vec::with_capacity(self.nodes.len());
        for id in BreadthFirst::new(self, root_id, TraversalOptions::new()) {
            if visited.contains(&id) {
                return Err(TreeError::CycleDetected { node_id: id });
            }
            visited.push(id);
        }
        if visited.len() != self.nodes.len() {
            if let Some(unreachable) = self.nodes.keys().find(|id| !visited.contains(id)) {
                return Err(TreeError::UnreachableNode {
                    node_id: *unreachable,
                });
            }
        }
        Ok(())
    }
}

#![forbid(unsafe_code)]

//! Node identities and arena entries.
//!
//! Nodes live in a [`Tree`](crate::tree::Tree) arena and refer to each other
//! by [`NodeId`]. The parent link is a plain id (non-owning); the children
//! list owns the subtree order. Node equality throughout the crate is
//! identity equality on ids, never structural comparison.

use std::fmt;

use crate::tree::TreeError;

/// Stable identifier for tree nodes.
///
/// `0` is reserved/invalid so IDs are always non-zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Lowest valid node ID.
    pub const MIN: Self = Self(1);

    /// Create a new node ID, rejecting 0.
    pub fn new(raw: u64) -> Result<Self, TreeError> {
        if raw == 0 {
            return Err(TreeError::ZeroNodeId);
        }
        Ok(Self(raw))
    }

    /// Get the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Return the next ID, or an error on overflow.
    pub fn checked_next(self) -> Result<Self, TreeError> {
        let Some(next) = self.0.checked_add(1) else {
            return Err(TreeError::NodeIdOverflow { current: self });
        };
        Self::new(next)
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::MIN
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Deterministic allocator for node IDs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeIdAllocator {
    next: NodeId,
}

impl NodeIdAllocator {
    /// Start allocating from a known ID.
    #[must_use]
    pub const fn with_next(next: NodeId) -> Self {
        Self { next }
    }

    /// Peek at the next ID without consuming.
    #[must_use]
    pub const fn peek(&self) -> NodeId {
        self.next
    }

    /// Allocate the next ID and advance.
    pub fn allocate(&mut self) -> Result<NodeId, TreeError> {
        let current = self.next;
        self.next = current.checked_next()?;
        Ok(current)
    }
}

impl Default for NodeIdAllocator {
    fn default() -> Self {
        Self { next: NodeId::MIN }
    }
}

/// A node entry in the tree arena.
///
/// Capabilities are carried as data rather than as separate types:
///
/// - every node is a composite (`children`, possibly empty);
/// - `expanded: Some(_)` marks an expandable node whose collapsed subtree is
///   pruned from the collapse-pruned traversal order;
/// - `selectable` nodes carry the cached `selected` flag. The flag mirrors
///   the selection projection and is never authoritative on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    label: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) expanded: Option<bool>,
    pub(crate) selectable: bool,
    pub(crate) selected: bool,
    pub(crate) visible: bool,
}

impl TreeNode {
    pub(crate) fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            parent: None,
            children: Vec::new(),
            expanded: None,
            selectable: true,
            selected: false,
            visible: true,
        }
    }

    /// Get the label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Parent id, `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child ids in document order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Whether this node carries an expansion state at all.
    #[must_use]
    pub fn is_expandable(&self) -> bool {
        self.expanded.is_some()
    }

    /// Whether descendants take part in the collapse-pruned order.
    ///
    /// Non-expandable nodes never hide their children.
    #[must_use]
    pub fn is_expanded(&self) -> bool {
        self.expanded.unwrap_or(true)
    }

    /// Whether this node can take part in a selection.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        self.selectable
    }

    /// The cached selection flag.
    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.selected
    }

    /// This node's own visibility flag.
    ///
    /// Effective visibility also requires visible ancestors; see
    /// [`Tree::is_node_visible`](crate::tree::Tree::is_node_visible).
    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }
}

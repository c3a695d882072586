#![forbid(unsafe_code)]

//! The expansion service: expand/collapse flags and their change events.
//!
//! The service is the owner of expansion *events*; the raw flag lives on the
//! node. Every successful flip emits `on_expansion_changed` with the node id,
//! and listeners read the new state off the tree. Collapse reconciliation
//! (re-selecting the collapsing ancestor of a hidden selection) is driven by
//! these events in the tree model.

use tracing::trace;

use treetop_core::event::Emitter;
use treetop_core::iter::{PreOrder, TraversalOptions};
use treetop_core::node::NodeId;
use treetop_core::tree::Tree;

/// Expand/collapse operations over a tree.
#[derive(Debug, Default)]
pub struct ExpansionService {
    on_expansion_changed: Emitter<NodeId>,
    disposed: bool,
}

impl ExpansionService {
    /// Create the service.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expansion change events; the payload is the flipped node's id.
    #[must_use]
    pub fn on_expansion_changed(&self) -> &Emitter<NodeId> {
        &self.on_expansion_changed
    }

    /// Expand a collapsed expandable node. Returns whether anything changed.
    pub fn expand_node(&mut self, tree: &mut Tree, id: NodeId) -> bool {
        self.set_expansion(tree, id, true)
    }

    /// Collapse an expanded expandable node. Returns whether anything changed.
    pub fn collapse_node(&mut self, tree: &mut Tree, id: NodeId) -> bool {
        self.set_expansion(tree, id, false)
    }

    /// Flip a node's expansion state. Returns whether anything changed.
    pub fn toggle_node_expansion(&mut self, tree: &mut Tree, id: NodeId) -> bool {
        let Some(node) = tree.node(id) else {
            return false;
        };
        let expanded = node.is_expanded();
        self.set_expansion(tree, id, !expanded)
    }

    /// Collapse every expanded expandable node in the subtree under `id`,
    /// the deepest first. Returns the number of nodes collapsed.
    pub fn collapse_all(&mut self, tree: &mut Tree, id: NodeId) -> usize {
        if self.disposed || !tree.contains(id) {
            return 0;
        }
        let mut expanded: Vec<NodeId> = PreOrder::new(tree, id, TraversalOptions::new())
            .filter(|node_id| {
                tree.node(*node_id)
                    .is_some_and(|node| node.is_expandable() && node.is_expanded())
            })
            .collect();
        expanded.reverse();
        let mut collapsed = 0;
        for node_id in expanded {
            if self.set_expansion(tree, node_id, false) {
                collapsed += 1;
            }
        }
        collapsed
    }

    fn set_expansion(&mut self, tree: &mut Tree, id: NodeId, expanded: bool) -> bool {
        if self.disposed {
            return false;
        }
        if !tree.set_expanded(id, expanded) {
            return false;
        }
        trace!(node = %id, expanded, "expansion changed");
        self.on_expansion_changed.emit(&id);
        true
    }

    /// Tear down; all later operations become no-ops.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }
}

#![forbid(unsafe_code)]

//! The tree model: high-level selection operations over a tree.
//!
//! [`TreeModel`] binds the four collaborators (the tree arena, the
//! selection service, the expansion service, and the navigation history)
//! and translates high-level operations (select, range-select, keyboard
//! navigation, open, navigate) into gestures or direct selection
//! replacements. Any composition root may supply the collaborators.
//!
//! Collapse reconciliation: the model subscribes to expansion change events
//! and, after each expansion-mutating operation, re-selects the collapsing
//! ancestor whenever the collapse hid a selected descendant.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use treetop_core::event::{DisposableCollection, Emitter};
use treetop_core::iter::{BottomToTop, TopToBottom, TraversalOptions};
use treetop_core::node::{NodeId, TreeNode};
use treetop_core::tree::{Tree, TreeError};

use crate::expansion::ExpansionService;
use crate::navigation::NavigationHistory;
use crate::service::SelectionService;
use crate::state::{range_between, Gesture};

/// High-level façade over tree, selection, expansion, and navigation.
#[derive(Debug)]
pub struct TreeModel {
    tree: Tree,
    selection: SelectionService,
    expansion: ExpansionService,
    navigation: NavigationHistory,
    on_open_node: Emitter<NodeId>,
    on_changed: Emitter<()>,
    /// Expansion events land here synchronously; reconciliation drains the
    /// queue once the triggering operation has finished mutating.
    collapsed_queue: Rc<RefCell<Vec<NodeId>>>,
    subscriptions: DisposableCollection,
    disposed: bool,
}

impl TreeModel {
    /// Bind the four collaborators.
    #[must_use]
    pub fn new(
        tree: Tree,
        selection: SelectionService,
        expansion: ExpansionService,
        navigation: NavigationHistory,
    ) -> Self {
        let collapsed_queue: Rc<RefCell<Vec<NodeId>>> = Rc::new(RefCell::new(Vec::new()));
        let mut subscriptions = DisposableCollection::new();

        let queue = Rc::clone(&collapsed_queue);
        subscriptions.push(
            expansion
                .on_expansion_changed()
                .subscribe(move |id: &NodeId| queue.borrow_mut().push(*id)),
        );

        let on_changed = Emitter::new();
        let forward = on_changed.clone();
        subscriptions.push(tree.on_changed().subscribe(move |()| forward.emit(&())));

        Self {
            tree,
            selection,
            expansion,
            navigation,
            on_open_node: Emitter::new(),
            on_changed,
            collapsed_queue,
            subscriptions,
            disposed: false,
        }
    }

    /// Bind a tree to freshly-created default collaborators.
    #[must_use]
    pub fn from_tree(tree: Tree) -> Self {
        Self::new(
            tree,
            SelectionService::new(),
            ExpansionService::new(),
            NavigationHistory::new(),
        )
    }

    /// The underlying tree.
    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// The current projection, most-recent first.
    #[must_use]
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.selection.selected_nodes(&self.tree)
    }

    /// Selection change events; the payload is the post-commit projection.
    #[must_use]
    pub fn on_selection_changed(&self) -> &Emitter<Vec<NodeId>> {
        self.selection.on_selection_changed()
    }

    /// Open requests fired by [`open_node`](Self::open_node).
    #[must_use]
    pub fn on_open_node(&self) -> &Emitter<NodeId> {
        &self.on_open_node
    }

    /// Re-emitted tree change events.
    #[must_use]
    pub fn on_changed(&self) -> &Emitter<()> {
        &self.on_changed
    }

    /// Forward a raw gesture to the selection service.
    pub fn add_selection(&mut self, gesture: Gesture) {
        if self.disposed {
            return;
        }
        self.selection.add_selection(&mut self.tree, gesture);
    }

    /// Replace the selection with the given ordered list (head most recent).
    pub fn set_selection(&mut self, nodes: &[NodeId]) {
        if self.disposed {
            return;
        }
        self.selection.set_selection(&mut self.tree, nodes);
    }

    /// Select a node. Without `preserve_selection` this replaces the whole
    /// selection; with it the node moves (or enters) at the most-recent
    /// position and the rest is kept.
    pub fn select_node(&mut self, id: NodeId, preserve_selection: bool) {
        if self.disposed || !self.is_selectable(id) {
            return;
        }
        if !preserve_selection {
            self.selection.add_selection(&mut self.tree, Gesture::Select(id));
            return;
        }
        let current = self.selected_nodes();
        if current.first() == Some(&id) {
            return;
        }
        let mut next = Vec::with_capacity(current.len() + 1);
        next.push(id);
        next.extend(current.into_iter().filter(|member| *member != id));
        self.selection.set_selection(&mut self.tree, &next);
    }

    /// Remove a node from the selection, keeping the remainder in order.
    pub fn unselect_node(&mut self, id: NodeId) {
        if self.disposed {
            return;
        }
        let next: Vec<NodeId> = self
            .selected_nodes()
            .into_iter()
            .filter(|member| *member != id)
            .collect();
        self.selection.set_selection(&mut self.tree, &next);
    }

    /// Toggle a node in or out of the selection, preserving the rest.
    pub fn toggle_selection(&mut self, id: NodeId) {
        if self.disposed || !self.is_selectable(id) {
            return;
        }
        if self.tree.node(id).is_some_and(TreeNode::is_selected) {
            self.unselect_node(id);
        } else {
            self.select_node(id, true);
        }
    }

    /// The inclusive node list between `from` and `to` in collapse-pruned
    /// pre-order, ordered from `from` toward `to`. Empty when either endpoint
    /// is unknown, unselectable, hidden, or when they coincide.
    #[must_use]
    pub fn selection_range(&self, to: NodeId, from: NodeId) -> Vec<NodeId> {
        if from == to || !self.is_selectable(from) || !self.is_selectable(to) {
            return Vec::new();
        }
        range_between(&self.tree, from, to)
    }

    /// Select the range between `from` (default: the current most-recent
    /// selection) and `to`. With `preserve_selection` the prior selection
    /// survives behind the range, minus any nodes the range covers.
    pub fn select_range(&mut self, to: NodeId, from: Option<NodeId>, preserve_selection: bool) {
        if self.disposed {
            return;
        }
        let Some(from) = from.or_else(|| self.selected_nodes().first().copied()) else {
            return;
        };
        let range = self.selection_range(to, from);
        if range.is_empty() {
            return;
        }
        let next = if preserve_selection {
            let mut list = range.clone();
            list.extend(
                self.selected_nodes()
                    .into_iter()
                    .filter(|member| !range.contains(member)),
            );
            list
        } else {
            range
        };
        self.selection.set_selection(&mut self.tree, &next);
    }

    /// Move the selection to the previous visible node in document order.
    pub fn select_prev_node(&mut self, preserve_selection: bool) {
        if self.disposed {
            return;
        }
        let options = TraversalOptions::new().prune_collapsed(true);
        let found = match self.selected_nodes().first().copied() {
            Some(start) => BottomToTop::new(&self.tree, start, options)
                .skip(1)
                .find(|id| self.is_navigable(*id)),
            None => BottomToTop::new(&self.tree, self.tree.root(), options)
                .find(|id| self.is_navigable(*id)),
        };
        if let Some(found) = found {
            self.select_node(found, preserve_selection);
        }
    }

    /// Move the selection to the next visible node in document order.
    pub fn select_next_node(&mut self, preserve_selection: bool) {
        if self.disposed {
            return;
        }
        let options = TraversalOptions::new().prune_collapsed(true);
        let found = match self.selected_nodes().first().copied() {
            Some(start) => TopToBottom::new(&self.tree, start, options)
                .skip(1)
                .find(|id| self.is_navigable(*id)),
            None => TopToBottom::new(&self.tree, self.tree.root(), options)
                .find(|id| self.is_navigable(*id)),
        };
        if let Some(found) = found {
            self.select_node(found, preserve_selection);
        }
    }

    /// With exactly one node selected, select its nearest visible selectable
    /// ancestor.
    pub fn select_parent(&mut self) {
        if self.disposed {
            return;
        }
        let current = self.selected_nodes();
        let [only] = current.as_slice() else {
            return;
        };
        let mut ancestor = self.tree.node(*only).and_then(TreeNode::parent);
        while let Some(id) = ancestor {
            if self.is_navigable(id) {
                self.select_node(id, false);
                return;
            }
            ancestor = self.tree.node(id).and_then(TreeNode::parent);
        }
    }

    /// Fire an open request for the node (default: the most-recent selection)
    /// and toggle its expansion when it is expandable.
    pub fn open_node(&mut self, node: Option<NodeId>) {
        if self.disposed {
            return;
        }
        let Some(id) = node.or_else(|| self.selected_nodes().first().copied()) else {
            return;
        };
        if !self.tree.contains(id) {
            return;
        }
        self.on_open_node.emit(&id);
        if self.tree.node(id).is_some_and(TreeNode::is_expandable) {
            self.toggle_node_expansion(id);
        }
    }

    /// Make `id` the tree root, recording the move in the navigation history.
    pub fn navigate_to(&mut self, id: NodeId) {
        if self.disposed || !self.tree.contains(id) {
            return;
        }
        if self.navigation.is_empty() {
            // Seed the timeline with the pre-navigation root so backward
            // navigation can restore it.
            let origin = self.tree.root();
            self.navigation.push(origin);
        }
        self.navigation.push(id);
        self.apply_navigation(id);
    }

    /// Re-apply the next entry of the navigation history.
    pub fn navigate_forward(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(id) = self.navigation.advance() {
            self.apply_navigation(id);
        }
    }

    /// Re-apply the previous entry of the navigation history.
    pub fn navigate_backward(&mut self) {
        if self.disposed {
            return;
        }
        if let Some(id) = self.navigation.retreat() {
            self.apply_navigation(id);
        }
    }

    fn apply_navigation(&mut self, id: NodeId) {
        if !self.tree.contains(id) {
            return;
        }
        debug!(node = %id, "navigating");
        // Root reassignment drops the old selection wholesale.
        self.selection.add_selection(&mut self.tree, Gesture::Reset);
        if self.tree.set_root(id).is_err() {
            return;
        }
        if self.tree.node(id).is_some_and(TreeNode::is_expandable) {
            self.expansion.expand_node(&mut self.tree, id);
            self.reconcile_collapsed();
        }
        if self.is_selectable(id) {
            self.selection.set_selection(&mut self.tree, &[id]);
        }
    }

    /// Expand a node.
    pub fn expand_node(&mut self, id: NodeId) -> bool {
        if self.disposed {
            return false;
        }
        let changed = self.expansion.expand_node(&mut self.tree, id);
        self.reconcile_collapsed();
        changed
    }

    /// Collapse a node, reconciling any selection it hides.
    pub fn collapse_node(&mut self, id: NodeId) -> bool {
        if self.disposed {
            return false;
        }
        let changed = self.expansion.collapse_node(&mut self.tree, id);
        self.reconcile_collapsed();
        changed
    }

    /// Toggle a node's expansion, reconciling any selection a collapse hides.
    pub fn toggle_node_expansion(&mut self, id: NodeId) -> bool {
        if self.disposed {
            return false;
        }
        let changed = self.expansion.toggle_node_expansion(&mut self.tree, id);
        self.reconcile_collapsed();
        changed
    }

    /// Collapse every expanded node under `id`, reconciling afterwards.
    pub fn collapse_all(&mut self, id: NodeId) -> usize {
        if self.disposed {
            return 0;
        }
        let collapsed = self.expansion.collapse_all(&mut self.tree, id);
        self.reconcile_collapsed();
        collapsed
    }

    /// Re-validate the tree and announce a whole-tree refresh.
    pub fn refresh(&mut self) -> Result<(), TreeError> {
        self.tree.refresh()
    }

    /// Tear down subscriptions and services; later operations are no-ops.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        self.subscriptions.dispose();
        self.selection.dispose();
        self.expansion.dispose();
    }

    /// Whether [`dispose`](Self::dispose) has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    fn is_selectable(&self, id: NodeId) -> bool {
        self.tree.node(id).is_some_and(TreeNode::is_selectable)
    }

    /// Selectable and effectively visible: a keyboard-navigation target.
    fn is_navigable(&self, id: NodeId) -> bool {
        self.is_selectable(id) && self.tree.is_node_visible(id)
    }

    /// Drain queued expansion events; for each node that ended up collapsed
    /// while hiding a selected descendant, select that node instead.
    fn reconcile_collapsed(&mut self) {
        let pending: Vec<NodeId> = self.collapsed_queue.borrow_mut().drain(..).collect();
        for id in pending {
            let hides_selection = {
                let Some(node) = self.tree.node(id) else {
                    continue;
                };
                if node.is_expanded() {
                    continue;
                }
                node.is_selectable()
                    && self.tree.is_node_visible(id)
                    && self
                        .selection
                        .selected_nodes(&self.tree)
                        .iter()
                        .any(|selected| self.tree.is_ancestor(id, *selected))
            };
            if hides_selection {
                debug!(node = %id, "collapse hid selected descendants, selecting ancestor");
                self.selection.set_selection(&mut self.tree, &[id]);
            }
        }
    }
}

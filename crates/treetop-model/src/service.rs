#![forbid(unsafe_code)]

//! The selection service: the single writer of `selected` flags.
//!
//! The service owns exactly one current [`SelectionState`]. Each accepted
//! gesture derives the successor state, diffs the two projections, writes
//! the node flags for the difference only, commits the new state, and emits
//! at most one change event carrying the post-commit projection. Nothing
//! else in the system writes `selected` flags, which keeps them consistent
//! with the projection at all times.
//!
//! Gestures against unknown or unselectable nodes are ignored without an
//! event: selection is a UI affordance and a click against a stale node must
//! not disrupt the user.

use tracing::{debug, trace};

use treetop_core::event::Emitter;
use treetop_core::node::NodeId;
use treetop_core::tree::Tree;

use crate::state::{Gesture, SelectionState};

/// Service wrapper around the gesture-stack state.
#[derive(Debug, Default)]
pub struct SelectionService {
    state: SelectionState,
    on_selection_changed: Emitter<Vec<NodeId>>,
    disposed: bool,
}

impl SelectionService {
    /// Create a service with an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current state value.
    #[must_use]
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    /// The current projection, most-recent first.
    #[must_use]
    pub fn selected_nodes(&self, tree: &Tree) -> Vec<NodeId> {
        self.state.projection(tree)
    }

    /// Change events; the payload is the post-commit projection.
    #[must_use]
    pub fn on_selection_changed(&self) -> &Emitter<Vec<NodeId>> {
        &self.on_selection_changed
    }

    /// Feed a gesture through the state machine and commit the result.
    pub fn add_selection(&mut self, tree: &mut Tree, gesture: Gesture) {
        if self.disposed {
            return;
        }
        if let Some(node) = gesture.node() {
            let valid = tree.node(node).is_some_and(|n| n.is_selectable());
            if !valid {
                trace!(%node, "ignoring gesture against unknown or unselectable node");
                return;
            }
        }
        let next = self.state.next(tree, gesture);
        self.apply_state(tree, next);
    }

    /// Replace the selection with the given ordered list (first element most
    /// recent). Unknown/unselectable nodes and repeated ids are dropped.
    /// Commits once, emitting at most one event.
    pub fn set_selection(&mut self, tree: &mut Tree, nodes: &[NodeId]) {
        if self.disposed {
            return;
        }
        let mut kept: Vec<NodeId> = Vec::with_capacity(nodes.len());
        for &node in nodes {
            let valid = tree.node(node).is_some_and(|n| n.is_selectable());
            if valid && !kept.contains(&node) {
                kept.push(node);
            }
        }
        // Fold the list through the gesture model, oldest first, so the head
        // of the list ends up most recent.
        let mut state = SelectionState::new();
        for &node in kept.iter().rev() {
            state = state.next(tree, Gesture::Toggle(node));
        }
        self.apply_state(tree, state);
    }

    /// Commit `state`: diff projections, write flags for the difference,
    /// replace the state, fire one event. Equal projections commit nothing.
    pub(crate) fn apply_state(&mut self, tree: &mut Tree, state: SelectionState) {
        if self.disposed {
            return;
        }
        let old = self.state.projection(tree);
        let new = state.projection(tree);
        let to_unselect: Vec<NodeId> = old.iter().filter(|id| !new.contains(id)).copied().collect();
        let to_select: Vec<NodeId> = new.iter().filter(|id| !old.contains(id)).copied().collect();
        if to_unselect.is_empty() && to_select.is_empty() {
            trace!("projection unchanged, nothing to commit");
            return;
        }
        for &id in &to_unselect {
            tree.set_selected(id, false);
        }
        for &id in &to_select {
            tree.set_selected(id, true);
        }
        self.state = state;
        debug!(
            selected = to_select.len(),
            unselected = to_unselect.len(),
            total = new.len(),
            "selection committed"
        );
        self.on_selection_changed.emit(&new);
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

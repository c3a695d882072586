#![forbid(unsafe_code)]

//! The selection state: an immutable stack of gestures.
//!
//! Every user gesture produces a *new* state value via [`SelectionState::next`];
//! nothing is mutated in place. The ordered list of selected nodes is derived
//! on demand by [`SelectionState::projection`], most-recent first. Keeping the
//! gesture history (rather than a bare set) is what preserves recency order
//! across arbitrary edit sequences and lets a later point toggle split an
//! earlier range.
//!
//! Stack invariants:
//!
//! - no `Select` (default) gestures are ever stored; an incoming default is
//!   normalized to the one-entry stack `[Toggle(node)]`;
//! - every [`StackEntry::Range`] above the bottom of the stack is immediately
//!   preceded by a [`StackEntry::Toggle`], its anchor. A range at the very
//!   bottom has no anchor and contributes nothing to the projection.

use std::fmt;

use treetop_core::iter::{PreOrder, TraversalOptions};
use treetop_core::node::NodeId;
use treetop_core::tree::Tree;

/// A user selection gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Plain click: the node becomes the only selection.
    Select(NodeId),
    /// Ctrl-click: toggle the node in or out of the selection.
    Toggle(NodeId),
    /// Shift-click: extend a contiguous range from the current anchor.
    Range(NodeId),
    /// Drop the whole selection (e.g. when the root is reassigned).
    Reset,
}

impl Gesture {
    /// The node the gesture addresses, if any.
    #[must_use]
    pub fn node(self) -> Option<NodeId> {
        match self {
            Self::Select(node) | Self::Toggle(node) | Self::Range(node) => Some(node),
            Self::Reset => None,
        }
    }
}

/// A stored gesture. Defaults never appear here; see the module docs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackEntry {
    Toggle(NodeId),
    Range(NodeId),
}

impl StackEntry {
    /// The node the entry addresses.
    #[must_use]
    pub fn node(self) -> NodeId {
        match self {
            Self::Toggle(node) | Self::Range(node) => node,
        }
    }

    /// Whether this entry is a range gesture.
    #[must_use]
    pub fn is_range(self) -> bool {
        matches!(self, Self::Range(_))
    }
}

/// Errors for malformed gesture stacks.
///
/// These indicate an internal-invariant violation in the caller, not a user
/// mistake: the public gesture API cannot produce them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionStateError {
    /// A range entry with no toggle anchor immediately below it.
    InvalidGesture { index: usize },
}

impl fmt::Display for SelectionStateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidGesture { index } => {
                write!(f, "range gesture at stack index {index} has no toggle anchor")
            }
        }
    }
}

impl std::error::Error for SelectionStateError {}

/// Immutable selection state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionState {
    stack: Vec<StackEntry>,
}

impl SelectionState {
    /// The empty state: nothing selected.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a state from an explicit stack, asserting the anchor invariant.
    pub fn with_stack(stack: Vec<StackEntry>) -> Result<Self, SelectionStateError> {
        for (index, entry) in stack.iter().enumerate() {
            if entry.is_range() && index > 0 && stack[index - 1].is_range() {
                return Err(SelectionStateError::InvalidGesture { index });
            }
        }
        Ok(Self { stack })
    }

    /// The stored gesture stack, oldest first.
    #[must_use]
    pub fn stack(&self) -> &[StackEntry] {
        &self.stack
    }

    /// Whether the stack is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// Apply a gesture, returning the successor state. Pure: `self` is left
    /// untouched.
    #[must_use]
    pub fn next(&self, tree: &Tree, gesture: Gesture) -> Self {
        match gesture {
            Gesture::Reset => Self::new(),
            Gesture::Select(node) => Self {
                stack: vec![StackEntry::Toggle(node)],
            },
            Gesture::Toggle(node) => Self {
                stack: self.toggled(tree, node),
            },
            Gesture::Range(node) => Self {
                stack: self.ranged(tree, node),
            },
        }
    }

    /// Toggle transition: split the topmost range when the node falls inside
    /// it, otherwise cancel equal toggles above the topmost range, otherwise
    /// push.
    fn toggled(&self, tree: &Tree, node: NodeId) -> Vec<StackEntry> {
        let stack = &self.stack;
        let topmost_range = stack.iter().rposition(|entry| entry.is_range());

        if let Some(index) = topmost_range {
            // A bottom-of-stack range has no anchor and cannot be split.
            if index > 0 {
                let anchor = stack[index - 1].node();
                let segment = range_between(tree, anchor, stack[index].node());
                if segment.contains(&node) {
                    // Split: the range becomes point toggles for its members,
                    // minus the anchor (still present as the preceding toggle)
                    // and minus the node being removed.
                    let mut next: Vec<StackEntry> = stack[..index].to_vec();
                    next.extend(
                        segment
                            .iter()
                            .copied()
                            .filter(|member| *member != anchor && *member != node)
                            .map(StackEntry::Toggle),
                    );
                    next.extend_from_slice(&stack[index + 1..]);
                    return next;
                }
            }
        }

        // Merge: cancel equal toggles in the prefix above the topmost range.
        let boundary = topmost_range.map_or(0, |index| index + 1);
        let mut next: Vec<StackEntry> = stack[..boundary].to_vec();
        let mut cancelled = false;
        for entry in &stack[boundary..] {
            match entry {
                StackEntry::Toggle(other) if *other == node => cancelled = true,
                _ => next.push(*entry),
            }
        }
        if cancelled {
            return next;
        }
        let mut next = stack.clone();
        next.push(StackEntry::Toggle(node));
        next
    }

    /// Range transition: re-anchor on the toggle below, subsuming point
    /// toggles the new range covers.
    fn ranged(&self, tree: &Tree, node: NodeId) -> Vec<StackEntry> {
        let mut stack = self.stack.clone();
        if stack.last().is_some_and(|entry| entry.is_range()) {
            // The user is reshaping the most recent range.
            stack.pop();
        }
        let Some(top) = stack.last().copied() else {
            // No anchor: the stored range contributes nothing.
            return vec![StackEntry::Range(node)];
        };
        let anchor = top.node();
        let segment = range_between(tree, anchor, node);
        let boundary = stack
            .iter()
            .rposition(|entry| entry.is_range())
            .map_or(0, |index| index + 1);
        let mut next: Vec<StackEntry> = stack[..boundary].to_vec();
        for entry in &stack[boundary..] {
            match entry {
                StackEntry::Toggle(member)
                    if *member != anchor && segment.contains(member) => {}
                _ => next.push(*entry),
            }
        }
        next.push(StackEntry::Range(node));
        next
    }

    /// Fold the stack into the ordered selection, most-recent first.
    #[must_use]
    pub fn projection(&self, tree: &Tree) -> Vec<NodeId> {
        let mut list: Vec<NodeId> = Vec::new();
        for (index, entry) in self.stack.iter().enumerate() {
            match *entry {
                StackEntry::Toggle(node) => {
                    // Nodes removed from the tree after being selected drop
                    // out of the projection.
                    if tree.contains(node) {
                        list.retain(|member| *member != node);
                        list.push(node);
                    }
                }
                StackEntry::Range(node) => {
                    let Some(previous) = index.checked_sub(1).map(|i| self.stack[i]) else {
                        // No anchor below: empty contribution.
                        continue;
                    };
                    let anchor = previous.node();
                    if !previous.is_range() {
                        // The anchor re-enters as the head of the range walk.
                        list.retain(|member| *member != anchor);
                    }
                    for member in range_between(tree, anchor, node) {
                        list.retain(|existing| *existing != member);
                        list.push(member);
                    }
                }
            }
        }
        list.reverse();
        list
    }
}

/// The contiguous segment between `anchor` and `node` in collapse-pruned
/// pre-order, restricted to visible selectable nodes and ordered from the
/// anchor toward the node (reversed traversal order when the node precedes
/// the anchor). Unknown or hidden endpoints yield an empty segment.
pub(crate) fn range_between(tree: &Tree, anchor: NodeId, node: NodeId) -> Vec<NodeId> {
    let order: Vec<NodeId> =
        PreOrder::new(tree, tree.root(), TraversalOptions::new().prune_collapsed(true))
            .filter(|id| {
                tree.node(*id).is_some_and(|n| n.is_selectable()) && tree.is_node_visible(*id)
            })
            .collect();
    let Some(from) = order.iter().position(|id| *id == anchor) else {
        return Vec::new();
    };
    if anchor == node {
        return vec![anchor];
    }
    let Some(to) = order.iter().position(|id| *id == node) else {
        return Vec::new();
    };
    if from <= to {
        order[from..=to].to_vec()
    } else {
        let mut segment = order[to..=from].to_vec();
        segment.reverse();
        segment
    }
}

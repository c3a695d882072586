#![forbid(unsafe_code)]

//! Traversal iterators over the tree arena.
//!
//! Four orderings, each finite, single-pass, and yielding every node at most
//! once:
//!
//! - [`PreOrder`]: depth-first, children left to right.
//! - [`BreadthFirst`]: level order.
//! - [`TopToBottom`]: whole-tree pre-order fast-forwarded to a start node
//!   (the start, then its document-order successors).
//! - [`BottomToTop`]: the exact reverse sequence, ending at the tree root.
//!
//! All four honor [`TraversalOptions::prune_collapsed`]: when set, children
//! of a collapsed expandable node are skipped. A start id that is not part
//! of the tree yields only itself.

use crate::node::NodeId;
use crate::tree::Tree;

/// Options shared by all traversal iterators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TraversalOptions {
    prune_collapsed: bool,
}

impl TraversalOptions {
    /// Default options: collapsed subtrees are traversed.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            prune_collapsed: false,
        }
    }

    /// Skip the children of collapsed expandable nodes.
    #[must_use]
    pub const fn prune_collapsed(mut self, prune: bool) -> Self {
        self.prune_collapsed = prune;
        self
    }

    fn descends_into(self, tree: &Tree, id: NodeId) -> bool {
        !self.prune_collapsed || tree.node(id).is_some_and(|node| node.is_expanded())
    }
}

/// Depth-first pre-order over the subtree rooted at the start node.
#[derive(Debug)]
pub struct PreOrder<'a> {
    tree: &'a Tree,
    options: TraversalOptions,
    stack: Vec<NodeId>,
    orphan: Option<NodeId>,
}

impl<'a> PreOrder<'a> {
    /// Iterate the subtree under `start`.
    #[must_use]
    pub fn new(tree: &'a Tree, start: NodeId, options: TraversalOptions) -> Self {
        if tree.contains(start) {
            Self {
                tree,
                options,
                stack: vec![start],
                orphan: None,
            }
        } else {
            Self {
                tree,
                options,
                stack: Vec::new(),
                orphan: Some(start),
            }
        }
    }
}

impl Iterator for PreOrder<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if let Some(orphan) = self.orphan.take() {
            return Some(orphan);
        }
        let id = self.stack.pop()?;
        if let Some(node) = self.tree.node(id) {
            if self.options.descends_into(self.tree, id) {
                self.stack.extend(node.children().iter().rev());
            }
        }
        Some(id)
    }
}

/// Level-order traversal of the subtree rooted at the start node.
#[derive(Debug)]
pub struct BreadthFirst<'a> {
    tree: &'a Tree,
    options: TraversalOptions,
    queue: std::collections::VecDeque<NodeId>,
    orphan: Option<NodeId>,
}

impl<'a> BreadthFirst<'a> {
    /// Iterate the subtree under `start` level by level.
    #[must_use]
    pub fn new(tree: &'a Tree, start: NodeId, options: TraversalOptions) -> Self {
        if tree.contains(start) {
            Self {
                tree,
                options,
                queue: std::collections::VecDeque::from([start]),
                orphan: None,
            }
        } else {
            Self {
                tree,
                options,
                queue: std::collections::VecDeque::new(),
                orphan: Some(start),
            }
        }
    }
}

impl Iterator for BreadthFirst<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        if let Some(orphan) = self.orphan.take() {
            return Some(orphan);
        }
        let id = self.queue.pop_front()?;
        if let Some(node) = self.tree.node(id) {
            if self.options.descends_into(self.tree, id) {
                self.queue.extend(node.children().iter().copied());
            }
        }
        Some(id)
    }
}

/// The document-order successor of `id`, bounded by the tree root's subtree.
fn successor(tree: &Tree, options: TraversalOptions, id: NodeId) -> Option<NodeId> {
    let node = tree.node(id)?;
    if options.descends_into(tree, id) {
        if let Some(first) = node.children().first() {
            return Some(*first);
        }
    }
    // No descendants to visit: climb until a next sibling exists.
    let mut current = id;
    loop {
        if current == tree.root() {
            return None;
        }
        let parent = tree.node(current)?.parent()?;
        let siblings = tree.node(parent)?.children();
        let index = siblings.iter().position(|sibling| *sibling == current)?;
        if let Some(next) = siblings.get(index + 1) {
            return Some(*next);
        }
        current = parent;
    }
}

/// The document-order predecessor of `id`, bounded by the tree root.
fn predecessor(tree: &Tree, options: TraversalOptions, id: NodeId) -> Option<NodeId> {
    if id == tree.root() {
        return None;
    }
    let parent = tree.node(id)?.parent()?;
    let siblings = tree.node(parent)?.children();
    let index = siblings.iter().position(|sibling| *sibling == id)?;
    if index == 0 {
        return Some(parent);
    }
    // Deepest traversable descendant of the previous sibling.
    let mut current = siblings[index - 1];
    loop {
        let node = tree.node(current)?;
        if !options.descends_into(tree, current) {
            return Some(current);
        }
        match node.children().last() {
            Some(last) => current = *last,
            None => return Some(current),
        }
    }
}

/// Pre-order over the whole tree, fast-forwarded to the start node.
#[derive(Debug)]
pub struct TopToBottom<'a> {
    tree: &'a Tree,
    options: TraversalOptions,
    next: Option<NodeId>,
    in_tree: bool,
}

impl<'a> TopToBottom<'a> {
    /// Iterate from `start` through its document-order successors.
    #[must_use]
    pub fn new(tree: &'a Tree, start: NodeId, options: TraversalOptions) -> Self {
        Self {
            tree,
            options,
            next: Some(start),
            in_tree: tree.contains(start),
        }
    }
}

impl Iterator for TopToBottom<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next.take()?;
        if self.in_tree {
            self.next = successor(self.tree, self.options, current);
        }
        Some(current)
    }
}

/// The reverse of [`TopToBottom`]: the start node, then its document-order
/// predecessors up to and including the tree root.
#[derive(Debug)]
pub struct BottomToTop<'a> {
    tree: &'a Tree,
    options: TraversalOptions,
    next: Option<NodeId>,
    in_tree: bool,
}

impl<'a> BottomToTop<'a> {
    /// Iterate from `start` back toward the root.
    #[must_use]
    pub fn new(tree: &'a Tree, start: NodeId, options: TraversalOptions) -> Self {
        Self {
            tree,
            options,
            next: Some(start),
            in_tree: tree.contains(start),
        }
    }
}

impl Iterator for BottomToTop<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next.take()?;
        if self.in_tree {
            self.next = predecessor(self.tree, self.options, current);
        }
        Some(current)
    }
}

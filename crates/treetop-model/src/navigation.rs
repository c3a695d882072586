#![forbid(unsafe_code)]

//! Navigation history over root reassignments.
//!
//! A truncating timeline with a cursor: `push` drops the forward tail and
//! appends, `retreat`/`advance` move the cursor and return the entry it
//! lands on, `prev`/`next` peek without moving.

use treetop_core::node::NodeId;

/// Back/forward history of tree roots.
#[derive(Debug, Default)]
pub struct NavigationHistory {
    entries: Vec<NodeId>,
    cursor: Option<usize>,
}

impl NavigationHistory {
    /// An empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the history holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append an entry at the cursor, dropping any forward tail.
    pub fn push(&mut self, id: NodeId) {
        let keep = self.cursor.map_or(0, |cursor| cursor + 1);
        self.entries.truncate(keep);
        self.entries.push(id);
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Peek at the entry behind the cursor.
    #[must_use]
    pub fn prev(&self) -> Option<NodeId> {
        let cursor = self.cursor?;
        cursor.checked_sub(1).map(|index| self.entries[index])
    }

    /// Peek at the entry ahead of the cursor.
    #[must_use]
    pub fn next(&self) -> Option<NodeId> {
        let cursor = self.cursor?;
        self.entries.get(cursor + 1).copied()
    }

    /// Move the cursor back and return the entry it lands on.
    pub fn retreat(&mut self) -> Option<NodeId> {
        let target = self.prev()?;
        self.cursor = self.cursor.map(|cursor| cursor - 1);
        Some(target)
    }

    /// Move the cursor forward and return the entry it lands on.
    pub fn advance(&mut self) -> Option<NodeId> {
        let target = self.next()?;
        self.cursor = self.cursor.map(|cursor| cursor + 1);
        Some(target)
    }
}

//! Bounded undo/redo history of whole-scene snapshots.
//!
//! # Responsibility
//! - Keep deep copies of `{nodes, edges, birth}` at every commit point.
//! - Move a cursor backward and forward through them.
//!
//! # Invariants
//! - `index` is `None` only while the history is empty.
//! - Committing after an undo discards the redo tail.
//! - Past capacity the oldest snapshot is dropped and the cursor stays on the
//!   newest one, so after N > capacity commits `len == capacity` and
//!   `index == capacity - 1`.

use crate::model::document::BirthDetails;
use crate::model::edge::Edge;
use crate::model::node::Node;
use std::collections::VecDeque;

/// Immutable copy of the undoable scene state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryState {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub birth: BirthDetails,
}

#[derive(Debug, Clone)]
pub struct HistoryManager {
    entries: VecDeque<HistoryState>,
    index: Option<usize>,
    capacity: usize,
}

impl HistoryManager {
    /// History holding at most `capacity` snapshots (at least one).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            index: None,
            capacity,
        }
    }

    pub fn commit(&mut self, state: HistoryState) {
        let keep = self.index.map_or(0, |index| index + 1);
        self.entries.truncate(keep);
        self.entries.push_back(state);
        if self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.index = Some(self.entries.len() - 1);
    }

    /// Steps back and returns the snapshot to restore.
    pub fn undo(&mut self) -> Option<&HistoryState> {
        if !self.can_undo() {
            return None;
        }
        let target = self.index? - 1;
        self.index = Some(target);
        self.entries.get(target)
    }

    /// Steps forward and returns the snapshot to restore.
    pub fn redo(&mut self) -> Option<&HistoryState> {
        if !self.can_redo() {
            return None;
        }
        let target = self.index.map_or(0, |index| index + 1);
        self.index = Some(target);
        self.entries.get(target)
    }

    pub fn can_undo(&self) -> bool {
        self.index.is_some_and(|index| index > 0)
    }

    pub fn can_redo(&self) -> bool {
        match self.index {
            Some(index) => index + 1 < self.entries.len(),
            None => !self.entries.is_empty(),
        }
    }

    pub fn current(&self) -> Option<&HistoryState> {
        self.index.and_then(|index| self.entries.get(index))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index = None;
    }
}

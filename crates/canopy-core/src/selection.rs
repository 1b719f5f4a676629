//! Bounded, insertion-ordered membership of selected leaves.
//!
//! Insertion order is eviction order. With a capacity of one the set behaves
//! like a radio group; with capacity `N` it keeps the `N` most recent picks.
//! Whether a node is selected is answered by this set alone; nothing is
//! stored on the tree.

use std::collections::VecDeque;
use std::num::NonZeroUsize;

use canopy_config::OverflowPolicy;
use tracing::{debug, trace};

use crate::key::NodeKey;
use crate::tree::{NodeRef, Tree};

/// One selected leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionEntry {
    key: NodeKey,
    label: String,
    node: Option<NodeRef>,
}

impl SelectionEntry {
    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// The node in the current snapshot, or `None` for an orphaned selection.
    pub fn node(&self) -> Option<NodeRef> {
        self.node
    }

    /// Whether the id was missing from the latest snapshot.
    pub fn is_orphaned(&self) -> bool {
        self.node.is_none()
    }

    pub(crate) fn orphan(key: NodeKey) -> Self {
        Self {
            label: key.to_string(),
            key,
            node: None,
        }
    }

    pub(crate) fn bound(key: NodeKey, label: String, node: NodeRef) -> Self {
        Self {
            key,
            label,
            node: Some(node),
        }
    }

    pub(crate) fn rebind(&mut self, node: Option<NodeRef>, label: Option<&str>) {
        self.node = node;
        if let Some(label) = label {
            self.label = label.to_string();
        }
    }
}

/// What a selection mutation did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionChange {
    /// Newly selected key.
    pub added: Option<NodeKey>,
    /// Keys deselected or evicted, oldest first.
    pub removed: Vec<NodeKey>,
}

impl SelectionChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_none() && self.removed.is_empty()
    }

    fn merge(mut self, other: SelectionChange) -> Self {
        if other.added.is_some() {
            self.added = other.added;
        }
        self.removed.extend(other.removed);
        self
    }
}

/// Bounded FIFO set of selected leaves.
#[derive(Debug, Clone)]
pub struct SelectionSet {
    entries: VecDeque<SelectionEntry>,
    capacity: Option<NonZeroUsize>,
    overflow: OverflowPolicy,
}

impl Default for SelectionSet {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl SelectionSet {
    /// Create a set with the given capacity (`None` = unbounded) and overflow policy.
    pub fn new(capacity: Option<NonZeroUsize>, overflow: OverflowPolicy) -> Self {
        Self {
            entries: VecDeque::new(),
            capacity,
            overflow,
        }
    }

    pub fn unbounded() -> Self {
        Self::new(None, OverflowPolicy::EvictOldest)
    }

    /// A FIFO set holding at most `capacity` leaves.
    pub fn bounded(capacity: NonZeroUsize) -> Self {
        Self::new(Some(capacity), OverflowPolicy::EvictOldest)
    }

    pub fn capacity(&self) -> Option<NonZeroUsize> {
        self.capacity
    }

    pub fn overflow(&self) -> OverflowPolicy {
        self.overflow
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &SelectionEntry> {
        self.entries.iter()
    }

    /// Keys, oldest first.
    pub fn keys(&self) -> impl Iterator<Item = &NodeKey> {
        self.entries.iter().map(SelectionEntry::key)
    }

    /// Nodes of non-orphaned entries.
    pub fn nodes(&self) -> impl Iterator<Item = NodeRef> + '_ {
        self.entries.iter().filter_map(SelectionEntry::node)
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.entries.iter().any(|e| &e.key == key)
    }

    pub fn get(&self, key: &NodeKey) -> Option<&SelectionEntry> {
        self.entries.iter().find(|e| &e.key == key)
    }

    /// Select a leaf, evicting per the overflow policy if the capacity is exceeded.
    ///
    /// Categories, unknown handles and already-selected leaves are ignored.
    pub fn select(&mut self, tree: &Tree, node: NodeRef) -> SelectionChange {
        let Some(n) = tree.node(node) else {
            trace!(?node, "select ignored: handle not in snapshot");
            return SelectionChange::default();
        };
        if !n.is_leaf() || self.contains(n.key()) {
            return SelectionChange::default();
        }

        let key = n.key().clone();
        self.entries
            .push_back(SelectionEntry::bound(key.clone(), n.label().to_string(), node));
        let evicted = self.enforce_capacity();
        debug!(key = %key, evicted = evicted.len(), size = self.len(), "Selected leaf");
        SelectionChange {
            added: Some(key),
            removed: evicted.into_iter().map(|e| e.key).collect(),
        }
    }

    /// Remove `key` if present.
    pub fn deselect(&mut self, key: &NodeKey) -> SelectionChange {
        match self.entries.iter().position(|e| &e.key == key) {
            Some(pos) => {
                self.entries.remove(pos);
                debug!(key = %key, size = self.len(), "Deselected leaf");
                SelectionChange {
                    added: None,
                    removed: vec![key.clone()],
                }
            }
            None => SelectionChange::default(),
        }
    }

    /// Deselect the leaf if selected, otherwise select it.
    pub fn toggle(&mut self, tree: &Tree, node: NodeRef) -> SelectionChange {
        let Some(n) = tree.node(node) else {
            return SelectionChange::default();
        };
        if self.contains(n.key()) {
            let key = n.key().clone();
            self.deselect(&key)
        } else {
            self.select(tree, node)
        }
    }

    /// Make `node` the only member.
    pub fn replace(&mut self, tree: &Tree, node: NodeRef) -> SelectionChange {
        let Some(n) = tree.node(node) else {
            return SelectionChange::default();
        };
        if !n.is_leaf() {
            return SelectionChange::default();
        }
        let keep = n.key().clone();
        let others: Vec<NodeKey> = self.keys().filter(|k| **k != keep).cloned().collect();
        let cleared = others
            .iter()
            .fold(SelectionChange::default(), |acc, k| acc.merge(self.deselect(k)));
        cleared.merge(self.select(tree, node))
    }

    /// Remove every member.
    pub fn clear(&mut self) -> SelectionChange {
        SelectionChange {
            added: None,
            removed: self.entries.drain(..).map(|e| e.key).collect(),
        }
    }

    /// Apply the overflow policy until the set fits its capacity.
    ///
    /// Returns the removed entries, oldest first.
    pub fn enforce_capacity(&mut self) -> Vec<SelectionEntry> {
        let Some(capacity) = self.capacity else {
            return Vec::new();
        };
        let excess = self.entries.len().saturating_sub(capacity.get());
        if excess == 0 {
            return Vec::new();
        }
        let removed = match self.overflow {
            OverflowPolicy::EvictOldest => excess,
            OverflowPolicy::ReplaceAll => self.entries.len() - 1,
        };
        self.entries.drain(..removed).collect()
    }

    /// Record a prior selection whose nodes are not yet known.
    pub(crate) fn seed(&mut self, key: NodeKey) {
        if !self.contains(&key) {
            self.entries.push_back(SelectionEntry::orphan(key));
        }
    }

    /// Insert as the oldest member.
    pub(crate) fn adopt(&mut self, entry: SelectionEntry) {
        if !self.contains(&entry.key) {
            self.entries.push_front(entry);
        }
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut SelectionEntry> {
        self.entries.iter_mut()
    }
}

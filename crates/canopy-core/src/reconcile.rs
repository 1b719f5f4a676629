//! Carrying selection state across a snapshot replacement.
//!
//! Fresh snapshots arrive as new objects. Selection entries are re-bound to
//! the new nodes by id through the snapshot's index, leaves the host flagged
//! as selected are adopted, and every ancestor chain leading to a selection
//! is forced open so the selection is visible straight after the swap.
//! The clopen map is not consulted or written here.

use tracing::{debug, warn};

use crate::key::NodeKey;
use crate::selection::{SelectionEntry, SelectionSet};
use crate::tree::{NodeRef, Tree};

/// Summary of one reconciliation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    /// Entries re-bound to a node of the new snapshot.
    pub rebound: usize,
    /// Entries whose id no longer names a leaf; kept as orphans.
    pub orphaned: Vec<NodeKey>,
    /// Leaves flagged selected by the host that joined the set.
    pub adopted: Vec<NodeKey>,
    /// Entries dropped to restore the capacity bound.
    pub evicted: Vec<NodeKey>,
    /// Categories forced open.
    pub revealed: usize,
}

/// Re-attach `selection` to `tree` and make every selected leaf visible.
pub fn reconcile(tree: &mut Tree, selection: &mut SelectionSet) -> Reconciliation {
    let mut outcome = Reconciliation::default();

    for entry in selection.entries_mut() {
        let found = tree
            .find(entry.key())
            .and_then(|r| tree.node(r).filter(|n| n.is_leaf()).map(|n| (r, n)));
        match found {
            Some((r, node)) => {
                entry.rebind(Some(r), Some(node.label()));
                outcome.rebound += 1;
            }
            None => {
                warn!(key = %entry.key(), "Selected leaf missing from new snapshot, keeping orphaned entry");
                entry.rebind(None, None);
                outcome.orphaned.push(entry.key().clone());
            }
        }
    }

    let flagged: Vec<SelectionEntry> = tree
        .walk()
        .filter_map(|r| {
            let node = tree.node(r)?;
            node.is_flagged_selected().then(|| {
                SelectionEntry::bound(node.key().clone(), node.label().to_string(), r)
            })
        })
        .collect();
    // Adopted leaves count as older than the carried selection, first in
    // depth-first order being oldest.
    for entry in flagged.into_iter().rev() {
        if !selection.contains(entry.key()) {
            outcome.adopted.push(entry.key().clone());
            selection.adopt(entry);
        }
    }
    outcome.adopted.reverse();

    outcome.evicted = selection
        .enforce_capacity()
        .into_iter()
        .map(|e| e.key().clone())
        .collect();

    outcome.revealed = reveal(tree, selection);

    debug!(
        rebound = outcome.rebound,
        orphaned = outcome.orphaned.len(),
        adopted = outcome.adopted.len(),
        evicted = outcome.evicted.len(),
        revealed = outcome.revealed,
        "Reconciled selection with snapshot"
    );
    outcome
}

/// Force open every closed ancestor of a selected leaf, pruning each one
/// opened so only the paths to selections show.
///
/// Already-open ancestors keep their children as they are, but the walk
/// continues below them. Returns the number of categories opened.
pub fn reveal(tree: &mut Tree, selection: &SelectionSet) -> usize {
    let paths = tree.paths_to(selection.nodes());
    let mut revealed = 0;
    for leaf in selection.nodes() {
        let mut chain: Vec<NodeRef> = tree.ancestors(leaf).collect();
        chain.reverse();
        for ancestor in chain {
            let Some(node) = tree.node_mut(ancestor) else {
                continue;
            };
            if node.expanded {
                continue;
            }
            node.expanded = true;
            revealed += 1;
            if !node.is_pruned() {
                tree.partition(ancestor, &paths);
            }
        }
    }
    revealed
}

//! Presentation projection.
//!
//! Selection markers and flags are never stored on tree nodes; they are
//! computed here from the tree structure and the selection set each time the
//! host asks for a view.

use serde::Serialize;

use crate::key::NodeKey;
use crate::selection::{SelectionEntry, SelectionSet};
use crate::tree::{NodeKind, NodeRef, Tree};

/// Visual marker attached to a rendered node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Marker {
    /// The node is a selected leaf.
    Tick,
}

/// Rendered form of one attached node.
///
/// Projections are flat and in pre-order: a node's children follow it and
/// name it as their `parent`, so reports stay shallow however deep the tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: NodeKey,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeKey>,
    pub depth: usize,
    pub label: String,
    pub kind: NodeKind,
    pub has_caret: bool,
    pub is_expanded: bool,
    pub is_selected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marker: Option<Marker>,
    /// Children currently detached by pruning, in their original order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub pruned: Vec<NodeKey>,
}

/// Reported form of a selection entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectedView {
    pub id: NodeKey,
    pub label: String,
    pub orphaned: bool,
}

impl From<&SelectionEntry> for SelectedView {
    fn from(entry: &SelectionEntry) -> Self {
        Self {
            id: entry.key().clone(),
            label: entry.label().to_string(),
            orphaned: entry.is_orphaned(),
        }
    }
}

/// One displayed row of the flattened tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleRow {
    #[serde(skip)]
    pub node: NodeRef,
    pub id: NodeKey,
    pub label: String,
    pub depth: usize,
    pub has_caret: bool,
    pub is_expanded: bool,
    pub is_selected: bool,
}

/// Project the whole forest in pre-order, following attached children only.
pub fn project(tree: &Tree, selection: &SelectionSet) -> Vec<NodeView> {
    let mut out = Vec::with_capacity(tree.len());
    let mut stack: Vec<(NodeRef, Option<&NodeKey>, usize)> =
        tree.roots().iter().rev().map(|r| (*r, None, 0)).collect();

    while let Some((r, parent, depth)) = stack.pop() {
        let Some(node) = tree.node(r) else {
            continue;
        };
        let is_selected = node.is_leaf() && selection.contains(node.key());
        let pruned = node
            .pruned_children()
            .unwrap_or_default()
            .iter()
            .filter_map(|h| tree.node(*h))
            .map(|h| h.key().clone())
            .collect();
        out.push(NodeView {
            id: node.key().clone(),
            parent: parent.cloned(),
            depth,
            label: node.label().to_string(),
            kind: node.kind(),
            has_caret: node.is_category(),
            is_expanded: node.is_expanded(),
            is_selected,
            marker: is_selected.then_some(Marker::Tick),
            pruned,
        });
        stack.extend(
            node.children()
                .iter()
                .rev()
                .map(|c| (*c, Some(node.key()), depth + 1)),
        );
    }
    out
}

/// Rows a renderer would draw: depth-first, descending only into open
/// categories.
pub fn visible_rows(tree: &Tree, selection: &SelectionSet) -> Vec<VisibleRow> {
    rows(tree, selection, false)
}

/// Every attached row regardless of expansion.
pub fn all_rows(tree: &Tree, selection: &SelectionSet) -> Vec<VisibleRow> {
    rows(tree, selection, true)
}

fn rows(tree: &Tree, selection: &SelectionSet, include_closed: bool) -> Vec<VisibleRow> {
    let mut out = Vec::new();
    let mut stack: Vec<(NodeRef, usize)> = tree.roots().iter().rev().map(|r| (*r, 0)).collect();

    while let Some((r, depth)) = stack.pop() {
        let Some(node) = tree.node(r) else {
            continue;
        };
        out.push(VisibleRow {
            node: r,
            id: node.key().clone(),
            label: node.label().to_string(),
            depth,
            has_caret: node.is_category(),
            is_expanded: node.is_expanded(),
            is_selected: node.is_leaf() && selection.contains(node.key()),
        });
        if include_closed || node.is_expanded() {
            stack.extend(node.children().iter().rev().map(|c| (*c, depth + 1)));
        }
    }
    out
}

//! Arena-backed snapshot of the host's category/field forest.
//!
//! The host hands over a forest of [`TreeNode`] records. [`Tree::from_nodes`]
//! flattens it into an arena addressed by [`NodeRef`] handles and builds an
//! id index once, so later lookups by [`NodeKey`] are constant time.
//! All traversals use explicit stacks; deep hierarchies cannot overflow the
//! call stack.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::key::NodeKey;

/// Whether a node groups other nodes or is a selectable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Has children; can only be expanded or collapsed.
    Category,
    /// A leaf; the only selectable unit.
    Field,
}

/// A node record as supplied by the host.
///
/// `kind` may be omitted, in which case nodes with children are categories
/// and nodes without are fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    pub id: NodeKey,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<NodeKind>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreeNode>,
    #[serde(default)]
    pub is_expanded: bool,
    #[serde(default)]
    pub is_selected: bool,
}

impl TreeNode {
    /// A category with the given children.
    pub fn category(
        id: impl Into<NodeKey>,
        label: impl Into<String>,
        children: Vec<TreeNode>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: Some(NodeKind::Category),
            children,
            is_expanded: false,
            is_selected: false,
        }
    }

    /// A selectable field.
    pub fn leaf(id: impl Into<NodeKey>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            kind: Some(NodeKind::Field),
            children: Vec::new(),
            is_expanded: false,
            is_selected: false,
        }
    }

    /// Mark this record as initially expanded.
    pub fn expanded(mut self) -> Self {
        self.is_expanded = true;
        self
    }

    /// Mark this record as initially selected.
    pub fn selected(mut self) -> Self {
        self.is_selected = true;
        self
    }

    /// The declared kind, or the one implied by the presence of children.
    pub fn resolved_kind(&self) -> NodeKind {
        self.kind.unwrap_or(if self.children.is_empty() {
            NodeKind::Field
        } else {
            NodeKind::Category
        })
    }
}

/// Errors raised while turning host records into a [`Tree`].
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("field node {0} declares children")]
    LeafWithChildren(NodeKey),
}

/// Handle to a node inside one particular [`Tree`] snapshot.
///
/// Handles from a replaced snapshot never resolve against the new one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef {
    snapshot: u64,
    slot: usize,
}

fn next_snapshot_id() -> u64 {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// One node of a snapshot.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) key: NodeKey,
    pub(crate) label: String,
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeRef>,
    pub(crate) children: Vec<NodeRef>,
    pub(crate) pruned: Option<Vec<NodeRef>>,
    pub(crate) expanded: bool,
    pub(crate) flagged_selected: bool,
}

impl Node {
    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn is_leaf(&self) -> bool {
        self.kind == NodeKind::Field
    }

    pub fn is_category(&self) -> bool {
        self.kind == NodeKind::Category
    }

    pub fn parent(&self) -> Option<NodeRef> {
        self.parent
    }

    /// Children currently attached (the displayed partition).
    pub fn children(&self) -> &[NodeRef] {
        &self.children
    }

    /// Children detached by pruning, if the node is in pruned display mode.
    pub fn pruned_children(&self) -> Option<&[NodeRef]> {
        self.pruned.as_deref()
    }

    pub fn is_pruned(&self) -> bool {
        self.pruned.is_some()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Whether the host record arrived with `isSelected` set.
    pub fn is_flagged_selected(&self) -> bool {
        self.flagged_selected
    }
}

/// An immutable-by-host, engine-mutated snapshot of the forest.
#[derive(Debug)]
pub struct Tree {
    snapshot: u64,
    nodes: Vec<Node>,
    roots: Vec<NodeRef>,
    index: HashMap<NodeKey, NodeRef>,
}

impl Default for Tree {
    fn default() -> Self {
        Self::empty()
    }
}

impl Tree {
    /// A snapshot with no nodes.
    pub fn empty() -> Self {
        Self {
            snapshot: next_snapshot_id(),
            nodes: Vec::new(),
            roots: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Flatten a host forest into a snapshot.
    ///
    /// Node order is preserved. When ids repeat, the index keeps the first
    /// node in depth-first order; duplicate ids are a host precondition
    /// violation and are not otherwise detected.
    pub fn from_nodes(forest: Vec<TreeNode>) -> Result<Self, TreeError> {
        let mut tree = Self::empty();
        let mut stack: Vec<(TreeNode, Option<NodeRef>)> =
            forest.into_iter().rev().map(|n| (n, None)).collect();

        while let Some((record, parent)) = stack.pop() {
            let kind = record.resolved_kind();
            if kind == NodeKind::Field && !record.children.is_empty() {
                return Err(TreeError::LeafWithChildren(record.id));
            }

            let this = NodeRef {
                snapshot: tree.snapshot,
                slot: tree.nodes.len(),
            };
            tree.index.entry(record.id.clone()).or_insert(this);
            match parent {
                Some(p) => tree.nodes[p.slot].children.push(this),
                None => tree.roots.push(this),
            }

            let TreeNode {
                id,
                label,
                children,
                is_expanded,
                is_selected,
                ..
            } = record;
            tree.nodes.push(Node {
                key: id,
                label,
                kind,
                parent,
                children: Vec::with_capacity(children.len()),
                pruned: None,
                expanded: kind == NodeKind::Category && is_expanded,
                flagged_selected: kind == NodeKind::Field && is_selected,
            });
            stack.extend(children.into_iter().rev().map(|c| (c, Some(this))));
        }

        Ok(tree)
    }

    /// Top-level nodes in host order.
    pub fn roots(&self) -> &[NodeRef] {
        &self.roots
    }

    /// Total number of nodes, attached or pruned.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Resolve a handle. Handles from other snapshots resolve to `None`.
    pub fn node(&self, r: NodeRef) -> Option<&Node> {
        if r.snapshot != self.snapshot {
            return None;
        }
        self.nodes.get(r.slot)
    }

    pub(crate) fn node_mut(&mut self, r: NodeRef) -> Option<&mut Node> {
        if r.snapshot != self.snapshot {
            return None;
        }
        self.nodes.get_mut(r.slot)
    }

    /// Look up a node by id.
    pub fn find(&self, key: &NodeKey) -> Option<NodeRef> {
        self.index.get(key).copied()
    }

    /// Parents of `r`, nearest first. Empty for roots and foreign handles.
    pub fn ancestors(&self, r: NodeRef) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.node(r).and_then(Node::parent),
        }
    }

    /// Every node, depth-first, including pruned children.
    pub fn walk(&self) -> Walk<'_> {
        Walk {
            tree: self,
            stack: self.roots.iter().rev().copied().collect(),
        }
    }

    /// `r` and everything structurally below it, depth-first.
    pub fn descendants(&self, r: NodeRef) -> Walk<'_> {
        let stack = if self.node(r).is_some() {
            vec![r]
        } else {
            Vec::new()
        };
        Walk { tree: self, stack }
    }

    /// The targets together with all of their ancestors.
    ///
    /// A node is in the returned set exactly when its subtree contains one of
    /// the targets, which answers "has a selected descendant" for every node
    /// at once in O(targets × depth).
    pub fn paths_to(&self, targets: impl IntoIterator<Item = NodeRef>) -> HashSet<NodeRef> {
        let mut paths = HashSet::new();
        for target in targets {
            if self.node(target).is_none() || !paths.insert(target) {
                continue;
            }
            for ancestor in self.ancestors(target) {
                if !paths.insert(ancestor) {
                    break;
                }
            }
        }
        paths
    }

    /// Sort attached children ascending by label. Stable on equal labels.
    pub(crate) fn sort_children(&mut self, r: NodeRef) {
        let Some(node) = self.node_mut(r) else {
            return;
        };
        let mut children = std::mem::take(&mut node.children);
        children.sort_by(|a, b| self.nodes[a.slot].label.cmp(&self.nodes[b.slot].label));
        self.nodes[r.slot].children = children;
    }

    /// Split the attached children of `r` into those in `keep` and the rest.
    ///
    /// The rest move to the pruned partition; the kept ones are sorted and
    /// returned.
    pub(crate) fn partition(&mut self, r: NodeRef, keep: &HashSet<NodeRef>) -> Vec<NodeRef> {
        let Some(node) = self.node_mut(r) else {
            return Vec::new();
        };
        let (kept, hidden): (Vec<NodeRef>, Vec<NodeRef>) = std::mem::take(&mut node.children)
            .into_iter()
            .partition(|c| keep.contains(c));
        node.children = kept;
        node.pruned = Some(hidden);
        self.sort_children(r);
        self.nodes[r.slot].children.clone()
    }

    /// Reattach pruned children of `r` and re-sort. Returns `false` when `r`
    /// was not pruned.
    pub(crate) fn restore(&mut self, r: NodeRef) -> bool {
        let Some(node) = self.node_mut(r) else {
            return false;
        };
        let Some(hidden) = node.pruned.take() else {
            return false;
        };
        node.children.extend(hidden);
        self.sort_children(r);
        true
    }
}

/// Iterator over the parent chain of a node.
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeRef>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        let current = self.next?;
        self.next = self.tree.node(current).and_then(Node::parent);
        Some(current)
    }
}

/// Depth-first pre-order traversal with an explicit stack.
///
/// Attached children are visited before pruned ones.
pub struct Walk<'a> {
    tree: &'a Tree,
    stack: Vec<NodeRef>,
}

impl Iterator for Walk<'_> {
    type Item = NodeRef;

    fn next(&mut self) -> Option<NodeRef> {
        let current = self.stack.pop()?;
        if let Some(node) = self.tree.node(current) {
            if let Some(hidden) = &node.pruned {
                self.stack.extend(hidden.iter().rev());
            }
            self.stack.extend(node.children.iter().rev());
        }
        Some(current)
    }
}

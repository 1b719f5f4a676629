//! Expansion/pruning controller.
//!
//! A category is `collapsed`, `expanded`, or `pruned`. Pruned is the state a
//! collapse request produces when the category still holds a selected leaf:
//! children without a selected descendant are detached into the pruned
//! partition, so the path to every selection stays on screen. Collapsing a
//! pruned category again restores the detached children.

use std::collections::HashSet;

use tracing::debug;

use crate::clopen::ClopenMap;
use crate::selection::SelectionSet;
use crate::tree::{Node, NodeRef, Tree};

/// What an expand/collapse request did to a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The category was opened and its children sorted.
    Expanded,
    /// Pruned children were reattached; the category stays open.
    Restored,
    /// The category was closed.
    Collapsed,
    /// Children without a selected descendant were detached.
    Pruned { hidden: usize },
    /// Not a category in this snapshot.
    Ignored,
}

/// Open `node`, sort its children by label and persist `true`.
pub fn expand(tree: &mut Tree, node: NodeRef, clopen: Option<&ClopenMap>) -> Transition {
    let Some(n) = tree.node_mut(node) else {
        return Transition::Ignored;
    };
    if !n.is_category() {
        return Transition::Ignored;
    }
    n.expanded = true;
    let key = n.key.clone();
    tree.sort_children(node);
    if let Some(clopen) = clopen {
        clopen.set(&key, true);
    }
    debug!(key = %key, "Expanded category");
    Transition::Expanded
}

/// Collapse `node`, pruning instead when its subtree holds a selected leaf.
///
/// A collapse never closes a category that contains a selection.
pub fn collapse(
    tree: &mut Tree,
    node: NodeRef,
    selection: &SelectionSet,
    clopen: Option<&ClopenMap>,
) -> Transition {
    let Some(n) = tree.node(node) else {
        return Transition::Ignored;
    };
    if !n.is_category() {
        return Transition::Ignored;
    }
    let key = n.key.clone();

    if tree.restore(node) {
        debug!(key = %key, "Restored pruned children");
        return Transition::Restored;
    }

    let paths = tree.paths_to(selection.nodes());
    if !paths.contains(&node) {
        if let Some(n) = tree.node_mut(node) {
            n.expanded = false;
        }
        if let Some(clopen) = clopen {
            clopen.set(&key, false);
        }
        debug!(key = %key, "Collapsed category");
        return Transition::Collapsed;
    }

    let hidden = prune(tree, node, &paths);
    debug!(key = %key, hidden, "Pruned category around selection");
    Transition::Pruned { hidden }
}

/// Collapse if open, expand otherwise.
pub fn toggle(
    tree: &mut Tree,
    node: NodeRef,
    selection: &SelectionSet,
    clopen: Option<&ClopenMap>,
) -> Transition {
    match tree.node(node).map(Node::is_expanded) {
        Some(true) => collapse(tree, node, selection, clopen),
        Some(false) => expand(tree, node, clopen),
        None => Transition::Ignored,
    }
}

/// Partition `node` around `paths`, then every kept category below it that
/// is not already pruned. Returns the number of detached children.
fn prune(tree: &mut Tree, node: NodeRef, paths: &HashSet<NodeRef>) -> usize {
    let mut hidden = 0;
    let mut stack = vec![node];
    while let Some(current) = stack.pop() {
        let kept = tree.partition(current, paths);
        hidden += tree
            .node(current)
            .and_then(Node::pruned_children)
            .map_or(0, <[NodeRef]>::len);
        stack.extend(kept.into_iter().filter(|child| {
            tree.node(*child)
                .is_some_and(|c| c.is_category() && !c.is_pruned())
        }));
    }
    hidden
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use super::*;
    use crate::key::NodeKey;
    use crate::tree::TreeNode;

    /// X holds three siblings; Y nests a further category.
    fn forest() -> Tree {
        Tree::from_nodes(vec![
            TreeNode::category(
                "x",
                "X",
                vec![
                    TreeNode::leaf("x3", "Zinc"),
                    TreeNode::leaf("x1", "Iron"),
                    TreeNode::leaf("x2", "Lead"),
                ],
            )
            .expanded(),
            TreeNode::category(
                "y",
                "Y",
                vec![
                    TreeNode::leaf("y1", "Alpha"),
                    TreeNode::category(
                        "z",
                        "Z",
                        vec![TreeNode::leaf("z1", "Deep"), TreeNode::leaf("z2", "Shallow")],
                    )
                    .expanded(),
                ],
            )
            .expanded(),
        ])
        .unwrap()
    }

    fn at(tree: &Tree, key: &str) -> NodeRef {
        tree.find(&NodeKey::from(key)).unwrap()
    }

    fn child_labels(tree: &Tree, key: &str) -> Vec<String> {
        let node = tree.node(at(tree, key)).unwrap();
        node.children()
            .iter()
            .map(|c| tree.node(*c).unwrap().label().to_string())
            .collect()
    }

    #[test]
    fn test_expand_sorts_and_persists() {
        let mut tree = forest();
        let clopen = ClopenMap::new();
        let x = at(&tree, "x");
        assert_eq!(expand(&mut tree, x, Some(&clopen)), Transition::Expanded);
        assert_eq!(child_labels(&tree, "x"), vec!["Iron", "Lead", "Zinc"]);
        assert_eq!(clopen.get(&NodeKey::from("x")), Some(true));
    }

    #[test]
    fn test_collapse_without_selection_closes() {
        let mut tree = forest();
        let clopen = ClopenMap::new();
        let x = at(&tree, "x");
        let outcome = collapse(&mut tree, x, &SelectionSet::unbounded(), Some(&clopen));
        assert_eq!(outcome, Transition::Collapsed);
        assert!(!tree.node(x).unwrap().is_expanded());
        assert_eq!(clopen.get(&NodeKey::from("x")), Some(false));
    }

    #[test]
    fn test_collapse_with_selection_prunes_then_restores() {
        let mut tree = forest();
        let clopen = ClopenMap::new();
        let mut selection = SelectionSet::unbounded();
        selection.select(&tree, at(&tree, "x2"));
        let x = at(&tree, "x");

        let outcome = collapse(&mut tree, x, &selection, Some(&clopen));
        assert_eq!(outcome, Transition::Pruned { hidden: 2 });
        assert!(tree.node(x).unwrap().is_expanded());
        assert_eq!(child_labels(&tree, "x"), vec!["Lead"]);
        assert!(clopen.is_empty());

        let outcome = collapse(&mut tree, x, &selection, Some(&clopen));
        assert_eq!(outcome, Transition::Restored);
        assert!(!tree.node(x).unwrap().is_pruned());
        assert_eq!(child_labels(&tree, "x"), vec!["Iron", "Lead", "Zinc"]);
        assert!(clopen.is_empty());
    }

    #[test]
    fn test_prune_recurses_into_kept_categories() {
        let mut tree = forest();
        let mut selection = SelectionSet::unbounded();
        selection.select(&tree, at(&tree, "z1"));
        let y = at(&tree, "y");

        let outcome = collapse(&mut tree, y, &selection, None);
        assert_eq!(outcome, Transition::Pruned { hidden: 2 });
        assert_eq!(child_labels(&tree, "y"), vec!["Z"]);
        assert_eq!(child_labels(&tree, "z"), vec!["Deep"]);
        assert!(tree.node(at(&tree, "z")).unwrap().is_pruned());
    }

    #[test]
    fn test_already_pruned_child_is_not_pruned_again() {
        let mut tree = forest();
        let mut selection = SelectionSet::unbounded();
        selection.select(&tree, at(&tree, "z1"));
        let z = at(&tree, "z");
        collapse(&mut tree, z, &selection, None);

        // z is already pruned; collapsing y must leave its partition alone.
        let y = at(&tree, "y");
        let outcome = collapse(&mut tree, y, &selection, None);
        assert_eq!(outcome, Transition::Pruned { hidden: 1 });
        assert_eq!(
            tree.node(z).unwrap().pruned_children().map(<[NodeRef]>::len),
            Some(1)
        );
    }

    #[test]
    fn test_toggle_and_leaf_requests() {
        let mut tree = forest();
        let selection = SelectionSet::bounded(NonZeroUsize::MIN);
        let x = at(&tree, "x");
        assert_eq!(toggle(&mut tree, x, &selection, None), Transition::Collapsed);
        assert_eq!(toggle(&mut tree, x, &selection, None), Transition::Expanded);

        let leaf = at(&tree, "x1");
        assert_eq!(expand(&mut tree, leaf, None), Transition::Ignored);
        assert_eq!(collapse(&mut tree, leaf, &selection, None), Transition::Ignored);
    }
}

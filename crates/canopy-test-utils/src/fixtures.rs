//! Tree fixtures.
//!
//! Small forests shared by the scenario and property tests, plus shortcuts
//! for turning them into snapshots and looking nodes up by id.

use canopy_core::{Engine, NodeKey, NodeRef, Tree, TreeNode};

/// A category with the given children.
pub fn category(id: &str, label: &str, children: Vec<TreeNode>) -> TreeNode {
    TreeNode::category(id, label, children)
}

/// A selectable field.
pub fn leaf(id: &str, label: &str) -> TreeNode {
    TreeNode::leaf(id, label)
}

/// Index a forest, panicking on malformed input.
pub fn snapshot(forest: Vec<TreeNode>) -> Tree {
    Tree::from_nodes(forest).expect("fixture forest is well formed")
}

/// Resolve `key` in the engine's current snapshot.
pub fn node(engine: &Engine, key: &str) -> NodeRef {
    engine
        .find(&NodeKey::from(key))
        .unwrap_or_else(|| panic!("node {key} not in snapshot"))
}

/// Keys of the selection, oldest first.
pub fn selected_keys(engine: &Engine) -> Vec<String> {
    engine.selection().keys().map(ToString::to_string).collect()
}

/// Labels of the attached children of `key`, in display order.
pub fn child_labels(engine: &Engine, key: &str) -> Vec<String> {
    let tree = engine.tree();
    tree.node(node(engine, key))
        .map(|n| {
            n.children()
                .iter()
                .filter_map(|c| tree.node(*c))
                .map(|c| c.label().to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// Canned forests.
pub struct TreeFixture;

impl TreeFixture {
    /// Three leaves `a`, `b`, `c` under an expanded category `abc`.
    pub fn abc() -> Vec<TreeNode> {
        vec![
            category(
                "abc",
                "Letters",
                vec![leaf("a", "A"), leaf("b", "B"), leaf("c", "C")],
            )
            .expanded(),
        ]
    }

    /// Category `x` holding three unsorted leaves and a sibling category `y`.
    pub fn siblings() -> Vec<TreeNode> {
        vec![
            category(
                "x",
                "X",
                vec![
                    leaf("x3", "Zinc"),
                    leaf("x1", "Iron"),
                    leaf("x2", "Lead"),
                ],
            )
            .expanded(),
            category("y", "Y", vec![leaf("y1", "Copper")]),
        ]
    }

    /// An assessment tree whose field `42` sits two categories deep.
    ///
    /// With `with_42 = false` the field is absent, as after a search that
    /// filtered it out.
    pub fn assessment(with_42: bool) -> Vec<TreeNode> {
        let mut vitals = vec![leaf("41", "Pulse rate"), leaf("43", "Temperature")];
        if with_42 {
            vitals.push(leaf("42", "Blood pressure"));
        }
        vec![
            category(
                "1",
                "Assessment",
                vec![
                    category("4", "Vitals", vitals),
                    leaf("5", "Date of visit"),
                ],
            ),
            category("2", "Genomics", vec![leaf("21", "Genotyping array")]),
        ]
    }

    /// `categories` top-level categories with `leaves` fields each.
    ///
    /// Category ids are `c{i}`, field ids `c{i}.{j}`.
    pub fn grid(categories: usize, leaves: usize) -> Vec<TreeNode> {
        (0..categories)
            .map(|i| {
                let fields = (0..leaves)
                    .map(|j| leaf(&format!("c{i}.{j}"), &format!("Field {i}.{j}")))
                    .collect();
                category(&format!("c{i}"), &format!("Category {i}"), fields)
            })
            .collect()
    }
}

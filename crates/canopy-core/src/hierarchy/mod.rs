//! Hierarchy snapshot builder.
//!
//! Hosts usually keep their category/field catalogue as a flat listing where
//! each row addresses its place with a dotted path such as `"1.3.0.0"`.
//! `"0"` segments are padding. The remaining segments walk down from a
//! synthetic root, so `"1.3"` is the third child slot of the first top-level
//! slot.
//!
//! Every row gets a numeric id from its position in the listing (row `n` has
//! id `n`, the synthetic root is `0`). Ids do not depend on the search filter,
//! which is what lets the engine reconcile a selection across a filtered
//! rebuild.

mod search;

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, trace};

use crate::clopen::ClopenMap;
use crate::key::NodeKey;
use crate::tree::{NodeKind, Tree, TreeError, TreeNode};

pub use search::{PLACEHOLDER, SearchFilter, search_word};

/// Errors raised while reading or building a hierarchy listing.
#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    #[error("failed to parse hierarchy listing: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row {row}: node path has no segments")]
    EmptyPath { row: usize },

    #[error("row {row}: parent of {path} is not in the listing")]
    MissingParent { row: usize, path: String },

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// The role a row plays in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowType {
    Root,
    Sub,
    Leaf,
}

impl RowType {
    fn kind(self) -> NodeKind {
        match self {
            Self::Root | Self::Sub => NodeKind::Category,
            Self::Leaf => NodeKind::Field,
        }
    }
}

/// One row of a hierarchy listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HierarchyRow {
    #[serde(alias = "NodeID")]
    pub node_id: String,
    #[serde(alias = "NodeType")]
    pub node_type: RowType,
    #[serde(alias = "NodeName")]
    pub node_name: String,
    #[serde(
        default,
        alias = "FieldID",
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub field_id: Option<String>,
    #[serde(
        default,
        alias = "InstanceID",
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub instance_id: Option<String>,
}

fn text_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<NodeKey>::deserialize(deserializer)?.map(|k| k.to_string()))
}

/// A flat hierarchy listing.
#[derive(Debug, Clone, Default)]
pub struct Hierarchy {
    rows: Vec<HierarchyRow>,
}

const ROOT: usize = 0;

struct Slot {
    id: u64,
    label: String,
    kind: NodeKind,
    /// A field rejected by the search filter. It still occupies its path.
    hidden: bool,
    children: Vec<usize>,
    by_segment: HashMap<String, usize>,
}

impl Slot {
    fn new(id: u64, label: String, kind: NodeKind, hidden: bool) -> Self {
        Self {
            id,
            label,
            kind,
            hidden,
            children: Vec::new(),
            by_segment: HashMap::new(),
        }
    }
}

impl Hierarchy {
    pub fn from_rows(rows: Vec<HierarchyRow>) -> Self {
        Self { rows }
    }

    /// Parse a JSON array of rows.
    pub fn from_json(s: &str) -> Result<Self, HierarchyError> {
        Ok(Self::from_rows(serde_json::from_str(s)?))
    }

    pub fn rows(&self) -> &[HierarchyRow] {
        &self.rows
    }

    /// The row a built node came from.
    pub fn row(&self, key: &NodeKey) -> Option<&HierarchyRow> {
        let id: usize = key.as_str().parse().ok()?;
        self.rows.get(id.checked_sub(1)?)
    }

    /// Build the forest of records for a snapshot.
    ///
    /// Categories are always inserted; fields only when `filter` matches
    /// their name. A row whose path repeats an earlier one replaces it in
    /// place. Rows nested under a field are skipped.
    ///
    /// With a clopen map, nodes stored as open start expanded (categories)
    /// or selected (fields), and every other node gets a `false` entry.
    /// Categories left without children are then removed, bottom-up.
    pub fn build(
        &self,
        filter: &SearchFilter,
        clopen: Option<&ClopenMap>,
    ) -> Result<Vec<TreeNode>, HierarchyError> {
        let mut slots = vec![Slot::new(0, "root".to_string(), NodeKind::Category, false)];

        for (index, row) in self.rows.iter().enumerate() {
            let number = index + 1;
            let path: Vec<&str> = row.node_id.split('.').filter(|s| *s != "0").collect();
            let Some((last, parents)) = path.split_last() else {
                return Err(HierarchyError::EmptyPath { row: number });
            };

            let mut parent = ROOT;
            let mut under_field = false;
            for segment in parents {
                let Some(&next) = slots[parent].by_segment.get(*segment) else {
                    return Err(HierarchyError::MissingParent {
                        row: number,
                        path: row.node_id.clone(),
                    });
                };
                parent = next;
                if slots[parent].kind == NodeKind::Field {
                    under_field = true;
                    break;
                }
            }
            if under_field {
                trace!(row = number, path = %row.node_id, "Skipping row nested under a field");
                continue;
            }

            let kind = row.node_type.kind();
            let hidden = kind == NodeKind::Field && !filter.matches(&row.node_name);
            let slot = slots.len();
            slots.push(Slot::new(number as u64, row.node_name.clone(), kind, hidden));

            let parent = &mut slots[parent];
            match parent.by_segment.insert((*last).to_string(), slot) {
                Some(previous) => {
                    if let Some(pos) = parent.children.iter().position(|c| *c == previous) {
                        parent.children[pos] = slot;
                    }
                }
                None => parent.children.push(slot),
            }
        }

        // Pre-order over the reachable, unfiltered slots.
        let mut order = Vec::with_capacity(slots.len());
        let mut stack = vec![ROOT];
        while let Some(s) = stack.pop() {
            order.push(s);
            stack.extend(slots[s].children.iter().rev().filter(|c| !slots[**c].hidden));
        }

        let mut open = vec![false; slots.len()];
        if let Some(clopen) = clopen {
            for &s in order.iter().skip(1) {
                let key = NodeKey::from(slots[s].id);
                open[s] = clopen.is_open(&key);
                if !open[s] {
                    clopen.set_default_closed(&key);
                }
            }
        }

        // Children precede their parent in reverse pre-order, so every
        // subtree is complete by the time its parent is assembled.
        let mut built: Vec<Option<TreeNode>> = vec![None; slots.len()];
        for &s in order.iter().skip(1).rev() {
            let slot = &slots[s];
            let node = match slot.kind {
                NodeKind::Field => {
                    let leaf = TreeNode::leaf(slot.id, slot.label.clone());
                    if open[s] { leaf.selected() } else { leaf }
                }
                NodeKind::Category => {
                    let children: Vec<TreeNode> =
                        slot.children.iter().filter_map(|c| built[*c].take()).collect();
                    if children.is_empty() {
                        continue;
                    }
                    let category = TreeNode::category(slot.id, slot.label.clone(), children);
                    if open[s] { category.expanded() } else { category }
                }
            };
            built[s] = Some(node);
        }

        let forest: Vec<TreeNode> = slots[ROOT]
            .children
            .iter()
            .filter_map(|c| built[*c].take())
            .collect();
        debug!(
            rows = self.rows.len(),
            top_level = forest.len(),
            filtered = !filter.is_all(),
            "Built hierarchy snapshot"
        );
        Ok(forest)
    }

    /// Build and index a snapshot ready for the engine.
    pub fn snapshot(
        &self,
        filter: &SearchFilter,
        clopen: Option<&ClopenMap>,
    ) -> Result<Tree, HierarchyError> {
        Ok(Tree::from_nodes(self.build(filter, clopen)?)?)
    }
}

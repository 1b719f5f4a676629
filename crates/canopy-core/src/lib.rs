#![deny(unsafe_code)]

//! Canopy selection-and-expansion engine.
//!
//! Keeps a bounded selection of leaves and the expand/collapse state of a
//! category/field tree consistent while the host swaps in fresh snapshots of
//! the tree data. The host feeds gestures in through [`Engine`] and receives
//! a full state report after each change.

/// Compile-time build metadata (version, git hash, profile).
pub mod build_info;
/// Host-owned collapsed/open map shared with the engine.
pub mod clopen;
/// Engine facade: gesture entry points, snapshot replacement and reporting.
pub mod engine;
/// Click events and modifier keys.
pub mod event;
/// Expand, collapse and pruning transitions.
pub mod expansion;
/// Snapshot construction from flat hierarchy listings, with search.
pub mod hierarchy;
/// Node identifiers compared as text.
pub mod key;
/// Carrying a selection across snapshot replacement.
pub mod reconcile;
/// Bounded FIFO selection set.
pub mod selection;
/// Arena-backed tree snapshot.
pub mod tree;
/// Pure presentation projection of the tree and selection.
pub mod view;

pub use clopen::ClopenMap;
pub use engine::{ClickOutcome, Engine, EngineOptions, EngineReport, Reporter};
pub use event::{ClickEvent, Modifiers};
pub use expansion::Transition;
pub use hierarchy::{Hierarchy, HierarchyError, HierarchyRow, RowType, SearchFilter};
pub use key::NodeKey;
pub use reconcile::Reconciliation;
pub use selection::{SelectionChange, SelectionEntry, SelectionSet};
pub use tree::{Node, NodeKind, NodeRef, Tree, TreeError, TreeNode};
pub use view::{Marker, NodeView, SelectedView, VisibleRow};

//! Engine facade.
//!
//! Owns the current [`Tree`] snapshot and the [`SelectionSet`], routes the
//! rendering layer's gestures to the selection and expansion controllers, and
//! reports the full state to the host after every call that changed something.
//! The host remains the system of record: a report is a copy, and the engine
//! keeps nothing beyond the lifetime of the current snapshot except the
//! selection it carries into the next one.

use std::num::NonZeroUsize;

use canopy_config::{ClickMode, EngineConfig, OverflowPolicy, SelectionConfig};
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::clopen::ClopenMap;
use crate::event::ClickEvent;
use crate::expansion::{self, Transition};
use crate::key::NodeKey;
use crate::reconcile::{self, Reconciliation};
use crate::selection::{SelectionChange, SelectionSet};
use crate::tree::{NodeRef, Tree};
use crate::view::{self, NodeView, SelectedView, VisibleRow};

/// Behavioural knobs fixed for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Maximum number of selected leaves; `None` is unbounded.
    pub capacity: Option<NonZeroUsize>,
    pub overflow: OverflowPolicy,
    pub click_mode: ClickMode,
    /// Mirror leaf membership into the clopen map.
    pub persist_leaves: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            capacity: None,
            overflow: OverflowPolicy::default(),
            click_mode: ClickMode::default(),
            persist_leaves: true,
        }
    }
}

impl EngineOptions {
    pub fn with_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    pub fn with_click_mode(mut self, click_mode: ClickMode) -> Self {
        self.click_mode = click_mode;
        self
    }

    pub fn with_persist_leaves(mut self, persist_leaves: bool) -> Self {
        self.persist_leaves = persist_leaves;
        self
    }
}

impl From<&SelectionConfig> for EngineOptions {
    fn from(config: &SelectionConfig) -> Self {
        Self {
            capacity: config.capacity(),
            overflow: config.overflow,
            click_mode: config.click_mode,
            persist_leaves: config.persist_leaves,
        }
    }
}

/// Full engine state as handed to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineReport {
    pub nodes: Vec<NodeView>,
    pub selection_set: Vec<SelectedView>,
    pub update_counter: u64,
}

/// Receives a report after every mutating engine call.
pub trait Reporter {
    fn report(&mut self, report: EngineReport);
}

impl<F> Reporter for F
where
    F: FnMut(EngineReport),
{
    fn report(&mut self, report: EngineReport) {
        self(report)
    }
}

/// What a node click did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// A leaf was clicked.
    Selection(SelectionChange),
    /// A category was clicked.
    Expansion(Transition),
    /// The handle does not resolve in the current snapshot.
    Ignored,
}

impl ClickOutcome {
    fn mutated(&self) -> bool {
        match self {
            Self::Selection(change) => !change.is_empty(),
            Self::Expansion(transition) => *transition != Transition::Ignored,
            Self::Ignored => false,
        }
    }
}

/// The selection-and-expansion engine.
pub struct Engine {
    tree: Tree,
    selection: SelectionSet,
    clopen: Option<ClopenMap>,
    reporter: Option<Box<dyn Reporter>>,
    update_counter: u64,
    options: EngineOptions,
}

impl Engine {
    /// An engine over an empty snapshot.
    pub fn new(options: EngineOptions) -> Self {
        Self {
            tree: Tree::empty(),
            selection: SelectionSet::new(options.capacity, options.overflow),
            clopen: None,
            reporter: None,
            update_counter: 0,
            options,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(EngineOptions::from(&config.selection))
    }

    /// Attach the host-owned clopen map.
    pub fn with_clopen(mut self, clopen: ClopenMap) -> Self {
        self.clopen = Some(clopen);
        self
    }

    /// Attach the reporting callback.
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    /// Carry a selection from before the first snapshot.
    ///
    /// The keys stay orphaned until a snapshot containing them arrives.
    /// Keys beyond the capacity are dropped oldest first.
    pub fn with_prior_selection(mut self, keys: impl IntoIterator<Item = NodeKey>) -> Self {
        for key in keys {
            self.selection.seed(key);
        }
        self.selection.enforce_capacity();
        self
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    pub fn clopen(&self) -> Option<&ClopenMap> {
        self.clopen.as_ref()
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn update_counter(&self) -> u64 {
        self.update_counter
    }

    /// Look up a node of the current snapshot by id.
    pub fn find(&self, key: &NodeKey) -> Option<NodeRef> {
        self.tree.find(key)
    }

    /// Flat pre-order projection of the attached tree.
    pub fn view(&self) -> Vec<NodeView> {
        view::project(&self.tree, &self.selection)
    }

    /// Rows a renderer would draw.
    pub fn visible_rows(&self) -> Vec<VisibleRow> {
        view::visible_rows(&self.tree, &self.selection)
    }

    /// The state a report would carry right now.
    pub fn state(&self) -> EngineReport {
        EngineReport {
            nodes: self.view(),
            selection_set: self.selection.iter().map(SelectedView::from).collect(),
            update_counter: self.update_counter,
        }
    }

    /// Node click: categories toggle expansion, leaves toggle selection.
    ///
    /// In [`ClickMode::Modifier`] a plain click on an unselected leaf replaces
    /// the selection, while a click with ctrl, shift or meta held adds to it.
    pub fn handle_node_click(&mut self, node: NodeRef, event: &ClickEvent) -> ClickOutcome {
        let Some(n) = self.tree.node(node) else {
            trace!(?node, "Click ignored: handle not in current snapshot");
            return ClickOutcome::Ignored;
        };

        let outcome = if n.is_category() {
            ClickOutcome::Expansion(expansion::toggle(
                &mut self.tree,
                node,
                &self.selection,
                self.clopen.as_ref(),
            ))
        } else {
            let selected = self.selection.contains(n.key());
            let change = match self.options.click_mode {
                ClickMode::Modifier if !selected && !event.modifiers.extends_selection() => {
                    self.selection.replace(&self.tree, node)
                }
                _ => self.selection.toggle(&self.tree, node),
            };
            self.persist(&change);
            ClickOutcome::Selection(change)
        };

        if outcome.mutated() {
            self.commit();
        }
        outcome
    }

    /// Expand a category.
    pub fn handle_expand(&mut self, node: NodeRef) -> Transition {
        let transition = expansion::expand(&mut self.tree, node, self.clopen.as_ref());
        if transition != Transition::Ignored {
            self.commit();
        }
        transition
    }

    /// Collapse a category, pruning around selections or restoring a
    /// previous prune.
    pub fn handle_collapse(&mut self, node: NodeRef) -> Transition {
        let transition =
            expansion::collapse(&mut self.tree, node, &self.selection, self.clopen.as_ref());
        if transition != Transition::Ignored {
            self.commit();
        }
        transition
    }

    /// Deselect every member.
    pub fn clear_selection(&mut self) -> SelectionChange {
        let change = self.selection.clear();
        if !change.is_empty() {
            debug!(removed = change.removed.len(), "Cleared selection");
            self.persist(&change);
            self.commit();
        }
        change
    }

    /// Swap in a fresh snapshot and carry the selection onto it.
    pub fn on_snapshot_replaced(&mut self, tree: Tree) -> Reconciliation {
        self.tree = tree;
        let outcome = reconcile::reconcile(&mut self.tree, &mut self.selection);
        if self.options.persist_leaves
            && let Some(clopen) = &self.clopen
        {
            for key in &outcome.adopted {
                if self.selection.contains(key) {
                    clopen.set(key, true);
                }
            }
            for key in &outcome.evicted {
                clopen.set(key, false);
            }
        }
        info!(
            nodes = self.tree.len(),
            selected = self.selection.len(),
            orphaned = outcome.orphaned.len(),
            "Snapshot replaced"
        );
        self.commit();
        outcome
    }

    fn persist(&self, change: &SelectionChange) {
        if !self.options.persist_leaves {
            return;
        }
        let Some(clopen) = &self.clopen else {
            return;
        };
        for key in &change.removed {
            clopen.set(key, false);
        }
        if let Some(key) = &change.added {
            clopen.set(key, true);
        }
    }

    fn commit(&mut self) {
        self.update_counter += 1;
        if self.reporter.is_some() {
            let state = self.state();
            if let Some(reporter) = self.reporter.as_mut() {
                reporter.report(state);
            }
        }
    }
}

//! Branching undo/redo history
//!
//! [`History`] records one version per completed edit and keeps every
//! abandoned future. Undoing and then editing does not discard the undone
//! versions; the new edit becomes an additional child, and the old line
//! stays reachable through [`History::select_branch`].
//!
//! Every version stores a full snapshot, so undo and redo are O(1) moves
//! of the current pointer. The per-version delta is kept for merging.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::config::HistoryConfig;
use crate::delta::diff_states;
use crate::element::{states_equal, DocumentState};
use crate::merge::{find_conflicts, merge_deltas, Conflict};
use crate::prune::{self, PruneResult};
use crate::tree::{Version, VersionId, VersionTree};

/// One redo option from the current version
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchOption {
    /// Index to pass to [`History::select_branch`]
    pub index: usize,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

/// Tree-structured undo/redo history for one document
pub struct History {
    tree: VersionTree,
    current: VersionId,
    config: HistoryConfig,
    clock: Box<dyn Clock>,
}

impl fmt::Debug for History {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("History")
            .field("versions", &self.tree.len())
            .field("current", &self.current)
            .field("config", &self.config)
            .finish()
    }
}

impl History {
    /// Start a history at `initial` with default limits and the system clock
    pub fn new(initial: DocumentState) -> Self {
        Self::with_config(initial, HistoryConfig::default())
    }

    pub fn with_config(initial: DocumentState, config: HistoryConfig) -> Self {
        Self::with_clock(initial, config, SystemClock)
    }

    pub fn with_clock(
        initial: DocumentState,
        config: HistoryConfig,
        clock: impl Clock + 'static,
    ) -> Self {
        let tree = VersionTree::new(initial, clock.now());
        let current = tree.root_id();
        Self {
            tree,
            current,
            config,
            clock: Box::new(clock),
        }
    }

    /// Drop every version and start over from `initial`
    pub fn reset(&mut self, initial: DocumentState) {
        debug!(dropped = self.tree.len(), "history reset");
        self.tree = VersionTree::new(initial, self.clock.now());
        self.current = self.tree.root_id();
    }

    // ── Recording ─────────────────────────────────────────────────────

    /// Record `state` as a new version after the current one.
    ///
    /// Ignored (returns `None`) if `state` equals the current state
    /// element-for-element, or differs only in element order. Otherwise
    /// the new version is appended as the last child of the current one,
    /// alongside any existing children, and becomes current. Pruning runs
    /// afterwards if the tree has grown past the threshold.
    pub fn push(&mut self, state: DocumentState, description: impl Into<String>) -> Option<VersionId> {
        let current = &self.tree[self.current];
        if states_equal(&state, current.state()) {
            trace!(version = %self.current, "push ignored: state unchanged");
            return None;
        }

        let delta = diff_states(current.state(), &state);
        if delta.is_empty() {
            trace!(version = %self.current, "push ignored: reorder only");
            return None;
        }

        let changes = delta.change_count();
        let id = self.tree.insert_child(
            self.current,
            state,
            Some(delta),
            description.into(),
            self.clock.now(),
        )?;
        debug!(
            version = %id,
            parent = %self.current,
            depth = self.tree[id].depth(),
            changes,
            "recorded version"
        );
        self.current = id;

        if self.tree.len() > self.config.prune_threshold {
            self.prune();
        }
        Some(id)
    }

    // ── Navigation ────────────────────────────────────────────────────

    /// Move to the parent version and return its state; `None` at the root
    pub fn undo(&mut self) -> Option<&DocumentState> {
        let Some(parent) = self.tree[self.current].parent() else {
            trace!("undo ignored: at root");
            return None;
        };
        trace!(from = %self.current, to = %parent, "undo");
        self.current = parent;
        Some(self.tree[parent].state())
    }

    /// Move to the first child version; same as `select_branch(0)`
    pub fn redo(&mut self) -> Option<&DocumentState> {
        self.select_branch(0)
    }

    /// Move to child `index` of the current version and return its state;
    /// `None` if there is no such child
    pub fn select_branch(&mut self, index: usize) -> Option<&DocumentState> {
        let Some(&child) = self.tree[self.current].children().get(index) else {
            trace!(index, version = %self.current, "redo ignored: no such branch");
            return None;
        };
        trace!(from = %self.current, to = %child, index, "redo");
        self.current = child;
        Some(self.tree[child].state())
    }

    pub fn can_undo(&self) -> bool {
        !self.current_version().is_root()
    }

    pub fn can_redo(&self) -> bool {
        !self.current_version().is_leaf()
    }

    // ── Merging ───────────────────────────────────────────────────────

    /// Merge two children of the current version into a new child.
    ///
    /// The source child's delta is layered on the current state, then the
    /// target's; where both change the same property the target wins. The
    /// merged version is labelled `"Merged: <source> + <target>"` and
    /// becomes current. Returns `None`, leaving the tree untouched, unless
    /// both indices name distinct existing children.
    pub fn merge_branch(&mut self, source: usize, target: usize) -> Option<&DocumentState> {
        if source == target {
            trace!(source, target, "merge ignored: same branch");
            return None;
        }
        let (source_version, target_version) = match self.branch_pair(source, target) {
            Some(pair) => pair,
            None => {
                trace!(source, target, version = %self.current, "merge ignored: no such branch");
                return None;
            }
        };

        let base = self.current_version().state();
        let outcome = merge_deltas(base, source_version.delta()?, target_version.delta()?);
        let delta = diff_states(base, &outcome.state);
        let description = format!(
            "Merged: {} + {}",
            source_version.description(),
            target_version.description()
        );
        let (from_source, from_target) = (source_version.id(), target_version.id());
        let conflicts = outcome.conflicts.len();

        let id = self.tree.insert_child(
            self.current,
            outcome.state,
            Some(delta),
            description,
            self.clock.now(),
        )?;
        debug!(
            version = %id,
            source = %from_source,
            target = %from_target,
            conflicts,
            "merged branches"
        );
        self.current = id;
        Some(self.tree[id].state())
    }

    /// Overlapping edits between two children of the current version, as
    /// [`merge_branch`](Self::merge_branch) would resolve them
    pub fn branch_conflicts(&self, source: usize, target: usize) -> Option<Vec<Conflict>> {
        let (source_version, target_version) = self.branch_pair(source, target)?;
        Some(find_conflicts(
            source_version.delta()?,
            target_version.delta()?,
        ))
    }

    fn branch_pair(&self, source: usize, target: usize) -> Option<(&Version, &Version)> {
        let children = self.current_version().children();
        let source = *children.get(source)?;
        let target = *children.get(target)?;
        Some((&self.tree[source], &self.tree[target]))
    }

    // ── Pruning ───────────────────────────────────────────────────────

    /// Run a prune pass now, regardless of tree size.
    ///
    /// The age sweep always runs; the single oldest-leaf eviction only if
    /// the tree is still above the threshold.
    pub fn prune(&mut self) -> PruneResult {
        let result = prune::prune(&mut self.tree, self.current, self.clock.now(), &self.config);
        if result.did_prune() {
            debug!(
                aged_out = result.aged_out,
                evicted = ?result.evicted,
                retained = result.retained,
                "pruned history"
            );
        }
        result
    }

    /// What [`prune`](Self::prune) would remove, without removing it
    pub fn prune_preview(&self) -> PruneResult {
        prune::dry_run(&self.tree, self.current, self.clock.now(), &self.config)
    }

    // ── Queries ───────────────────────────────────────────────────────

    pub fn current_state(&self) -> &DocumentState {
        self.current_version().state()
    }

    /// Description of the edit that produced the current version
    pub fn description(&self) -> &str {
        self.current_version().description()
    }

    /// Redo options from the current version, in creation order
    pub fn branch_options(&self) -> Vec<BranchOption> {
        self.children()
            .enumerate()
            .map(|(index, child)| BranchOption {
                index,
                description: String::from(child.description()),
                timestamp: child.timestamp(),
            })
            .collect()
    }

    /// States of every child of the current version
    pub fn branches(&self) -> Vec<&DocumentState> {
        self.children().map(Version::state).collect()
    }

    pub fn branch_descriptions(&self) -> Vec<&str> {
        self.children().map(Version::description).collect()
    }

    pub fn branch_count(&self) -> usize {
        self.current_version().children().len()
    }

    /// True if redo has more than one future to choose from
    pub fn has_branches(&self) -> bool {
        self.branch_count() > 1
    }

    /// States from the root to the current version, inclusive
    pub fn current_path(&self) -> Vec<&DocumentState> {
        self.tree
            .path_to(self.current)
            .into_iter()
            .map(|id| self.tree[id].state())
            .collect()
    }

    pub fn current_path_ids(&self) -> Vec<VersionId> {
        self.tree.path_to(self.current)
    }

    pub fn current_id(&self) -> VersionId {
        self.current
    }

    pub fn root_id(&self) -> VersionId {
        self.tree.root_id()
    }

    pub fn current_version(&self) -> &Version {
        &self.tree[self.current]
    }

    pub fn version(&self, id: VersionId) -> Option<&Version> {
        self.tree.get(id)
    }

    /// Total number of versions, root included
    pub fn version_count(&self) -> usize {
        self.tree.len()
    }

    pub fn tree(&self) -> &VersionTree {
        &self.tree
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    fn children(&self) -> impl Iterator<Item = &Version> + '_ {
        self.current_version()
            .children()
            .iter()
            .map(move |&id| &self.tree[id])
    }
}

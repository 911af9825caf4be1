//! Version pruning
//!
//! Bounds tree growth by dropping abandoned versions. The path from the
//! root to the current version is never touched; only off-path leaves
//! are candidates.
//!
//! # Algorithm
//!
//! 1. **Age sweep**: walk the tree bottom-up and remove every off-path
//!    leaf older than the configured maximum age. A parent whose children
//!    were all removed in this pass is re-checked under the same rule.
//! 2. **Eviction**: if the tree is still above the threshold, remove the
//!    single oldest off-path leaf. One eviction per pass, not a loop.
//!
//! A purely linear history has no off-path leaves, so pruning it is a
//! no-op however large it grows.

use std::collections::HashSet;

use chrono::{DateTime, TimeDelta, Utc};

use crate::config::HistoryConfig;
use crate::tree::{VersionId, VersionTree};

// ── Prune Result ──────────────────────────────────────────────────────

/// Statistics from a prune pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PruneResult {
    /// Versions removed by the age sweep.
    pub aged_out: usize,
    /// Leaf removed by the size-based eviction, if any.
    pub evicted: Option<VersionId>,
    /// Total versions before pruning.
    pub total_before: usize,
    /// Versions left after pruning.
    pub retained: usize,
}

impl PruneResult {
    /// Number of versions removed.
    #[inline]
    pub fn removed(&self) -> usize {
        self.total_before - self.retained
    }

    /// True if any version was removed.
    #[inline]
    pub fn did_prune(&self) -> bool {
        self.retained < self.total_before
    }
}

// ── Prune ─────────────────────────────────────────────────────────────

/// Prune `tree`, protecting the path from the root to `current`.
pub fn prune(
    tree: &mut VersionTree,
    current: VersionId,
    now: DateTime<Utc>,
    config: &HistoryConfig,
) -> PruneResult {
    let total_before = tree.len();
    let protected = protected_path(tree, current);

    let aged = plan_age_sweep(tree, &protected, now, config.max_age());
    for &id in &aged {
        tree.remove_subtree(id);
    }

    let mut evicted = None;
    if tree.len() > config.prune_threshold {
        if let Some(id) = oldest_leaf(tree, &protected, &HashSet::new()) {
            tree.remove_subtree(id);
            evicted = Some(id);
        }
    }

    PruneResult {
        aged_out: aged.len(),
        evicted,
        total_before,
        retained: tree.len(),
    }
}

/// Dry-run: compute what [`prune`] would remove without touching the tree.
pub fn dry_run(
    tree: &VersionTree,
    current: VersionId,
    now: DateTime<Utc>,
    config: &HistoryConfig,
) -> PruneResult {
    let total_before = tree.len();
    let protected = protected_path(tree, current);

    let aged = plan_age_sweep(tree, &protected, now, config.max_age());
    let remaining = total_before - aged.len();

    let evicted = if remaining > config.prune_threshold {
        let gone: HashSet<VersionId> = aged.iter().copied().collect();
        oldest_leaf(tree, &protected, &gone)
    } else {
        None
    };

    PruneResult {
        aged_out: aged.len(),
        evicted,
        total_before,
        retained: remaining - usize::from(evicted.is_some()),
    }
}

/// Every version from the root to `current`, inclusive.
fn protected_path(tree: &VersionTree, current: VersionId) -> HashSet<VersionId> {
    tree.path_to(current).into_iter().collect()
}

/// Ids the age sweep removes, children before parents.
///
/// Reverse pre-order visits every child before its parent, so a parent
/// sees its children's fate within the same pass.
fn plan_age_sweep(
    tree: &VersionTree,
    protected: &HashSet<VersionId>,
    now: DateTime<Utc>,
    max_age: TimeDelta,
) -> Vec<VersionId> {
    let mut gone = HashSet::new();
    let mut plan = Vec::new();

    for id in tree.preorder().into_iter().rev() {
        if protected.contains(&id) {
            continue;
        }
        let version = &tree[id];
        let childless = version.children().iter().all(|c| gone.contains(c));
        if childless && now.signed_duration_since(version.timestamp()) > max_age {
            gone.insert(id);
            plan.push(id);
        }
    }

    plan
}

/// Oldest off-path leaf, ignoring versions already in `gone`.
///
/// Ties on timestamp go to the lower (earlier created) id.
fn oldest_leaf(
    tree: &VersionTree,
    protected: &HashSet<VersionId>,
    gone: &HashSet<VersionId>,
) -> Option<VersionId> {
    tree.versions()
        .filter(|v| !protected.contains(&v.id()) && !gone.contains(&v.id()))
        .filter(|v| v.children().iter().all(|c| gone.contains(c)))
        .min_by_key(|v| (v.timestamp(), v.id()))
        .map(|v| v.id())
}

// ── Tests ──────────────────────────────────────────────────────────────

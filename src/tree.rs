//! Version tree storage
//!
//! Versions are stored flat, keyed by [`VersionId`], with O(1) lookup.
//! Ownership is tree-shaped: a version owns the ids in its `children`,
//! and removing a version removes its whole subtree. The `parent` link is
//! a plain id used for traversal only, so dropping a subtree never has to
//! consult or keep alive anything above it.

use std::collections::HashMap;
use std::fmt;
use std::ops::Index;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::delta::Delta;
use crate::element::DocumentState;

/// Identity of a version, never reused within one tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct VersionId(u64);

impl VersionId {
    #[inline]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// Description given to the root version
pub const ROOT_DESCRIPTION: &str = "Initial state";

/// One recorded version of the document
#[derive(Debug, Clone)]
pub struct Version {
    pub(crate) id: VersionId,
    pub(crate) state: DocumentState,
    pub(crate) delta: Option<Delta>,
    pub(crate) parent: Option<VersionId>,
    pub(crate) children: Vec<VersionId>,
    pub(crate) description: String,
    pub(crate) timestamp: DateTime<Utc>,
    pub(crate) depth: usize,
}

impl Version {
    pub fn id(&self) -> VersionId {
        self.id
    }

    /// Full snapshot of the document at this version
    pub fn state(&self) -> &DocumentState {
        &self.state
    }

    /// Delta from the parent's state; `None` only for the root
    pub fn delta(&self) -> Option<&Delta> {
        self.delta.as_ref()
    }

    pub fn parent(&self) -> Option<VersionId> {
        self.parent
    }

    /// Child versions in creation order (most recent last)
    pub fn children(&self) -> &[VersionId] {
        &self.children
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Distance from the root, fixed at creation
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

/// Tree of versions rooted at the initial document state
#[derive(Debug, Clone)]
pub struct VersionTree {
    versions: HashMap<VersionId, Version>,
    root: VersionId,
    next_id: u64,
}

impl VersionTree {
    pub fn new(initial: DocumentState, timestamp: DateTime<Utc>) -> Self {
        let root = VersionId(0);
        let mut versions = HashMap::new();
        versions.insert(
            root,
            Version {
                id: root,
                state: initial,
                delta: None,
                parent: None,
                children: Vec::new(),
                description: String::from(ROOT_DESCRIPTION),
                timestamp,
                depth: 0,
            },
        );
        Self {
            versions,
            root,
            next_id: 1,
        }
    }

    pub fn root_id(&self) -> VersionId {
        self.root
    }

    /// Get version by id — O(1)
    pub fn get(&self, id: VersionId) -> Option<&Version> {
        self.versions.get(&id)
    }

    pub fn contains(&self, id: VersionId) -> bool {
        self.versions.contains_key(&id)
    }

    /// Total version count, root included
    pub fn len(&self) -> usize {
        self.versions.len()
    }

    /// Always false: the root cannot be removed
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// All versions, in no particular order
    pub fn versions(&self) -> impl Iterator<Item = &Version> {
        self.versions.values()
    }

    /// Append a new child under `parent`, returning its id.
    ///
    /// Existing children are left in place; the new version becomes the
    /// last (most recent) child. Returns `None` if `parent` is not in the
    /// tree.
    pub(crate) fn insert_child(
        &mut self,
        parent: VersionId,
        state: DocumentState,
        delta: Option<Delta>,
        description: String,
        timestamp: DateTime<Utc>,
    ) -> Option<VersionId> {
        let id = VersionId(self.next_id);
        let parent_version = self.versions.get_mut(&parent)?;
        parent_version.children.push(id);
        let depth = parent_version.depth + 1;
        self.next_id += 1;

        self.versions.insert(
            id,
            Version {
                id,
                state,
                delta,
                parent: Some(parent),
                children: Vec::new(),
                description,
                timestamp,
                depth,
            },
        );
        Some(id)
    }

    /// Remove a version and all its descendants, returning how many
    /// versions were dropped. The root is never removed.
    pub(crate) fn remove_subtree(&mut self, id: VersionId) -> usize {
        if id == self.root {
            return 0;
        }
        let parent = match self.versions.get(&id) {
            Some(v) => v.parent,
            None => return 0,
        };

        if let Some(parent) = parent.and_then(|p| self.versions.get_mut(&p)) {
            parent.children.retain(|&c| c != id);
        }

        let mut removed = 0;
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(version) = self.versions.remove(&next) {
                stack.extend(version.children);
                removed += 1;
            }
        }
        removed
    }

    /// Ids from the root down to `id`, inclusive. Empty if `id` is unknown.
    pub fn path_to(&self, id: VersionId) -> Vec<VersionId> {
        let mut path = Vec::new();
        let mut cursor = self.versions.get(&id);
        while let Some(version) = cursor {
            path.push(version.id);
            cursor = version.parent.and_then(|p| self.versions.get(&p));
        }
        path.reverse();
        path
    }

    /// Depth-first pre-order walk from the root; parents precede children
    /// and siblings keep creation order.
    pub fn preorder(&self) -> Vec<VersionId> {
        let mut order = Vec::with_capacity(self.versions.len());
        let mut stack = vec![self.root];
        while let Some(id) = stack.pop() {
            if let Some(version) = self.versions.get(&id) {
                order.push(id);
                stack.extend(version.children.iter().rev().copied());
            }
        }
        order
    }
}

impl Index<VersionId> for VersionTree {
    type Output = Version;

    /// Panics if `id` is not in the tree
    fn index(&self, id: VersionId) -> &Version {
        &self.versions[&id]
    }
}

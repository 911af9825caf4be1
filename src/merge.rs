//! Sibling branch merge
//!
//! Layers two sibling deltas onto their common parent state: the source
//! delta first, then the target delta on the result. Modifications patch
//! only the properties they changed, so edits to different properties of
//! one element both survive; where both branches change the same property
//! the target wins, since it is applied last. No content-aware resolution
//! is attempted; [`find_conflicts`] reports the overlaps for callers that
//! want to show them.

use std::collections::HashMap;

use serde::Serialize;

use crate::delta::{Delta, Modification, Property};
use crate::element::{DocumentState, ElementId, GraphElement};

/// How two sibling deltas overlap on one element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ConflictKind {
    /// Both branches changed the same property; target's value wins
    BothModified,
    /// One branch modified the element, the other removed it; removal wins
    ModifiedAndRemoved,
    /// Both branches added an element under the same id; both copies are kept
    BothAdded,
}

/// Overlapping edits on one element id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Conflict {
    pub id: ElementId,
    pub kind: ConflictKind,
    /// Properties both branches changed, for `BothModified`
    pub properties: Vec<Property>,
    /// Source branch's resulting element, `None` if it removed it
    pub source: Option<GraphElement>,
    /// Target branch's resulting element, `None` if it removed it
    pub target: Option<GraphElement>,
}

/// Merge result
#[derive(Debug, Clone)]
pub struct MergeOutcome {
    /// Parent state with both deltas layered on
    pub state: DocumentState,
    /// Overlaps that were resolved by layering order
    pub conflicts: Vec<Conflict>,
}

impl MergeOutcome {
    /// True if no overlapping edit had to be resolved by layering order
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Merge two sibling deltas computed against `base`.
pub fn merge_deltas(base: &DocumentState, source: &Delta, target: &Delta) -> MergeOutcome {
    let mut state = base.clone();
    source.apply_to(&mut state);
    target.apply_to(&mut state);

    MergeOutcome {
        state,
        conflicts: find_conflicts(source, target),
    }
}

/// Report element ids both deltas touch in incompatible ways.
///
/// Conflicts are listed in source-delta order: modifications first, then
/// removals, then additions.
pub fn find_conflicts(source: &Delta, target: &Delta) -> Vec<Conflict> {
    let target_modified: HashMap<ElementId, &Modification> =
        target.modified.iter().map(|m| (m.id, m)).collect();
    let target_added: HashMap<ElementId, &GraphElement> =
        target.added.iter().map(|e| (e.id, e)).collect();

    let mut conflicts = Vec::new();

    for m in &source.modified {
        if let Some(other) = target_modified.get(&m.id) {
            let properties = overlapping_properties(m, other);
            if !properties.is_empty() {
                conflicts.push(Conflict {
                    id: m.id,
                    kind: ConflictKind::BothModified,
                    properties,
                    source: Some(m.after.clone()),
                    target: Some(other.after.clone()),
                });
            }
        } else if target.removed.contains(&m.id) {
            conflicts.push(Conflict {
                id: m.id,
                kind: ConflictKind::ModifiedAndRemoved,
                properties: Vec::new(),
                source: Some(m.after.clone()),
                target: None,
            });
        }
    }

    for &id in &source.removed {
        if let Some(other) = target_modified.get(&id) {
            conflicts.push(Conflict {
                id,
                kind: ConflictKind::ModifiedAndRemoved,
                properties: Vec::new(),
                source: None,
                target: Some(other.after.clone()),
            });
        }
    }

    for added in &source.added {
        if let Some(other) = target_added.get(&added.id) {
            conflicts.push(Conflict {
                id: added.id,
                kind: ConflictKind::BothAdded,
                properties: Vec::new(),
                source: Some(added.clone()),
                target: Some((*other).clone()),
            });
        }
    }

    conflicts
}

/// Properties changed by both modifications to different values
fn overlapping_properties(source: &Modification, target: &Modification) -> Vec<Property> {
    let theirs = target.changed_properties();
    source
        .changed_properties()
        .into_iter()
        .filter(|p| theirs.contains(p) && !p.same_in(&source.after, &target.after))
        .collect()
}

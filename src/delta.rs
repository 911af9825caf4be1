//! Identity-keyed state diff
//!
//! Computes the structural difference between two document states:
//! elements added, ids removed, and before/after pairs for elements whose
//! content changed. Element order is ignored; a pure reorder diffs to an
//! empty delta.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::element::{elements_equal, DocumentState, ElementId, GraphElement};

/// A changed element, with full copies on both sides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modification {
    pub id: ElementId,
    pub before: GraphElement,
    pub after: GraphElement,
}

/// One element property a modification can touch
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Property {
    Kind,
    X,
    Y,
    /// A single key of `fields`
    Field(String),
}

impl Property {
    /// True if `a` and `b` hold the same value for this property
    pub fn same_in(&self, a: &GraphElement, b: &GraphElement) -> bool {
        match self {
            Property::Kind => a.kind == b.kind,
            Property::X => a.x == b.x,
            Property::Y => a.y == b.y,
            Property::Field(key) => a.fields.get(key) == b.fields.get(key),
        }
    }
}

impl Modification {
    /// Properties whose value differs between `before` and `after`
    pub fn changed_properties(&self) -> Vec<Property> {
        let (before, after) = (&self.before, &self.after);
        let mut props = Vec::new();
        if before.kind != after.kind {
            props.push(Property::Kind);
        }
        if before.x != after.x {
            props.push(Property::X);
        }
        if before.y != after.y {
            props.push(Property::Y);
        }
        for (key, value) in &after.fields {
            if before.fields.get(key) != Some(value) {
                props.push(Property::Field(key.clone()));
            }
        }
        for key in before.fields.keys() {
            if !after.fields.contains_key(key) {
                props.push(Property::Field(key.clone()));
            }
        }
        props
    }

    /// Write the changed properties of `after` into `element`
    pub fn patch(&self, element: &mut GraphElement) {
        for prop in self.changed_properties() {
            match prop {
                Property::Kind => element.kind = self.after.kind.clone(),
                Property::X => element.x = self.after.x,
                Property::Y => element.y = self.after.y,
                Property::Field(key) => match self.after.fields.get(&key) {
                    Some(value) => {
                        element.fields.insert(key, value.clone());
                    }
                    None => {
                        element.fields.remove(&key);
                    }
                },
            }
        }
    }
}

/// Difference from a parent state to a child state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Delta {
    /// Present in child, absent in parent
    pub added: Vec<GraphElement>,
    /// Present in parent, absent in child
    pub removed: Vec<ElementId>,
    /// Present in both with differing content
    pub modified: Vec<Modification>,
}

impl Delta {
    /// True if the delta records no change at all
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.modified.is_empty()
    }

    /// Number of recorded changes across all three lists
    pub fn change_count(&self) -> usize {
        self.added.len() + self.removed.len() + self.modified.len()
    }

    /// Apply this delta on top of `state`.
    ///
    /// 1. Drop every element whose id is in `removed`
    /// 2. Append every element of `added`
    /// 3. Patch the first element matching each `modified` id with the
    ///    properties that changed between `before` and `after`
    ///
    /// Against the state the delta was computed from, step 3 is a plain
    /// replacement by `after`. Against any other state only the changed
    /// properties are written, so two sibling deltas layered in a merge
    /// keep each other's untouched properties. Modifications whose id no
    /// longer exists are skipped.
    pub fn apply_to(&self, state: &mut DocumentState) {
        if !self.removed.is_empty() {
            state
                .elements_mut()
                .retain(|e| !self.removed.contains(&e.id));
        }

        state.elements_mut().extend(self.added.iter().cloned());

        for m in &self.modified {
            if let Some(slot) = state.get_mut(m.id) {
                m.patch(slot);
            }
        }
    }
}

/// Compute the delta transforming `old` into `new`.
///
/// Both states are indexed by id. Removed ids and modifications are
/// reported in `old` sequence order, additions in `new` sequence order.
pub fn diff_states(old: &DocumentState, new: &DocumentState) -> Delta {
    let old_index: HashMap<ElementId, &GraphElement> = old.iter().map(|e| (e.id, e)).collect();
    let new_index: HashMap<ElementId, &GraphElement> = new.iter().map(|e| (e.id, e)).collect();

    let mut delta = Delta::default();

    for (id, before) in unique_by_id(old, &old_index) {
        match new_index.get(&id) {
            None => delta.removed.push(id),
            Some(after) if !elements_equal(before, after) => {
                delta.modified.push(Modification {
                    id,
                    before: before.clone(),
                    after: (*after).clone(),
                });
            }
            Some(_) => {}
        }
    }

    for (id, element) in unique_by_id(new, &new_index) {
        if !old_index.contains_key(&id) {
            delta.added.push(element.clone());
        }
    }

    delta
}

/// Walk a state's ids in first-occurrence order, yielding the indexed
/// element for each id once.
fn unique_by_id<'a>(
    state: &'a DocumentState,
    index: &'a HashMap<ElementId, &'a GraphElement>,
) -> impl Iterator<Item = (ElementId, &'a GraphElement)> + 'a {
    let mut seen = HashSet::new();
    state.iter().filter_map(move |e| {
        if seen.insert(e.id) {
            index.get(&e.id).map(|found| (e.id, *found))
        } else {
            None
        }
    })
}

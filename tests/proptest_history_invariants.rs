//! Property-based invariant tests for the history engine.
//!
//! 1. Pushing a state equal to the current one changes nothing.
//! 2. Undo/redo over a linear history returns to the tip exactly.
//! 3. `diff(S, S)` is empty; `diff(∅, S)` adds everything; `diff(S, ∅)`
//!    removes everything.
//! 4. Applying `diff(A, B)` to `A` yields `B`'s content.
//! 5. Pruning never removes a version on the current path.
//! 6. A merge appends one child holding the layered state, leaving the
//!    merged branches untouched.

use std::collections::BTreeSet;

use chrono::TimeDelta;
use graph_history::{
    diff_states, merge_deltas, DocumentState, GraphElement, History, HistoryConfig, ManualClock,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

const KINDS: [&str; 4] = ["redis", "mongo", "node", "docker"];

fn element_strategy(id: u64) -> impl Strategy<Value = GraphElement> {
    (0usize..KINDS.len(), -500i32..500, -500i32..500, prop::option::of("[a-z]{1,6}")).prop_map(
        move |(kind, x, y, field)| {
            let el = GraphElement::new(id, KINDS[kind], f64::from(x), f64::from(y));
            match field {
                Some(value) => el.with_field("image", value),
                None => el,
            }
        },
    )
}

/// States with unique ids drawn from 1..=20
fn state_strategy() -> impl Strategy<Value = DocumentState> {
    prop::collection::btree_set(1u64..=20, 0..8).prop_flat_map(|ids: BTreeSet<u64>| {
        ids.into_iter()
            .map(element_strategy)
            .collect::<Vec<_>>()
            .prop_map(DocumentState::from)
    })
}

fn same_content(a: &DocumentState, b: &DocumentState) -> bool {
    diff_states(a, b).is_empty()
}

// ═════════════════════════════════════════════════════════════════════════
// 1. No-op push
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn push_equal_state_is_noop(initial in state_strategy(), next in state_strategy()) {
        let mut history = History::new(initial);
        history.push(next, "edit");
        let can_undo = history.can_undo();
        let can_redo = history.can_redo();
        let current = history.current_id();
        let count = history.version_count();

        let same = history.current_state().clone();
        prop_assert!(history.push(same, "x").is_none());
        prop_assert_eq!(history.can_undo(), can_undo);
        prop_assert_eq!(history.can_redo(), can_redo);
        prop_assert_eq!(history.current_id(), current);
        prop_assert_eq!(history.version_count(), count);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Linear undo/redo inverse
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn linear_undo_redo_round_trip(states in prop::collection::vec(state_strategy(), 1..10)) {
        let mut history = History::new(DocumentState::new());
        for (i, state) in states.into_iter().enumerate() {
            history.push(state, format!("step {i}"));
        }
        let tip = history.current_id();
        let tip_state = history.current_state().clone();
        let depth = history.current_path().len() - 1;

        for _ in 0..depth {
            prop_assert!(history.undo().is_some());
        }
        prop_assert!(history.undo().is_none());
        for _ in 0..depth {
            prop_assert!(history.redo().is_some());
        }
        prop_assert!(history.redo().is_none());
        prop_assert_eq!(history.current_id(), tip);
        prop_assert_eq!(history.current_state(), &tip_state);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Delta edge cases
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn diff_with_self_is_empty(s in state_strategy()) {
        prop_assert!(diff_states(&s, &s).is_empty());
    }

    #[test]
    fn diff_from_empty_adds_all(s in state_strategy()) {
        let delta = diff_states(&DocumentState::new(), &s);
        prop_assert_eq!(&delta.added[..], s.elements());
        prop_assert!(delta.removed.is_empty());
        prop_assert!(delta.modified.is_empty());
    }

    #[test]
    fn diff_to_empty_removes_all(s in state_strategy()) {
        let delta = diff_states(&s, &DocumentState::new());
        prop_assert_eq!(delta.removed, s.ids());
        prop_assert!(delta.added.is_empty());
        prop_assert!(delta.modified.is_empty());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Apply reproduces the target
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn apply_diff_reaches_target(a in state_strategy(), b in state_strategy()) {
        let delta = diff_states(&a, &b);
        let mut applied = a.clone();
        delta.apply_to(&mut applied);
        prop_assert!(same_content(&applied, &b), "a={:?}\nb={:?}\ngot={:?}", a, b, applied);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Pruning preserves the current path
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prune_keeps_current_path(
        ops in prop::collection::vec((state_strategy(), 0u8..4, 0i64..3), 1..60),
        threshold in 2usize..12,
    ) {
        let clock = ManualClock::default();
        let config = HistoryConfig::default().with_prune_threshold(threshold);
        let mut history = History::with_clock(DocumentState::new(), config, clock.clone());

        for (state, action, days) in ops {
            clock.advance(TimeDelta::days(days));
            match action {
                0 => {
                    history.undo();
                }
                _ => {
                    let before = history.current_path_ids();
                    let pushed = history.push(state, "edit");
                    let after = history.current_path_ids();
                    if let Some(id) = pushed {
                        prop_assert_eq!(&after[..after.len() - 1], &before[..]);
                        prop_assert_eq!(after.last().copied(), Some(id));
                    } else {
                        prop_assert_eq!(after, before);
                    }
                }
            }
            for id in history.current_path_ids() {
                prop_assert!(history.version(id).is_some());
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn linear_history_survives_threshold(threshold in 1usize..6, steps in 10usize..40) {
        let config = HistoryConfig::default().with_prune_threshold(threshold);
        let mut history = History::with_config(DocumentState::new(), config);
        for i in 0..steps {
            let x = i as f64;
            history.push(DocumentState::from(vec![GraphElement::new(1, "node", x, 0.0)]), "step");
        }
        prop_assert_eq!(history.current_path().len(), steps + 1);
        prop_assert_eq!(history.version_count(), steps + 1);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Merge adds exactly one layered child
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn merge_appends_layered_child(
        base in state_strategy(),
        a in state_strategy(),
        b in state_strategy(),
    ) {
        let mut history = History::new(base.clone());
        history.push(a, "a");
        history.undo();
        history.push(b, "b");
        history.undo();
        prop_assume!(history.branch_count() == 2);

        let parent = history.current_id();
        let children = history.current_version().children().to_vec();
        let delta_a = history.version(children[0]).unwrap().delta().unwrap().clone();
        let delta_b = history.version(children[1]).unwrap().delta().unwrap().clone();
        let before_a = history.version(children[0]).unwrap().state().clone();
        let count = history.version_count();

        let merged = history.merge_branch(0, 1).unwrap().clone();
        let expected = merge_deltas(&base, &delta_a, &delta_b).state;

        prop_assert_eq!(&merged, &expected);
        prop_assert_eq!(history.version_count(), count + 1);
        prop_assert_eq!(history.current_version().parent(), Some(parent));
        prop_assert_eq!(history.description(), "Merged: a + b");
        prop_assert_eq!(history.version(children[0]).unwrap().state(), &before_a);
    }
}

//! graph-history — Branching undo/redo for graph canvas documents
//!
//! Version history for an editable set of canvas elements, kept as a tree
//! instead of a stack:
//! - Undo then edit keeps the undone line as an alternate future
//! - Redo into any of several futures from the same point
//! - Merge two sibling futures into one by layering their deltas
//! - Identity-keyed deltas between versions (added / removed / modified)
//! - Age- and size-based pruning that never touches the active line
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`element`] | Graph elements, document states, element equality |
//! | [`delta`] | Identity-keyed state diff and delta application |
//! | [`merge`] | Sibling delta layering with overlap reporting |
//! | [`tree`] | Version storage: owned children, id back-links, cached depth |
//! | [`prune`] | Age sweep and oldest-leaf eviction |
//! | [`history`] | The undo/redo engine and its current pointer |
//! | [`clock`] | Time sources for version timestamps |
//! | [`config`] | Prune threshold and age limit |
//! | [`error`] | Errors for config and document loading |
//!
//! # Quick Start
//!
//! ```
//! use graph_history::{DocumentState, GraphElement, History};
//!
//! let mut history = History::new(DocumentState::new());
//!
//! let redis = GraphElement::new(1, "redis", 0.0, 0.0).with_field("password", "a");
//! history.push(DocumentState::from(vec![redis.clone()]), "add redis");
//! history.push(DocumentState::from(vec![redis.at(40.0, 0.0)]), "move");
//!
//! // Undo, then take a different direction: both futures are kept
//! history.undo();
//! let moved_down = GraphElement::new(1, "redis", 0.0, 80.0).with_field("password", "a");
//! history.push(DocumentState::from(vec![moved_down]), "move down");
//! history.undo();
//!
//! assert_eq!(history.branch_descriptions(), vec!["move", "move down"]);
//! let state = history.select_branch(1).unwrap();
//! assert_eq!(state.get(1).unwrap().y, 80.0);
//! ```

pub mod clock;
pub mod config;
pub mod delta;
pub mod element;
pub mod error;
pub mod history;
pub mod merge;
pub mod prune;
pub mod tree;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::HistoryConfig;
pub use delta::{diff_states, Delta, Modification, Property};
pub use element::{elements_equal, states_equal, DocumentState, ElementId, GraphElement};
pub use error::{HistoryError, Result};
pub use history::{BranchOption, History};
pub use merge::{find_conflicts, merge_deltas, Conflict, ConflictKind, MergeOutcome};
pub use prune::PruneResult;
pub use tree::{Version, VersionId, VersionTree};

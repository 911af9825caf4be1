//! Error types for configuration and document loading.
//!
//! The history operations themselves never fail; boundary conditions
//! (undo at the root, an out-of-range branch index) surface as `None`.

use thiserror::Error;

/// Result type for fallible history setup operations.
pub type Result<T> = std::result::Result<T, HistoryError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HistoryError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

//! Lotview error types

use thiserror::Error;

/// Failure to obtain or decode a run document.
///
/// Raised before any playback component exists; the core never retries.
#[derive(Error, Debug)]
pub enum LoadError {
    /// The upstream producer or transport failed
    #[error("Snapshot source failed: {0}")]
    Source(String),

    /// The document is not valid JSON or does not match the run format
    #[error("Malformed run document: {0}")]
    Parse(#[from] serde_json::Error),

    /// Timestep indices must start at 0 and increase by one
    #[error("Timestep {position} has t = {found}, expected {expected}")]
    NonContiguous {
        position: usize,
        expected: u32,
        found: u32,
    },

    /// The grid has more cells than a layout may hold
    #[error("Grid {width}x{height} exceeds the {limit} cell limit")]
    GridTooLarge { width: u32, height: u32, limit: usize },

    /// A pose coordinate is NaN or infinite
    #[error("Timestep {t}: entity {entity} has a non-finite position")]
    NonFinitePosition { t: u32, entity: String },
}

/// Failure to construct a playback session from loaded data
#[derive(Error, Debug, PartialEq, Eq)]
pub enum SessionError {
    /// A session needs at least one snapshot
    #[error("Cannot start playback: snapshot sequence is empty")]
    EmptySequence,
}

/// Result type for loading operations
pub type Result<T> = std::result::Result<T, LoadError>;

//! Typed failures for artifact loading, scenario construction, and KPI
//! comparison.
//!
//! Every failure in the core is representable as data: callers (CLI,
//! dashboard, tests) decide whether to halt, retry with corrected input, or
//! surface a message. Nothing here terminates the process.

use std::path::PathBuf;

use thiserror::Error;

/// Failure taxonomy for the simulator core.
#[derive(Debug, Error)]
pub enum SimError {
    /// The forecast artifact does not exist at the given path.
    #[error("forecast artifact not found at `{}` (has the trainer produced it?)", .path.display())]
    NotFound {
        /// Path that was probed.
        path: PathBuf,
    },

    /// The artifact exists but its top-level structure is unusable: not
    /// valid JSON, or the `forecast` field is absent or empty.
    #[error("malformed forecast artifact: {0}")]
    MalformedArtifact(String),

    /// A single forecast record is missing a field or carries an
    /// unparseable timestamp or demand value.
    #[error("malformed forecast record at index {index}: {reason}")]
    MalformedRecord {
        /// Zero-based position of the record in the `forecast` array.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },

    /// Baseline and adjusted series differ in length or timestamps.
    #[error("series shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Scenario parameters are out of range or inconsistent.
    #[error("invalid scenario parameters: {0}")]
    InvalidScenario(String),

    /// Run configuration could not be read or validated.
    #[error("configuration error: {0}")]
    Config(String),

    /// Underlying I/O failure other than a missing artifact.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Artifact serialization failure on the write path.
    #[error("artifact serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, SimError>;

//! Error types for the Halo Life runners.

use life_core::CoreError;
use life_env::EnvError;
use thiserror::Error;

/// Errors that stop a run. All of them are fatal; nothing is retried.
#[derive(Debug, Error)]
pub enum SimError {
    /// Grid, shape, decomposition or snapshot failure
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Halo exchange or gather failure
    #[error(transparent)]
    Env(#[from] EnvError),

    /// Run parameters rejected before the first generation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A worker task panicked or was cancelled
    #[error("Worker failed: {0}")]
    Worker(String),

    /// The coordinator stopped accepting frames
    #[error("Frame channel closed before generation {0} was delivered")]
    FramesClosed(u64),

    /// Two boards that should line up cell for cell do not
    #[error("Grid mismatch: expected {expected_rows}x{expected_cols}, found {rows}x{cols}")]
    GridMismatch {
        expected_rows: usize,
        expected_cols: usize,
        rows: usize,
        cols: usize,
    },

    /// A distributed frame disagreed with the single-process reference
    #[error("Generation {generation} diverges from the reference at ({row}, {col})")]
    Diverged {
        generation: u64,
        row: usize,
        col: usize,
    },

    /// The run finished without delivering a single frame
    #[error("Run produced no frames")]
    NoFrames,

    /// Output file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Run export serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SimError {
    /// Creates a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

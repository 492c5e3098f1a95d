//! Error types for the Halo Life core.

use thiserror::Error;

/// Errors raised by grid construction, decomposition and snapshot I/O.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Initial shape name not recognized
    #[error("Unknown initial shape: {0} (expected cross or random)")]
    UnknownShape(String),

    /// Grid with zero rows or columns
    #[error("Grid dimensions must be non-zero (got {rows}x{cols})")]
    EmptyGrid { rows: usize, cols: usize },

    /// Grid larger than MAX_DIMENSION on either side
    #[error("Grid dimensions {rows}x{cols} exceed the {max}x{max} limit")]
    GridTooLarge { rows: usize, cols: usize, max: usize },

    /// Row count not evenly divisible by the worker count
    #[error("Grid of {rows} rows cannot be split evenly across {workers} workers")]
    IndivisibleGrid { rows: usize, workers: usize },

    /// Decomposition requested with zero workers, or assembly of zero bands
    #[error("At least one worker is required")]
    NoWorkers,

    /// A row or cell buffer of the wrong length
    #[error("Row length mismatch: expected {expected} cells, found {found}")]
    RowLength { expected: usize, found: usize },

    /// A cell value other than 0 or 1
    #[error("Invalid cell value: {0}")]
    InvalidCell(u8),

    /// Malformed PBM snapshot
    #[error("PBM error: {0}")]
    Pbm(String),

    /// Snapshot file I/O failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CoreError {
    /// Creates a PBM parse error.
    pub fn pbm(msg: impl Into<String>) -> Self {
        Self::Pbm(msg.into())
    }
}

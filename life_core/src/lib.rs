//! Halo Life Core - Game of Life stencil engine with row-band decomposition
//!
//! This library provides the synchronous building blocks of both run modes:
//! 1. **Grid**: dense cell grid, initial shapes and the wrap seam
//! 2. **Rules**: edge-clamped neighbour count and the B3/S23 transition
//! 3. **Decomposition**: scatter into ghost-padded bands and gather back
//! 4. **PBM**: plain-text snapshot persistence

pub mod decomposition;
pub mod error;
pub mod grid;
pub mod pbm;
pub mod rules;

// Re-export key types for convenience
pub use decomposition::{assemble, gather, scatter, Band};
pub use error::CoreError;
pub use grid::{Cell, Grid, Shape, MAX_DIMENSION};
pub use rules::{step, update};

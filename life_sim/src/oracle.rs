//! Single-process reference for distributed runs.
//!
//! The Oracle replays `update` from the same initial board and checks each
//! gathered frame against it. The two modes treat the board edge
//! differently: `update` copies the first row and column onto the last ones
//! after every step, while bands see dead cells past the edge. That
//! difference enters at the last row and column and spreads one cell per
//! generation, so after `k` updates only cells with `row < R - k` and
//! `col < C - k` are compared.

use crate::error::SimError;
use crate::exporter::FrameSink;
use life_core::{update, Grid};
use serde::Serialize;
use tracing::{debug, warn};

/// First cell where a frame and the reference disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Divergence {
    pub generation: u64,
    pub row: usize,
    pub col: usize,
    pub expected: u8,
    pub found: u8,
}

/// Ground truth replay.
#[derive(Debug, Clone)]
pub struct Oracle {
    reference: Grid,

    /// Updates applied to `reference`
    updates: u64,
}

impl Oracle {
    pub fn new(initial: Grid) -> Self {
        Self {
            reference: initial,
            updates: 0,
        }
    }

    pub fn updates(&self) -> u64 {
        self.updates
    }

    /// Advances the reference until it has seen `updates` updates.
    pub fn advance_to(&mut self, updates: u64) {
        while self.updates < updates {
            self.reference = update(&self.reference);
            self.updates += 1;
        }
    }

    /// Cells both modes must agree on after `updates` updates.
    pub fn comparable(&self, updates: u64) -> (usize, usize) {
        let k = usize::try_from(updates).unwrap_or(usize::MAX);
        (
            self.reference.rows().saturating_sub(k),
            self.reference.cols().saturating_sub(k),
        )
    }

    /// Compares the distributed frame for `generation` (the board after
    /// `generation + 1` updates).
    pub fn compare(&mut self, generation: u64, distributed: &Grid) -> Result<Option<Divergence>, SimError> {
        if distributed.rows() != self.reference.rows() || distributed.cols() != self.reference.cols() {
            return Err(SimError::GridMismatch {
                expected_rows: self.reference.rows(),
                expected_cols: self.reference.cols(),
                rows: distributed.rows(),
                cols: distributed.cols(),
            });
        }

        let updates = generation + 1;
        self.advance_to(updates);
        let (rows, cols) = self.comparable(updates);

        for row in 0..rows {
            for col in 0..cols {
                let expected = self.reference.get(row, col);
                let found = distributed.get(row, col);
                if expected != found {
                    return Ok(Some(Divergence {
                        generation,
                        row,
                        col,
                        expected: expected.bit(),
                        found: found.bit(),
                    }));
                }
            }
        }
        Ok(None)
    }
}

/// Frame sink that checks every frame against an Oracle.
#[derive(Debug)]
pub struct VerifyingSink {
    oracle: Oracle,
    frames: u64,
    cells_compared: u64,
    divergence: Option<Divergence>,
}

impl VerifyingSink {
    pub fn new(initial: Grid) -> Self {
        Self {
            oracle: Oracle::new(initial),
            frames: 0,
            cells_compared: 0,
            divergence: None,
        }
    }

    /// Frames checked so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn cells_compared(&self) -> u64 {
        self.cells_compared
    }

    /// The first divergence seen, if any.
    pub fn divergence(&self) -> Option<Divergence> {
        self.divergence
    }
}

impl FrameSink for VerifyingSink {
    fn frame(&mut self, generation: u64, grid: &Grid) -> Result<(), SimError> {
        let found = self.oracle.compare(generation, grid)?;
        let (rows, cols) = self.oracle.comparable(generation + 1);
        self.frames += 1;
        self.cells_compared += (rows * cols) as u64;

        match found {
            Some(d) if self.divergence.is_none() => {
                warn!(
                    "Generation {} diverges at ({}, {}): expected {}, found {}",
                    d.generation, d.row, d.col, d.expected, d.found
                );
                self.divergence = Some(d);
            }
            Some(_) => {}
            None => debug!("Generation {} matches on {}x{} cells", generation, rows, cols),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use life_core::{step, Cell};

    #[test]
    fn test_identical_frames_match() {
        let initial = Grid::initialize(8, "cross").unwrap();
        let mut oracle = Oracle::new(initial.clone());
        let first = update(&initial);
        assert_eq!(oracle.compare(0, &first).unwrap(), None);
        assert_eq!(oracle.updates(), 1);
    }

    #[test]
    fn test_reports_first_divergence() {
        let initial = Grid::new(6, 6).unwrap();
        let mut oracle = Oracle::new(initial);

        let mut frame = Grid::new(6, 6).unwrap();
        frame.set(2, 3, Cell::Alive);
        let d = oracle.compare(0, &frame).unwrap().unwrap();
        assert_eq!((d.generation, d.row, d.col), (0, 2, 3));
        assert_eq!((d.expected, d.found), (0, 1));
    }

    #[test]
    fn test_ignores_cells_outside_light_cone() {
        // Without the seam the last row differs after one step; that row is
        // outside the compared region.
        let mut rows = vec![vec![0u8; 6]; 6];
        rows[0][1] = 1;
        rows[0][2] = 1;
        rows[0][3] = 1;
        let initial = Grid::from_rows(&rows).unwrap();
        let unseamed = step(&initial);
        assert_ne!(unseamed, update(&initial));

        let mut oracle = Oracle::new(initial);
        assert_eq!(oracle.comparable(1), (5, 5));
        assert_eq!(oracle.compare(0, &unseamed).unwrap(), None);
    }

    #[test]
    fn test_size_mismatch() {
        let mut oracle = Oracle::new(Grid::new(4, 4).unwrap());
        assert!(matches!(
            oracle.compare(0, &Grid::new(4, 5).unwrap()),
            Err(SimError::GridMismatch { .. })
        ));
    }

    #[test]
    fn test_verifying_sink_counts() {
        let initial = Grid::initialize(8, "cross").unwrap();
        let mut sink = VerifyingSink::new(initial.clone());
        let first = update(&initial);
        let second = update(&first);
        sink.frame(0, &first).unwrap();
        sink.frame(1, &second).unwrap();
        assert_eq!(sink.frames(), 2);
        assert_eq!(sink.cells_compared(), 49 + 36);
        assert!(sink.divergence().is_none());
    }
}

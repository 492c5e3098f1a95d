//! Rule engine: the B3/S23 transition applied with an edge-clamped
//! neighbour count.
//!
//! Cells outside the grid contribute nothing to a neighbour count. Toroidal
//! wraparound is not done here; single-process mode restores it afterwards
//! through the seam (`update`), while band workers rely on ghost rows
//! (`step_rows`).

use crate::grid::{Cell, Grid};
use std::ops::Range;

/// Offsets of the 8 surrounding cells.
const NEIGHBOURHOOD: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// Applies the transition table to one cell.
///
/// | neighbours | next        |
/// |------------|-------------|
/// | < 2        | dead        |
/// | 2          | unchanged   |
/// | 3          | alive       |
/// | > 3        | dead        |
pub fn next_cell(current: Cell, neighbours: u8) -> Cell {
    match neighbours {
        2 => current,
        3 => Cell::Alive,
        _ => Cell::Dead,
    }
}

/// Counts live cells among the 8 neighbours of (row, col); positions
/// outside the grid count as dead.
pub fn live_neighbours(grid: &Grid, row: usize, col: usize) -> u8 {
    let (rows, cols) = (grid.rows() as isize, grid.cols() as isize);
    NEIGHBOURHOOD
        .iter()
        .filter(|(dr, dc)| {
            let r = row as isize + dr;
            let c = col as isize + dc;
            r >= 0 && r < rows && c >= 0 && c < cols && grid.get(r as usize, c as usize).is_alive()
        })
        .count() as u8
}

/// Computes the next state of the rows in `rows`. Every other row of the
/// result is dead.
pub fn step_rows(grid: &Grid, rows: Range<usize>) -> Grid {
    let mut next = Grid::dead(grid.rows(), grid.cols());
    for r in rows {
        for c in 0..grid.cols() {
            let n = live_neighbours(grid, r, c);
            next.set(r, c, next_cell(grid.get(r, c), n));
        }
    }
    next
}

/// Computes the next state of every cell, without the seam.
pub fn step(grid: &Grid) -> Grid {
    step_rows(grid, 0..grid.rows())
}

/// Single-process generation update: `step` followed by the seam copy.
///
/// Pure; the input grid is left untouched.
pub fn update(grid: &Grid) -> Grid {
    let mut next = step(grid);
    next.apply_seam();
    next
}

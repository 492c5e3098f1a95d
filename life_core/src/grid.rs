//! The cell grid and its initial shapes.
//!
//! A `Grid` is a dense, row-major R×C array of cells. In single-process mode
//! the last row and last column form a *seam* that mirrors the first row and
//! first column, emulating toroidal wraparound on top of an edge-clamped
//! neighbour count.

use crate::error::CoreError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// =============================================================================
// CELL
// =============================================================================

/// Binary cell state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Cell {
    #[default]
    Dead = 0,
    Alive = 1,
}

impl Cell {
    pub fn is_alive(self) -> bool {
        self == Cell::Alive
    }

    /// Returns the snapshot encoding (0 or 1).
    pub fn bit(self) -> u8 {
        self as u8
    }

    /// Decodes a snapshot value.
    pub fn from_bit(bit: u8) -> Result<Self, CoreError> {
        match bit {
            0 => Ok(Cell::Dead),
            1 => Ok(Cell::Alive),
            other => Err(CoreError::InvalidCell(other)),
        }
    }
}

impl From<bool> for Cell {
    fn from(alive: bool) -> Self {
        if alive {
            Cell::Alive
        } else {
            Cell::Dead
        }
    }
}

// =============================================================================
// SHAPES
// =============================================================================

/// Named initial pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Shape {
    /// One live row and one live column through the centre
    Cross,

    /// Each cell alive with probability 0.5
    Random,
}

impl Shape {
    pub fn name(&self) -> &'static str {
        match self {
            Shape::Cross => "cross",
            Shape::Random => "random",
        }
    }
}

impl std::fmt::Display for Shape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Shape {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cross" => Ok(Shape::Cross),
            "random" => Ok(Shape::Random),
            _ => Err(CoreError::UnknownShape(s.to_string())),
        }
    }
}

// =============================================================================
// GRID
// =============================================================================

/// Largest accepted row or column count.
pub const MAX_DIMENSION: usize = 32767;

/// Fixed-size R×C grid of cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an all-dead grid.
    pub fn new(rows: usize, cols: usize) -> Result<Self, CoreError> {
        if rows == 0 || cols == 0 {
            return Err(CoreError::EmptyGrid { rows, cols });
        }
        Self::check_size(rows, cols)?;
        Ok(Self::dead(rows, cols))
    }

    /// Rejects dimensions above `MAX_DIMENSION` before anything is allocated.
    pub fn check_size(rows: usize, cols: usize) -> Result<(), CoreError> {
        if rows > MAX_DIMENSION || cols > MAX_DIMENSION {
            return Err(CoreError::GridTooLarge {
                rows,
                cols,
                max: MAX_DIMENSION,
            });
        }
        Ok(())
    }

    /// Infallible constructor for dimensions already known to be valid.
    pub(crate) fn dead(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![Cell::Dead; rows * cols],
        }
    }

    /// Builds a grid from row-major 0/1 values.
    pub fn from_bits(rows: usize, cols: usize, bits: &[u8]) -> Result<Self, CoreError> {
        let mut grid = Self::new(rows, cols)?;
        if bits.len() != rows * cols {
            return Err(CoreError::RowLength {
                expected: rows * cols,
                found: bits.len(),
            });
        }
        for (cell, &bit) in grid.cells.iter_mut().zip(bits) {
            *cell = Cell::from_bit(bit)?;
        }
        Ok(grid)
    }

    /// Builds a grid from a dense 2-D snapshot.
    pub fn from_rows(rows: &[Vec<u8>]) -> Result<Self, CoreError> {
        let cols = rows.first().map_or(0, Vec::len);
        let bits: Vec<u8> = rows
            .iter()
            .map(|row| {
                if row.len() == cols {
                    Ok(row.as_slice())
                } else {
                    Err(CoreError::RowLength {
                        expected: cols,
                        found: row.len(),
                    })
                }
            })
            .collect::<Result<Vec<_>, _>>()?
            .concat();
        Self::from_bits(rows.len(), cols, &bits)
    }

    /// Populates a `size`×`size` grid from a named shape, using thread-local
    /// entropy for `random`.
    pub fn initialize(size: usize, shape: &str) -> Result<Self, CoreError> {
        let shape: Shape = shape.parse()?;
        Self::initialize_with(size, shape, &mut rand::thread_rng())
    }

    /// Populates a `size`×`size` grid from a shape, drawing random cells from
    /// `rng`. The seam is applied before returning.
    pub fn initialize_with<R: Rng + ?Sized>(
        size: usize,
        shape: Shape,
        rng: &mut R,
    ) -> Result<Self, CoreError> {
        let mut grid = Self::new(size, size)?;
        match shape {
            Shape::Cross => {
                let centre = size / 2;
                for i in 0..size {
                    grid.set(centre, i, Cell::Alive);
                    grid.set(i, centre, Cell::Alive);
                }
            }
            Shape::Random => {
                for cell in grid.cells.iter_mut() {
                    *cell = Cell::from(rng.gen_bool(0.5));
                }
            }
        }
        grid.apply_seam();
        Ok(grid)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the cell at (row, col). Panics when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[row * self.cols + col]
    }

    /// Sets the cell at (row, col). Panics when out of bounds.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        self.cells[row * self.cols + col] = cell;
    }

    /// Returns one row as a slice.
    pub fn row(&self, row: usize) -> &[Cell] {
        let start = row * self.cols;
        &self.cells[start..start + self.cols]
    }

    /// Returns one row in snapshot encoding.
    pub fn row_bits(&self, row: usize) -> Vec<u8> {
        self.row(row).iter().map(|c| c.bit()).collect()
    }

    /// Overwrites one row from snapshot encoding.
    pub fn set_row_bits(&mut self, row: usize, bits: &[u8]) -> Result<(), CoreError> {
        if bits.len() != self.cols {
            return Err(CoreError::RowLength {
                expected: self.cols,
                found: bits.len(),
            });
        }
        let decoded = bits
            .iter()
            .map(|&b| Cell::from_bit(b))
            .collect::<Result<Vec<_>, _>>()?;
        let start = row * self.cols;
        self.cells[start..start + self.cols].copy_from_slice(&decoded);
        Ok(())
    }

    /// Copies rows `[start, end)` into a new grid.
    pub fn slice_rows(&self, start: usize, end: usize) -> Grid {
        Grid {
            rows: end - start,
            cols: self.cols,
            cells: self.cells[start * self.cols..end * self.cols].to_vec(),
        }
    }

    /// Row-major snapshot encoding of the whole grid.
    pub fn to_bits(&self) -> Vec<u8> {
        self.cells.iter().map(|c| c.bit()).collect()
    }

    /// Dense 2-D snapshot, one `Vec` per row.
    pub fn to_rows(&self) -> Vec<Vec<u8>> {
        (0..self.rows).map(|r| self.row_bits(r)).collect()
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|c| c.is_alive()).count()
    }

    /// Forces the wrap edges consistent: last row ← first row, then
    /// last column ← first column.
    pub fn apply_seam(&mut self) {
        let (rows, cols) = (self.rows, self.cols);
        if rows > 1 {
            let (head, tail) = self.cells.split_at_mut((rows - 1) * cols);
            tail.copy_from_slice(&head[..cols]);
        }
        if cols > 1 {
            for r in 0..rows {
                let first = self.get(r, 0);
                self.set(r, cols - 1, first);
            }
        }
    }

    /// True if the last row equals the first row and the last column equals
    /// the first column.
    pub fn has_seam(&self) -> bool {
        let last_row = self.rows - 1;
        let last_col = self.cols - 1;
        self.row(0) == self.row(last_row)
            && (0..self.rows).all(|r| self.get(r, 0) == self.get(r, last_col))
    }

    pub(crate) fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }
}

impl std::fmt::Display for Grid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for r in 0..self.rows {
            let line: String = self
                .row(r)
                .iter()
                .map(|c| if c.is_alive() { '#' } else { '.' })
                .collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_shape_parsing() {
        assert_eq!("cross".parse::<Shape>().unwrap(), Shape::Cross);
        assert_eq!("RANDOM".parse::<Shape>().unwrap(), Shape::Random);
        assert!(matches!(
            "glider".parse::<Shape>(),
            Err(CoreError::UnknownShape(name)) if name == "glider"
        ));
    }

    #[test]
    fn test_initialize_unknown_shape_fails() {
        assert!(Grid::initialize(8, "spiral").is_err());
    }

    #[test]
    fn test_initialize_empty_fails() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            Grid::initialize_with(0, Shape::Cross, &mut rng),
            Err(CoreError::EmptyGrid { .. })
        ));
    }

    #[test]
    fn test_new_rejects_oversized_grid() {
        assert!(matches!(
            Grid::new(MAX_DIMENSION + 1, 4),
            Err(CoreError::GridTooLarge { .. })
        ));
        assert!(matches!(
            Grid::new(4, usize::MAX),
            Err(CoreError::GridTooLarge { .. })
        ));
        assert!(Grid::new(MAX_DIMENSION, 1).is_ok());
    }

    #[test]
    fn test_cross_shape() {
        let grid = Grid::initialize(9, "cross").unwrap();
        assert!(grid.has_seam());

        // Row 0 and column 0 already match the last row and column, so the
        // seam changes nothing.
        for i in 0..9 {
            assert_eq!(grid.get(4, i), Cell::Alive);
            assert_eq!(grid.get(i, 4), Cell::Alive);
        }
        assert_eq!(grid.get(0, 0), Cell::Dead);
        assert_eq!(grid.get(8, 8), Cell::Dead);
        assert_eq!(grid.population(), 17);
    }

    #[test]
    fn test_random_shape_is_seeded_and_seamed() {
        let mut a = ChaCha8Rng::seed_from_u64(42);
        let mut b = ChaCha8Rng::seed_from_u64(42);
        let g1 = Grid::initialize_with(16, Shape::Random, &mut a).unwrap();
        let g2 = Grid::initialize_with(16, Shape::Random, &mut b).unwrap();

        assert_eq!(g1, g2);
        assert!(g1.has_seam());
        assert!(g1.population() > 0);
        assert!(g1.population() < 256);
    }

    #[test]
    fn test_apply_seam_copies_first_row_and_column() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.set(0, 1, Cell::Alive);
        grid.set(1, 0, Cell::Alive);
        grid.set(2, 2, Cell::Alive);
        grid.apply_seam();

        assert_eq!(grid.to_rows(), vec![vec![0, 1, 0], vec![1, 0, 1], vec![0, 1, 0]]);
        assert!(grid.has_seam());
    }

    #[test]
    fn test_bits_validation() {
        assert!(matches!(
            Grid::from_bits(2, 2, &[0, 1, 0]),
            Err(CoreError::RowLength { expected: 4, found: 3 })
        ));
        assert!(matches!(
            Grid::from_bits(1, 2, &[0, 2]),
            Err(CoreError::InvalidCell(2))
        ));
        assert!(Grid::from_rows(&[vec![0, 1], vec![1]]).is_err());

        let grid = Grid::from_rows(&[vec![0, 1], vec![1, 1]]).unwrap();
        assert_eq!(grid.population(), 3);
        assert_eq!(grid.to_bits(), vec![0, 1, 1, 1]);
    }

    #[test]
    fn test_set_row_bits() {
        let mut grid = Grid::new(2, 3).unwrap();
        grid.set_row_bits(1, &[1, 0, 1]).unwrap();
        assert_eq!(grid.row_bits(1), vec![1, 0, 1]);
        assert!(grid.set_row_bits(0, &[1]).is_err());
    }

    #[test]
    fn test_display() {
        let grid = Grid::from_rows(&[vec![1, 0], vec![0, 1]]).unwrap();
        assert_eq!(grid.to_string(), "#.\n.#\n");
    }
}

//! Row-band decomposition of a global grid.
//!
//! ```text
//!  global grid (R rows)          band r (R/P + 2 rows)
//!  ┌──────────────┐              ┌──────────────┐
//!  │   rank 0     │   row 0      │ lower ghost  │ ← last owned row of rank r-1
//!  ├──────────────┤   1..=R/P    │ owned rows   │
//!  │   rank 1     │   R/P + 1    │ upper ghost  │ ← first owned row of rank r+1
//!  ├──────────────┤              └──────────────┘
//!  │     ...      │
//!  └──────────────┘
//! ```

use crate::error::CoreError;
use crate::grid::{Cell, Grid};
use crate::rules;

/// A worker's slice of the global grid, padded with one ghost row above and
/// below.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Band {
    rank: usize,
    owned_rows: usize,
    padded: Grid,
}

impl Band {
    /// Wraps `owned` rows with dead ghost rows.
    pub fn new(rank: usize, owned: &Grid) -> Self {
        let mut padded = Grid::dead(owned.rows() + 2, owned.cols());
        let cols = owned.cols();
        padded.cells_mut()[cols..cols * (owned.rows() + 1)].copy_from_slice(owned.cells());
        Self {
            rank,
            owned_rows: owned.rows(),
            padded,
        }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    /// Number of rows this band owns (excluding ghosts).
    pub fn owned_rows(&self) -> usize {
        self.owned_rows
    }

    pub fn cols(&self) -> usize {
        self.padded.cols()
    }

    /// The full padded band, ghost rows included.
    pub fn padded(&self) -> &Grid {
        &self.padded
    }

    pub fn first_owned_row(&self) -> &[Cell] {
        self.padded.row(1)
    }

    pub fn last_owned_row(&self) -> &[Cell] {
        self.padded.row(self.owned_rows)
    }

    /// Row 0: mirrors the down neighbour's last owned row.
    pub fn lower_ghost(&self) -> &[Cell] {
        self.padded.row(0)
    }

    /// Row R/P + 1: mirrors the up neighbour's first owned row.
    pub fn upper_ghost(&self) -> &[Cell] {
        self.padded.row(self.owned_rows + 1)
    }

    pub fn set_lower_ghost(&mut self, bits: &[u8]) -> Result<(), CoreError> {
        self.padded.set_row_bits(0, bits)
    }

    pub fn set_upper_ghost(&mut self, bits: &[u8]) -> Result<(), CoreError> {
        self.padded.set_row_bits(self.owned_rows + 1, bits)
    }

    /// Advances the owned rows by one generation, reading the ghost rows as
    /// neighbours. The returned band's ghost rows are dead until the next
    /// halo exchange refreshes them.
    pub fn step(&self) -> Band {
        Band {
            rank: self.rank,
            owned_rows: self.owned_rows,
            padded: rules::step_rows(&self.padded, 1..self.owned_rows + 1),
        }
    }

    /// Copies the owned rows into a new grid.
    pub fn owned(&self) -> Grid {
        self.padded.slice_rows(1, self.owned_rows + 1)
    }
}

/// Splits `global` into `workers` contiguous bands in rank order.
pub fn scatter(global: &Grid, workers: usize) -> Result<Vec<Band>, CoreError> {
    if workers == 0 {
        return Err(CoreError::NoWorkers);
    }
    if global.rows() % workers != 0 {
        return Err(CoreError::IndivisibleGrid {
            rows: global.rows(),
            workers,
        });
    }

    let per_band = global.rows() / workers;
    Ok((0..workers)
        .map(|rank| {
            let owned = global.slice_rows(rank * per_band, (rank + 1) * per_band);
            Band::new(rank, &owned)
        })
        .collect())
}

/// Reassembles the owned rows of `bands` (in rank order) into a freshly
/// allocated grid.
pub fn gather(bands: &[Band]) -> Result<Grid, CoreError> {
    assemble(bands.iter().map(Band::owned).collect())
}

/// Stacks grids of equal width top to bottom.
pub fn assemble(parts: Vec<Grid>) -> Result<Grid, CoreError> {
    let cols = parts.first().map(Grid::cols).ok_or(CoreError::NoWorkers)?;
    let rows = parts.iter().map(Grid::rows).sum();

    let mut cells = Vec::with_capacity(rows * cols);
    for part in &parts {
        if part.cols() != cols {
            return Err(CoreError::RowLength {
                expected: cols,
                found: part.cols(),
            });
        }
        cells.extend_from_slice(part.cells());
    }

    let mut grid = Grid::dead(rows, cols);
    grid.cells_mut().copy_from_slice(&cells);
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Shape;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_scatter_32_by_4() {
        let grid = Grid::initialize(32, "cross").unwrap();
        let bands = scatter(&grid, 4).unwrap();

        assert_eq!(bands.len(), 4);
        for (rank, band) in bands.iter().enumerate() {
            assert_eq!(band.rank(), rank);
            assert_eq!(band.owned_rows(), 8);
            assert_eq!(band.padded().rows(), 10);
            assert_eq!(band.cols(), 32);
            assert!(band.lower_ghost().iter().all(|c| !c.is_alive()));
            assert!(band.upper_ghost().iter().all(|c| !c.is_alive()));
        }
        assert_eq!(bands[1].first_owned_row(), grid.row(8));
        assert_eq!(bands[3].last_owned_row(), grid.row(31));
    }

    #[test]
    fn test_scatter_rejects_indivisible() {
        let grid = Grid::new(32, 32).unwrap();
        assert!(matches!(
            scatter(&grid, 3),
            Err(CoreError::IndivisibleGrid { rows: 32, workers: 3 })
        ));
        assert!(matches!(scatter(&grid, 0), Err(CoreError::NoWorkers)));
    }

    #[test]
    fn test_gather_rejects_empty() {
        assert!(matches!(gather(&[]), Err(CoreError::NoWorkers)));
    }

    #[test]
    fn test_assemble_rejects_mismatched_widths() {
        let parts = vec![Grid::new(2, 4).unwrap(), Grid::new(2, 3).unwrap()];
        assert!(matches!(
            assemble(parts),
            Err(CoreError::RowLength { expected: 4, found: 3 })
        ));
    }

    #[test]
    fn test_ghost_rows() {
        let grid = Grid::new(4, 3).unwrap();
        let mut band = scatter(&grid, 2).unwrap().remove(0);
        band.set_lower_ghost(&[1, 0, 1]).unwrap();
        band.set_upper_ghost(&[0, 1, 0]).unwrap();

        assert_eq!(band.padded().row_bits(0), vec![1, 0, 1]);
        assert_eq!(band.padded().row_bits(3), vec![0, 1, 0]);
        assert!(band.set_upper_ghost(&[1, 1]).is_err());
        // Ghosts are not part of the owned rows.
        assert_eq!(band.owned().population(), 0);
    }

    #[test]
    fn test_step_reads_ghosts_and_clears_them() {
        let grid = Grid::from_rows(&[vec![0, 0, 0]]).unwrap();
        let mut band = Band::new(0, &grid);
        band.set_lower_ghost(&[1, 0, 1]).unwrap();
        band.set_upper_ghost(&[0, 1, 0]).unwrap();

        let next = band.step();
        // (1,1) has neighbours (0,0), (0,2), (2,1): born.
        assert_eq!(next.owned().row_bits(0), vec![0, 1, 0]);
        assert!(next.lower_ghost().iter().all(|c| !c.is_alive()));
        assert!(next.upper_ghost().iter().all(|c| !c.is_alive()));
        // The source band is untouched.
        assert_eq!(band.padded().row_bits(0), vec![1, 0, 1]);
    }

    proptest! {
        #[test]
        fn prop_scatter_gather_round_trip(
            seed in any::<u64>(),
            per_band in 1usize..6,
            workers in 1usize..6,
            cols in 1usize..10,
        ) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let rows = per_band * workers;
            let square = Grid::initialize_with(rows.max(cols), Shape::Random, &mut rng).unwrap();
            let grid = Grid::from_rows(
                &square.to_rows()[..rows]
                    .iter()
                    .map(|r| r[..cols].to_vec())
                    .collect::<Vec<_>>(),
            )
            .unwrap();

            let bands = scatter(&grid, workers).unwrap();
            prop_assert_eq!(bands.len(), workers);
            prop_assert_eq!(gather(&bands).unwrap(), grid);
        }
    }
}

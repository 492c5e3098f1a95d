//! BandWorker - one cooperating worker of a distributed run.
//!
//! A worker exclusively owns its band and one transport endpoint. Per
//! generation it refreshes its ghost rows, advances its owned rows and, on
//! frame generations, contributes them to the gather collective. The root
//! worker forwards each assembled grid to the coordinator.

use crate::config::FrameCadence;
use crate::error::SimError;
use crate::halo;
use life_core::{assemble, Band, Grid};
use life_env::{BandSnapshot, HaloTransport, Rank};
use tokio::sync::mpsc;
use tracing::debug;

/// A gathered global grid on its way to the frame sink.
#[derive(Debug, Clone)]
pub struct Frame {
    pub generation: u64,
    pub grid: Grid,
}

/// Summary of a finished worker.
#[derive(Debug, Clone)]
pub struct WorkerReport {
    pub rank: Rank,

    /// Generations computed
    pub generations: u64,

    /// Live cells in the owned rows at the end of the run
    pub population: usize,
}

/// A worker running in the distributed environment.
pub struct BandWorker<T: HaloTransport> {
    transport: T,
    band: Band,

    /// Root only: channel to the coordinator
    frames: Option<mpsc::Sender<Frame>>,

    cadence: FrameCadence,
}

impl<T: HaloTransport> BandWorker<T> {
    /// Creates a worker.
    ///
    /// # Arguments
    /// * `transport` - Endpoint whose rank matches `band`
    /// * `band` - The worker's slice of the initial grid
    /// * `frames` - Sender for assembled grids (used on the root only)
    /// * `cadence` - Generations to compute and which of them to gather
    pub fn new(
        transport: T,
        band: Band,
        frames: Option<mpsc::Sender<Frame>>,
        cadence: FrameCadence,
    ) -> Self {
        Self {
            transport,
            band,
            frames,
            cadence,
        }
    }

    pub fn rank(&self) -> Rank {
        self.transport.topology().rank
    }

    /// Runs every generation, consuming the worker.
    pub async fn run(mut self) -> Result<WorkerReport, SimError> {
        let iterations = self.cadence.iterations();
        for generation in 0..iterations {
            halo::exchange(&self.transport, &mut self.band, generation).await?;
            self.band = self.band.step();

            if self.cadence.is_frame(generation) {
                self.contribute(generation).await?;
            }
        }

        debug!("{} finished {} generations", self.rank(), iterations);
        Ok(WorkerReport {
            rank: self.rank(),
            generations: iterations,
            population: self.band.owned().population(),
        })
    }

    /// Hands the owned rows to the gather collective; on the root, assembles
    /// the global grid and forwards it.
    async fn contribute(&self, generation: u64) -> Result<(), SimError> {
        let owned = self.band.owned();
        let cols = owned.cols();
        let snapshot = BandSnapshot::new(self.rank(), generation, owned.rows(), owned.to_bits());

        let Some(parts) = self.transport.gather(snapshot).await? else {
            return Ok(());
        };

        let grids = parts
            .into_iter()
            .map(|part| Grid::from_bits(part.rows, cols, &part.cells))
            .collect::<Result<Vec<_>, _>>()?;
        let grid = assemble(grids)?;

        if let Some(frames) = &self.frames {
            frames
                .send(Frame { generation, grid })
                .await
                .map_err(|_| SimError::FramesClosed(generation))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use life_core::{scatter, update};
    use life_env::channel_mesh;

    #[tokio::test]
    async fn test_single_worker_matches_edge_clamped_step() {
        let grid = Grid::from_rows(&[
            vec![0, 0, 0, 0, 0],
            vec![0, 0, 1, 0, 0],
            vec![0, 0, 1, 0, 0],
            vec![0, 0, 1, 0, 0],
            vec![0, 0, 0, 0, 0],
        ])
        .unwrap();
        let band = scatter(&grid, 1).unwrap().remove(0);
        let transport = channel_mesh(1).remove(0);
        let (tx, mut rx) = mpsc::channel(8);

        let worker = BandWorker::new(transport, band, Some(tx), FrameCadence::new(1, 2).unwrap());
        let report = worker.run().await.unwrap();
        assert_eq!(report.rank, Rank(0));
        assert_eq!(report.generations, 2);
        assert_eq!(report.population, 3);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.generation, 0);
        assert_eq!(first.grid, life_core::step(&grid));
        let second = rx.recv().await.unwrap();
        assert_eq!(second.grid, grid);
        assert_eq!(update(&second.grid), first.grid);
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_gathers_only_on_cadence() {
        let grid = Grid::initialize(8, "cross").unwrap();
        let band = scatter(&grid, 1).unwrap().remove(0);
        let transport = channel_mesh(1).remove(0);
        let (tx, mut rx) = mpsc::channel(8);

        let cadence = FrameCadence::new(2, 5).unwrap();
        BandWorker::new(transport, band, Some(tx), cadence).run().await.unwrap();

        let mut generations = Vec::new();
        while let Some(frame) = rx.recv().await {
            generations.push(frame.generation);
        }
        assert_eq!(generations, vec![0, 2, 4]);
    }

    #[tokio::test]
    async fn test_closed_frame_channel_fails_root() {
        let grid = Grid::new(2, 2).unwrap();
        let band = scatter(&grid, 1).unwrap().remove(0);
        let transport = channel_mesh(1).remove(0);
        let (tx, rx) = mpsc::channel(1);
        drop(rx);

        let err = BandWorker::new(transport, band, Some(tx), FrameCadence::new(1, 1).unwrap())
            .run()
            .await
            .unwrap_err();
        assert!(matches!(err, SimError::FramesClosed(0)));
    }
}

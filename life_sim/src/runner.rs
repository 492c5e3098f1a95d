//! Distributed runner - scatters a board over band workers and collects
//! the frames they gather.

use crate::config::DistributedConfig;
use crate::error::SimError;
use crate::exporter::{FrameSink, GenerationStats};
use crate::worker::{BandWorker, Frame, WorkerReport};

use life_core::{scatter, Grid};
use life_env::{channel_mesh, HaloTransport};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Frames buffered between the root worker and the coordinator.
const FRAME_CHANNEL_DEPTH: usize = 16;

/// Outcome of a completed run (either mode).
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Generations computed
    pub generations: u64,

    /// Board after the last generation
    pub final_grid: Grid,

    /// Population of every delivered generation
    pub history: Vec<GenerationStats>,

    /// Per-worker reports, in rank order (empty for single-process runs)
    pub workers: Vec<WorkerReport>,
}

/// Runs the band-distributed simulation on the tokio runtime.
pub struct DistributedRunner {
    config: DistributedConfig,
}

impl DistributedRunner {
    pub fn new(config: DistributedConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DistributedConfig {
        &self.config
    }

    /// Runs every generation from `initial`, handing each gathered grid to
    /// `sink`.
    pub async fn run(&self, initial: &Grid, sink: &mut dyn FrameSink) -> Result<RunSummary, SimError> {
        self.config.validate()?;
        let cadence = self.config.cadence()?;
        let workers = self.config.workers;
        let bands = scatter(initial, workers)?;

        info!(
            "Starting distributed run: {}x{} board, {} workers, {} generations",
            initial.rows(),
            initial.cols(),
            workers,
            self.config.iterations
        );

        let (tx, mut rx) = mpsc::channel::<Frame>(FRAME_CHANNEL_DEPTH);
        let handles: Vec<_> = bands
            .into_iter()
            .zip(channel_mesh(workers))
            .map(|(band, transport)| {
                let frames = transport.topology().rank.is_root().then(|| tx.clone());
                let worker = BandWorker::new(transport, band, frames, cadence);
                tokio::spawn(worker.run())
            })
            .collect();
        // Only the root's sender keeps the channel open.
        drop(tx);

        let mut history = Vec::new();
        let mut last: Option<Frame> = None;
        while let Some(frame) = rx.recv().await {
            debug!("Frame for generation {} received", frame.generation);
            sink.frame(frame.generation, &frame.grid)?;
            history.push(GenerationStats {
                generation: frame.generation,
                population: frame.grid.population(),
            });
            last = Some(frame);
        }

        let mut reports = Vec::with_capacity(workers);
        let mut failure = None;
        for handle in handles {
            match handle.await {
                Ok(Ok(report)) => reports.push(report),
                Ok(Err(e)) => {
                    warn!("Worker failed: {}", e);
                    failure.get_or_insert(e);
                }
                Err(e) => {
                    failure.get_or_insert(SimError::Worker(e.to_string()));
                }
            }
        }
        if let Some(e) = failure {
            return Err(e);
        }

        let final_grid = last.ok_or(SimError::NoFrames)?.grid;
        info!(
            "Distributed run finished: {} generations, final population {}",
            self.config.iterations,
            final_grid.population()
        );

        Ok(RunSummary {
            generations: self.config.iterations,
            final_grid,
            history,
            workers: reports,
        })
    }
}

//! Run parameters for both modes.

use crate::error::SimError;
use life_core::{pbm, CoreError, Grid, Shape};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::path::PathBuf;

/// How the initial board is produced.
#[derive(Debug, Clone, Serialize)]
pub struct BoardConfig {
    /// Side length of the square board
    pub dimension: usize,

    /// Initial shape
    pub shape: Shape,

    /// Seed for the `random` shape (None = thread entropy)
    pub seed: Option<u64>,

    /// Start from a saved PBM snapshot instead of a shape
    pub load: Option<PathBuf>,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            dimension: 32,
            shape: Shape::Cross,
            seed: None,
            load: None,
        }
    }
}

impl BoardConfig {
    /// Builds the initial grid.
    pub fn build(&self) -> Result<Grid, SimError> {
        if let Some(path) = &self.load {
            return Ok(pbm::load(path)?.grid);
        }
        let grid = match self.seed {
            Some(seed) => {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                Grid::initialize_with(self.dimension, self.shape, &mut rng)?
            }
            None => Grid::initialize_with(self.dimension, self.shape, &mut rand::thread_rng())?,
        };
        Ok(grid)
    }
}

/// Configuration for a single-process run.
#[derive(Debug, Clone, Serialize)]
pub struct SerialConfig {
    pub board: BoardConfig,

    /// Number of generations
    pub iterations: u64,

    /// Persist the board every N generations
    pub checkpoint_interval: u64,

    /// Render the board while running
    pub visualise: bool,

    /// Render every N generations when visualising
    pub render_interval: u64,

    /// Directory for checkpoint files
    pub output_dir: PathBuf,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            iterations: 500,
            checkpoint_interval: 100,
            visualise: false,
            render_interval: 1,
            output_dir: PathBuf::from("."),
        }
    }
}

impl SerialConfig {
    pub fn with_board(mut self, board: BoardConfig) -> Self {
        self.board = board;
        self
    }

    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_checkpoint_interval(mut self, interval: u64) -> Self {
        self.checkpoint_interval = interval;
        self
    }

    pub fn with_visualise(mut self, visualise: bool) -> Self {
        self.visualise = visualise;
        self
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Rejects parameters that cannot produce a run.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.iterations == 0 {
            return Err(SimError::config("iterations must be at least 1"));
        }
        if self.checkpoint_interval == 0 {
            return Err(SimError::config("checkpoint interval must be at least 1"));
        }
        if self.render_interval == 0 {
            return Err(SimError::config("render interval must be at least 1"));
        }
        Ok(())
    }
}

/// Which generations of a distributed run are gathered: every `interval`
/// generations, plus the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameCadence {
    interval: u64,
    iterations: u64,
}

impl FrameCadence {
    pub fn new(interval: u64, iterations: u64) -> Result<Self, SimError> {
        if interval == 0 {
            return Err(SimError::config("frame interval must be at least 1"));
        }
        Ok(Self { interval, iterations })
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Whether `generation` is delivered to the frame sink.
    pub fn is_frame(&self, generation: u64) -> bool {
        generation % self.interval == 0 || generation + 1 == self.iterations
    }
}

/// Configuration for a band-distributed run.
#[derive(Debug, Clone, Serialize)]
pub struct DistributedConfig {
    pub board: BoardConfig,

    /// Number of band workers; must divide the board's row count
    pub workers: usize,

    /// Number of generations
    pub iterations: u64,

    /// Gather and render every N generations (the last generation is
    /// always gathered)
    pub frame_interval: u64,

    /// Directory for frame images
    pub frames_dir: PathBuf,

    /// Assemble frames into an animated GIF after the run
    pub animate: bool,
}

impl Default for DistributedConfig {
    fn default() -> Self {
        Self {
            board: BoardConfig::default(),
            workers: 4,
            iterations: 30,
            frame_interval: 1,
            frames_dir: PathBuf::from("."),
            animate: true,
        }
    }
}

impl DistributedConfig {
    pub fn with_board(mut self, board: BoardConfig) -> Self {
        self.board = board;
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_iterations(mut self, iterations: u64) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_frame_interval(mut self, interval: u64) -> Self {
        self.frame_interval = interval;
        self
    }

    pub fn with_frames_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.frames_dir = dir.into();
        self
    }

    pub fn with_animate(mut self, animate: bool) -> Self {
        self.animate = animate;
        self
    }

    /// Gather cadence for the workers.
    pub fn cadence(&self) -> Result<FrameCadence, SimError> {
        FrameCadence::new(self.frame_interval, self.iterations)
    }

    /// Rejects parameters that cannot produce a run. A shaped board whose
    /// dimension does not split evenly fails here, before any worker starts.
    pub fn validate(&self) -> Result<(), SimError> {
        if self.workers == 0 {
            return Err(CoreError::NoWorkers.into());
        }
        if self.iterations == 0 {
            return Err(SimError::config("iterations must be at least 1"));
        }
        self.cadence()?;
        if self.board.load.is_none() && self.board.dimension % self.workers != 0 {
            return Err(CoreError::IndivisibleGrid {
                rows: self.board.dimension,
                workers: self.workers,
            }
            .into());
        }
        Ok(())
    }
}

//! Output collaborators: frame sinks, checkpoints and the JSON run export.
//!
//! Runners hand every rendered generation to a `FrameSink`; the sinks here
//! write PBM images, draw the board in the terminal, or do nothing.

use crate::error::SimError;
use crate::runner::RunSummary;
use life_core::{pbm, Grid};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Receives assembled grids from a runner.
pub trait FrameSink {
    /// Called with the board after `generation` has been computed.
    fn frame(&mut self, generation: u64, grid: &Grid) -> Result<(), SimError>;
}

/// Discards every frame.
#[derive(Debug, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn frame(&mut self, _generation: u64, _grid: &Grid) -> Result<(), SimError> {
        Ok(())
    }
}

/// Live visualization: draws each frame as text.
pub struct TerminalRenderer<W: Write> {
    out: W,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self { out: io::stdout() }
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> FrameSink for TerminalRenderer<W> {
    fn frame(&mut self, generation: u64, grid: &Grid) -> Result<(), SimError> {
        writeln!(self.out, "Generation {}", generation)?;
        write!(self.out, "{}", grid)?;
        self.out.flush()?;
        Ok(())
    }
}

/// Writes one PBM image per frame, `<prefix>-<generation:03>.pbm`.
pub struct FrameExporter {
    dir: PathBuf,
    prefix: String,
    written: Vec<PathBuf>,
}

impl FrameExporter {
    /// Creates the exporter, creating `dir` if needed.
    pub fn new(dir: impl Into<PathBuf>, prefix: &str) -> Result<Self, SimError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            prefix: prefix.to_string(),
            written: Vec::new(),
        })
    }

    /// Frame files written so far, in generation order.
    pub fn frames(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FrameSink for FrameExporter {
    fn frame(&mut self, generation: u64, grid: &Grid) -> Result<(), SimError> {
        let path = self
            .dir
            .join(format!("{}-{:03}.pbm", self.prefix, generation));
        pbm::save(&path, grid, generation)?;
        self.written.push(path);
        Ok(())
    }
}

/// Persists the raw board every `interval` generations as
/// `board-<generation:04>.pbm`.
pub struct CheckpointWriter {
    dir: PathBuf,
    interval: u64,
    written: Vec<PathBuf>,
}

impl CheckpointWriter {
    pub fn new(dir: impl Into<PathBuf>, interval: u64) -> Result<Self, SimError> {
        if interval == 0 {
            return Err(SimError::config("checkpoint interval must be at least 1"));
        }
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            interval,
            written: Vec::new(),
        })
    }

    /// Saves `grid` if `generation` falls on the checkpoint cadence.
    pub fn maybe_save(&mut self, generation: u64, grid: &Grid) -> Result<Option<&Path>, SimError> {
        if generation % self.interval != 0 {
            return Ok(None);
        }
        let path = self.dir.join(format!("board-{:04}.pbm", generation));
        pbm::save(&path, grid, generation)?;
        info!("Checkpoint: generation {} -> {}", generation, path.display());
        self.written.push(path);
        Ok(self.written.last().map(PathBuf::as_path))
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }
}

/// Population of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u64,
    pub population: usize,
}

/// Complete run export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunExport {
    /// "serial" or "distributed"
    pub mode: String,

    /// Run parameters as given
    pub parameters: serde_json::Value,

    /// Per-generation populations
    pub history: Vec<GenerationStats>,

    /// Final board, dense row-major 0/1
    pub final_grid: Vec<Vec<u8>>,

    /// Files written during the run
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub files: Vec<PathBuf>,
}

impl RunExport {
    /// Creates a new export container.
    pub fn new<P: Serialize>(mode: &str, parameters: &P) -> Result<Self, SimError> {
        Ok(Self {
            mode: mode.to_string(),
            parameters: serde_json::to_value(parameters)?,
            history: Vec::new(),
            final_grid: Vec::new(),
            files: Vec::new(),
        })
    }

    /// Fills in the history and final board of a finished run.
    pub fn finalize(&mut self, summary: &RunSummary, files: &[PathBuf]) {
        self.history = summary.history.clone();
        self.final_grid = summary.final_grid.to_rows();
        self.files = files.to_vec();
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &Path) -> Result<(), SimError> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

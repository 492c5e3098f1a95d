//! Single-process runner.

use crate::config::SerialConfig;
use crate::error::SimError;
use crate::exporter::{CheckpointWriter, FrameSink, GenerationStats};
use crate::runner::RunSummary;

use life_core::{update, Grid};
use std::path::PathBuf;
use tracing::{debug, info};

/// Runs `update` on one board for the configured number of generations.
pub struct SerialRunner {
    config: SerialConfig,
}

impl SerialRunner {
    pub fn new(config: SerialConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SerialConfig {
        &self.config
    }

    /// Runs every generation from `initial`.
    ///
    /// Generation `g` is the board after `g + 1` updates. It is checkpointed
    /// when `g` falls on the checkpoint interval and handed to `sink` when
    /// visualisation is on and `g` falls on the render interval.
    ///
    /// Returns the summary and the checkpoint files written.
    pub fn run(
        &self,
        initial: Grid,
        sink: &mut dyn FrameSink,
    ) -> Result<(RunSummary, Vec<PathBuf>), SimError> {
        self.config.validate()?;
        let mut checkpoints =
            CheckpointWriter::new(&self.config.output_dir, self.config.checkpoint_interval)?;

        info!(
            "Starting serial run: {}x{} board, {} generations",
            initial.rows(),
            initial.cols(),
            self.config.iterations
        );

        let mut grid = initial;
        let mut history = Vec::new();
        for generation in 0..self.config.iterations {
            grid = update(&grid);
            checkpoints.maybe_save(generation, &grid)?;

            if self.config.visualise && generation % self.config.render_interval == 0 {
                sink.frame(generation, &grid)?;
            }

            let population = grid.population();
            debug!("Generation {}: population {}", generation, population);
            history.push(GenerationStats { generation, population });
        }

        info!(
            "Serial run finished: {} generations, final population {}",
            self.config.iterations,
            grid.population()
        );

        let summary = RunSummary {
            generations: self.config.iterations,
            final_grid: grid,
            history,
            workers: Vec::new(),
        };
        Ok((summary, checkpoints.into_written()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exporter::{NullSink, TerminalRenderer};
    use life_core::pbm;

    fn blinker() -> Grid {
        let mut rows = vec![vec![0u8; 8]; 8];
        rows[3][2] = 1;
        rows[3][3] = 1;
        rows[3][4] = 1;
        Grid::from_rows(&rows).unwrap()
    }

    #[test]
    fn test_checkpoints_follow_interval() {
        let dir = tempfile::tempdir().unwrap();
        let config = SerialConfig::default()
            .with_iterations(7)
            .with_checkpoint_interval(3)
            .with_output_dir(dir.path());

        let (summary, files) = SerialRunner::new(config).run(blinker(), &mut NullSink).unwrap();

        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["board-0000.pbm", "board-0003.pbm", "board-0006.pbm"]);

        // Checkpoint 3 holds the board after four updates.
        let snapshot = pbm::load(&files[1]).unwrap();
        assert_eq!(snapshot.generation, 3);
        assert_eq!(snapshot.grid, blinker());
        assert_eq!(summary.history.len(), 7);
        assert!(summary.history.iter().all(|s| s.population == 3));
    }

    #[test]
    fn test_visualise_renders_on_interval() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = SerialConfig::default()
            .with_iterations(4)
            .with_visualise(true)
            .with_output_dir(dir.path());
        config.render_interval = 2;

        let mut renderer = TerminalRenderer::new(Vec::new());
        SerialRunner::new(config).run(blinker(), &mut renderer).unwrap();

        let text = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(text.contains("Generation 0\n"));
        assert!(text.contains("Generation 2\n"));
        assert!(!text.contains("Generation 1\n"));
    }

    /// Stops the run at the first rendered frame.
    struct StopAfterFirst;

    impl FrameSink for StopAfterFirst {
        fn frame(&mut self, _generation: u64, _grid: &Grid) -> Result<(), SimError> {
            Err(SimError::config("stopped"))
        }
    }

    #[test]
    fn test_huge_iteration_count_starts_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let config = SerialConfig::default()
            .with_iterations(1 << 40)
            .with_visualise(true)
            .with_output_dir(dir.path());

        let result = SerialRunner::new(config).run(blinker(), &mut StopAfterFirst);
        assert!(matches!(result, Err(SimError::InvalidConfig(msg)) if msg == "stopped"));
        assert!(dir.path().join("board-0000.pbm").exists());
    }

    #[test]
    fn test_rejects_zero_iterations() {
        let dir = tempfile::tempdir().unwrap();
        let config = SerialConfig::default()
            .with_iterations(0)
            .with_output_dir(dir.path());
        assert!(matches!(
            SerialRunner::new(config).run(blinker(), &mut NullSink),
            Err(SimError::InvalidConfig(_))
        ));
    }
}

//! Halo Life CLI
//!
//! Run Conway's Game of Life on one board or across band workers.

use clap::{Parser, Subcommand};
use life_core::Shape;
use life_sim::{
    AnimationAssembler, AnimationOutcome, BoardConfig, DistributedConfig, DistributedRunner,
    FrameExporter, FrameSink, NullSink, RunExport, SerialConfig, SerialRunner, SimError,
    TerminalRenderer, VerifyingSink,
};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Initial board options shared by every mode.
#[derive(clap::Args, Debug)]
struct BoardArgs {
    /// Side length of the square board
    #[arg(short, long, default_value = "32")]
    dimension: usize,

    /// Initial shape (cross, random)
    #[arg(short, long, default_value = "cross")]
    shape: String,

    /// Seed for the random shape (omit for fresh entropy)
    #[arg(long)]
    seed: Option<u64>,
}

impl BoardArgs {
    fn into_config(self, load: Option<PathBuf>) -> Result<BoardConfig, SimError> {
        Ok(BoardConfig {
            dimension: self.dimension,
            shape: self.shape.parse::<Shape>()?,
            seed: self.seed,
            load,
        })
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Single-process run with periodic checkpoints
    Serial {
        #[command(flatten)]
        board: BoardArgs,

        /// Number of generations
        #[arg(short, long, default_value = "500")]
        iterations: u64,

        /// Save the board every N generations
        #[arg(short, long, default_value = "100")]
        checkpoint: u64,

        /// Draw the board in the terminal while running
        #[arg(long)]
        visualise: bool,

        /// Start from a saved PBM board instead of a shape
        #[arg(long)]
        load: Option<PathBuf>,

        /// Directory for checkpoint files
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Band-distributed run with one frame image per generation
    Distributed {
        #[command(flatten)]
        board: BoardArgs,

        /// Number of band workers (must divide the dimension)
        #[arg(short, long, default_value = "4")]
        workers: usize,

        /// Number of generations
        #[arg(short, long, default_value = "30")]
        iterations: u64,

        /// Write a frame every N generations
        #[arg(long, default_value = "1")]
        frame_interval: u64,

        /// Directory for frame images
        #[arg(short, long, default_value = ".")]
        frames: PathBuf,

        /// Keep the frames instead of assembling output.gif
        #[arg(long)]
        no_animate: bool,
    },

    /// Run distributed and check every frame against the single-process rules
    Verify {
        #[command(flatten)]
        board: BoardArgs,

        /// Number of band workers (must divide the dimension)
        #[arg(short, long, default_value = "4")]
        workers: usize,

        /// Number of generations
        #[arg(short, long, default_value = "8")]
        iterations: u64,
    },
}

/// Halo Life: Conway's Game of Life, serial or band-distributed
#[derive(Parser, Debug)]
#[command(name = "life-sim")]
#[command(about = "Run Conway's Game of Life on one board or across band workers", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Write a JSON summary of the run to this file
    #[arg(long, global = true)]
    export: Option<PathBuf>,
}

fn write_export(
    path: &Path,
    mut export: RunExport,
    summary: &life_sim::RunSummary,
    files: &[PathBuf],
) -> Result<(), SimError> {
    export.finalize(summary, files);
    export.write_to_file(path)?;
    info!("Exported {} generations to {}", export.history.len(), path.display());
    Ok(())
}

fn run_serial(
    config: SerialConfig,
    export: Option<&Path>,
) -> Result<(), SimError> {
    config.validate()?;
    let initial = config.board.build()?;
    let mut sink: Box<dyn FrameSink> = if config.visualise {
        Box::new(TerminalRenderer::stdout())
    } else {
        Box::new(NullSink)
    };

    let runner = SerialRunner::new(config);
    let (summary, files) = runner.run(initial, sink.as_mut())?;
    info!("Wrote {} checkpoints", files.len());

    if let Some(path) = export {
        write_export(path, RunExport::new("serial", runner.config())?, &summary, &files)?;
    }
    Ok(())
}

async fn run_distributed(
    config: DistributedConfig,
    export: Option<&Path>,
) -> Result<(), SimError> {
    config.validate()?;
    let initial = config.board.build()?;
    let mut frames = FrameExporter::new(&config.frames_dir, "output")?;

    let runner = DistributedRunner::new(config);
    let summary = runner.run(&initial, &mut frames).await?;
    info!("Wrote {} frames to {}", frames.frames().len(), frames.dir().display());

    let mut files = frames.frames().to_vec();
    if runner.config().animate {
        let output = frames.dir().join("output.gif");
        if let AnimationOutcome::Assembled(path) = AnimationAssembler::default().assemble(&files, &output) {
            files = vec![path];
        }
    }

    if let Some(path) = export {
        write_export(path, RunExport::new("distributed", runner.config())?, &summary, &files)?;
    }
    Ok(())
}

async fn run_verify(
    config: DistributedConfig,
    export: Option<&Path>,
) -> Result<(), SimError> {
    config.validate()?;
    let initial = config.board.build()?;
    let mut sink = VerifyingSink::new(initial.clone());

    let runner = DistributedRunner::new(config);
    let summary = runner.run(&initial, &mut sink).await?;

    if let Some(path) = export {
        write_export(path, RunExport::new("verify", runner.config())?, &summary, &[])?;
    }

    match sink.divergence() {
        None => {
            info!(
                "✓ {} frames match the single-process run ({} cells compared)",
                sink.frames(),
                sink.cells_compared()
            );
            Ok(())
        }
        Some(d) => Err(SimError::Diverged {
            generation: d.generation,
            row: d.row,
            col: d.col,
        }),
    }
}

async fn run(args: Args) -> Result<(), SimError> {
    let export = args.export.as_deref();
    match args.command {
        Command::Serial {
            board,
            iterations,
            checkpoint,
            visualise,
            load,
            output,
        } => {
            let config = SerialConfig::default()
                .with_board(board.into_config(load)?)
                .with_iterations(iterations)
                .with_checkpoint_interval(checkpoint)
                .with_visualise(visualise)
                .with_output_dir(output);
            run_serial(config, export)
        }
        Command::Distributed {
            board,
            workers,
            iterations,
            frame_interval,
            frames,
            no_animate,
        } => {
            let config = DistributedConfig::default()
                .with_board(board.into_config(None)?)
                .with_workers(workers)
                .with_iterations(iterations)
                .with_frame_interval(frame_interval)
                .with_frames_dir(frames)
                .with_animate(!no_animate);
            run_distributed(config, export).await
        }
        Command::Verify {
            board,
            workers,
            iterations,
        } => {
            let config = DistributedConfig::default()
                .with_board(board.into_config(None)?)
                .with_workers(workers)
                .with_iterations(iterations)
                .with_animate(false);
            run_verify(config, export).await
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize logging; RUST_LOG overrides --verbose
    let level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        std::process::exit(1);
    }

    info!("Halo Life v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}

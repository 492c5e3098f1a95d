//! Halo Life runners
//!
//! This crate drives Conway's Game of Life in two modes:
//! - **Serial**: one board, `update` per generation, periodic PBM checkpoints
//! - **Distributed**: the board is cut into row bands, one tokio task per
//!   band, with ghost rows refreshed by halo exchange every generation
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      DistributedRunner                       │
//! │                                                              │
//! │  ┌────────────┐  halo   ┌────────────┐  halo   ┌──────────┐  │
//! │  │ BandWorker │◄───────►│ BandWorker │◄───────►│   ...    │  │
//! │  │  rank 0    │         │  rank 1    │         │ rank P-1 │  │
//! │  └─────▲──────┘         └─────┬──────┘         └────┬─────┘  │
//! │        │        gather        │                     │        │
//! │        └──────────────────────┴─────────────────────┘        │
//! │        │                                                     │
//! │   ┌────▼─────┐    ┌───────────────┐    ┌─────────────────┐   │
//! │   │ Frame    │───►│  FrameSink    │───►│ AnimationAssem- │   │
//! │   │ channel  │    │ (PBM/Oracle)  │    │ bler (convert)  │   │
//! │   └──────────┘    └───────────────┘    └─────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use life_sim::{DistributedConfig, DistributedRunner, NullSink};
//!
//! let config = DistributedConfig::default().with_workers(4);
//! let initial = config.board.build()?;
//! let summary = DistributedRunner::new(config).run(&initial, &mut NullSink).await?;
//! ```

mod animation;
mod config;
mod error;
mod exporter;
mod halo;
mod oracle;
mod runner;
mod serial;
mod worker;

pub use animation::{AnimationAssembler, AnimationOutcome};
pub use config::{BoardConfig, DistributedConfig, FrameCadence, SerialConfig};
pub use error::SimError;
pub use exporter::{
    CheckpointWriter, FrameExporter, FrameSink, GenerationStats, NullSink, RunExport,
    TerminalRenderer,
};
pub use halo::exchange;
pub use oracle::{Divergence, Oracle, VerifyingSink};
pub use runner::{DistributedRunner, RunSummary};
pub use serial::SerialRunner;
pub use worker::{BandWorker, Frame, WorkerReport};

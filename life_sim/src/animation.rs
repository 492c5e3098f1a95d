//! Animated GIF assembly through an external image tool.
//!
//! A missing or failing tool is not an error: the frames stay on disk and
//! the user is told how to animate them by hand.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use tracing::{info, warn};

/// Result of an assembly attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationOutcome {
    /// The animation was written and the frames removed
    Assembled(PathBuf),

    /// The frames were left in place
    FramesKept { reason: String },
}

/// Runs `<program> <frames...> <output>` (ImageMagick `convert` by default).
#[derive(Debug, Clone)]
pub struct AnimationAssembler {
    program: String,
}

impl Default for AnimationAssembler {
    fn default() -> Self {
        Self::new("convert")
    }
}

impl AnimationAssembler {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
        }
    }

    /// Concatenates `frames` (in order) into `output`.
    pub fn assemble(&self, frames: &[PathBuf], output: &Path) -> AnimationOutcome {
        if frames.is_empty() {
            return AnimationOutcome::FramesKept {
                reason: "no frames to assemble".to_string(),
            };
        }

        let status = Command::new(&self.program)
            .args(frames)
            .arg(output)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        let reason = match status {
            Ok(status) if status.success() => {
                for frame in frames {
                    if let Err(e) = fs::remove_file(frame) {
                        warn!("Could not remove frame {}: {}", frame.display(), e);
                    }
                }
                info!("Animation saved as {}", output.display());
                return AnimationOutcome::Assembled(output.to_path_buf());
            }
            Ok(status) => format!("{} exited with {}", self.program, status),
            Err(e) => format!("{} could not be started: {}", self.program, e),
        };

        let pattern = frames[0]
            .parent()
            .map(|dir| dir.join("output-*.pbm"))
            .unwrap_or_else(|| PathBuf::from("output-*.pbm"));
        warn!("Animation not assembled ({})", reason);
        warn!(
            "Image snapshots saved as {}. To animate try e.g.: animate -delay 10 {}",
            pattern.display(),
            pattern.display()
        );
        AnimationOutcome::FramesKept { reason }
    }
}

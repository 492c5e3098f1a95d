//! Error types for the Halo Life communication layer.

use crate::types::{HaloTag, Rank};
use thiserror::Error;

/// Errors that can occur while exchanging rows between workers.
#[derive(Debug, Error)]
pub enum EnvError {
    /// The peer dropped its end of the link (worker exited)
    #[error("Channel to {0} closed")]
    ChannelClosed(Rank),

    /// The transport has no link to the requested rank
    #[error("Unknown peer: {0}")]
    UnknownPeer(Rank),

    /// A halo packet arrived for the wrong generation or direction
    #[error(
        "Out-of-order halo packet from {from}: expected generation {expected_generation} ({expected_tag}), got generation {generation} ({tag})"
    )]
    OutOfOrder {
        from: Rank,
        expected_generation: u64,
        expected_tag: HaloTag,
        generation: u64,
        tag: HaloTag,
    },

    /// The gather collective could not collect every band
    #[error("Gather for generation {0} incomplete: collective channel closed")]
    GatherIncomplete(u64),
}

impl EnvError {
    /// Creates a closed-channel error.
    pub fn closed(rank: Rank) -> Self {
        Self::ChannelClosed(rank)
    }
}

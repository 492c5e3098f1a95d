//! Common types for the Halo Life communication layer.

use crate::error::EnvError;
use serde::{Deserialize, Serialize};

/// Index of a worker among the cooperating band workers.
///
/// Rank 0 owns the first rows of the global grid and is the root of the
/// gather collective.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rank(pub usize);

impl Rank {
    /// The root of every collective operation.
    pub const ROOT: Rank = Rank(0);

    /// Returns true for the collective root.
    pub fn is_root(&self) -> bool {
        *self == Self::ROOT
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rank {}", self.0)
    }
}

/// One side of a band: either a neighbouring worker or the edge of the
/// decomposition, where nothing is sent and nothing is received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Link {
    Peer(Rank),
    Boundary,
}

/// Position of one worker in the row decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// This worker's rank
    pub rank: Rank,

    /// Number of cooperating workers
    pub size: usize,
}

impl Topology {
    /// Creates the topology for `rank` among `size` workers.
    pub fn new(rank: Rank, size: usize) -> Self {
        Self { rank, size }
    }

    /// The next-lower band (rank - 1). Rank 0 has no down neighbour.
    pub fn down(&self) -> Link {
        match self.rank.0.checked_sub(1) {
            Some(r) => Link::Peer(Rank(r)),
            None => Link::Boundary,
        }
    }

    /// The next-higher band (rank + 1). The last rank has no up neighbour.
    pub fn up(&self) -> Link {
        if self.rank.0 + 1 < self.size {
            Link::Peer(Rank(self.rank.0 + 1))
        } else {
            Link::Boundary
        }
    }
}

/// Direction tag of a halo packet.
///
/// `Up` packets travel to rank + 1 and carry the sender's last owned row;
/// `Down` packets travel to rank - 1 and carry the sender's first owned row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaloTag {
    Up,
    Down,
}

impl std::fmt::Display for HaloTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HaloTag::Up => write!(f, "up"),
            HaloTag::Down => write!(f, "down"),
        }
    }
}

/// A boundary row in flight between two neighbouring bands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaloPacket {
    /// Sending worker
    pub from: Rank,

    /// Generation the row belongs to
    pub generation: u64,

    /// Direction of travel
    pub tag: HaloTag,

    /// Row cells, one byte per cell (0 dead, 1 alive)
    pub row: Vec<u8>,
}

impl HaloPacket {
    /// Creates a new packet.
    pub fn new(from: Rank, generation: u64, tag: HaloTag, row: Vec<u8>) -> Self {
        Self {
            from,
            generation,
            tag,
            row,
        }
    }

    /// Checks that the packet is the one the receiver is waiting for.
    pub fn expect(&self, from: Rank, generation: u64, tag: HaloTag) -> Result<(), EnvError> {
        if self.from == from && self.generation == generation && self.tag == tag {
            Ok(())
        } else {
            Err(EnvError::OutOfOrder {
                from: self.from,
                expected_generation: generation,
                expected_tag: tag,
                generation: self.generation,
                tag: self.tag,
            })
        }
    }
}

/// The owned rows of one band, handed to the gather collective.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandSnapshot {
    /// Contributing worker
    pub rank: Rank,

    /// Generation the rows belong to
    pub generation: u64,

    /// Number of owned rows
    pub rows: usize,

    /// Row-major cells of the owned rows
    pub cells: Vec<u8>,
}

impl BandSnapshot {
    /// Creates a snapshot, taking ownership of the cells.
    pub fn new(rank: Rank, generation: u64, rows: usize, cells: Vec<u8>) -> Self {
        Self {
            rank,
            generation,
            rows,
            cells,
        }
    }
}

//! In-process implementation of `HaloTransport` using tokio channels.

use crate::error::EnvError;
use crate::network::HaloTransport;
use crate::types::{BandSnapshot, HaloPacket, Link, Rank, Topology};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::{mpsc, Mutex};

/// Depth of each directed halo link. At most one packet per generation is
/// ever in flight on a link.
const HALO_CHANNEL_DEPTH: usize = 2;

/// Depth of the gather channel into the root.
const GATHER_CHANNEL_DEPTH: usize = 1024;

/// Root-side state of the gather collective.
struct GatherInbox {
    rx: mpsc::Receiver<BandSnapshot>,

    /// Snapshots that arrived ahead of the generation being collected
    pending: BTreeMap<u64, Vec<BandSnapshot>>,
}

/// This worker's role in the gather collective.
enum Collective {
    Root(Mutex<GatherInbox>),
    Member(mpsc::Sender<BandSnapshot>),
}

/// Transport endpoint for one worker of an in-process channel mesh.
pub struct ChannelTransport {
    topology: Topology,

    /// Senders to neighbouring ranks
    outboxes: HashMap<Rank, mpsc::Sender<HaloPacket>>,

    /// Receivers from neighbouring ranks (behind tokio mutex for async)
    inboxes: HashMap<Rank, Mutex<mpsc::Receiver<HaloPacket>>>,

    collective: Collective,
}

impl ChannelTransport {
    fn outbox(&self, rank: Rank) -> Result<&mpsc::Sender<HaloPacket>, EnvError> {
        self.outboxes.get(&rank).ok_or(EnvError::UnknownPeer(rank))
    }

    fn inbox(&self, rank: Rank) -> Result<&Mutex<mpsc::Receiver<HaloPacket>>, EnvError> {
        self.inboxes.get(&rank).ok_or(EnvError::UnknownPeer(rank))
    }

    async fn send_to(&self, dest: Link, packet: HaloPacket) -> Result<(), EnvError> {
        match dest {
            Link::Peer(rank) => self
                .outbox(rank)?
                .send(packet)
                .await
                .map_err(|_| EnvError::closed(rank)),
            Link::Boundary => Ok(()),
        }
    }

    async fn recv_from(&self, source: Link) -> Result<Option<HaloPacket>, EnvError> {
        match source {
            Link::Peer(rank) => {
                let mut rx = self.inbox(rank)?.lock().await;
                rx.recv().await.map(Some).ok_or(EnvError::closed(rank))
            }
            Link::Boundary => Ok(None),
        }
    }
}

/// Builds a fully wired mesh of `size` endpoints, indexed by rank.
///
/// Every rank is linked to rank - 1 and rank + 1 (when they exist) and to
/// the gather root.
pub fn channel_mesh(size: usize) -> Vec<ChannelTransport> {
    let mut outboxes: Vec<HashMap<Rank, mpsc::Sender<HaloPacket>>> =
        (0..size).map(|_| HashMap::new()).collect();
    let mut inboxes: Vec<HashMap<Rank, Mutex<mpsc::Receiver<HaloPacket>>>> =
        (0..size).map(|_| HashMap::new()).collect();

    for lower in 0..size.saturating_sub(1) {
        let upper = lower + 1;

        let (tx, rx) = mpsc::channel(HALO_CHANNEL_DEPTH);
        outboxes[lower].insert(Rank(upper), tx);
        inboxes[upper].insert(Rank(lower), Mutex::new(rx));

        let (tx, rx) = mpsc::channel(HALO_CHANNEL_DEPTH);
        outboxes[upper].insert(Rank(lower), tx);
        inboxes[lower].insert(Rank(upper), Mutex::new(rx));
    }

    let (gather_tx, gather_rx) = mpsc::channel(GATHER_CHANNEL_DEPTH);
    let mut root_inbox = Some(GatherInbox {
        rx: gather_rx,
        pending: BTreeMap::new(),
    });
    let mut collective_for = |rank: Rank| {
        if rank.is_root() {
            if let Some(inbox) = root_inbox.take() {
                return Collective::Root(Mutex::new(inbox));
            }
        }
        Collective::Member(gather_tx.clone())
    };

    outboxes
        .into_iter()
        .zip(inboxes)
        .enumerate()
        .map(|(index, (outboxes, inboxes))| {
            let rank = Rank(index);
            ChannelTransport {
                topology: Topology::new(rank, size),
                outboxes,
                inboxes,
                collective: collective_for(rank),
            }
        })
        .collect()
}

#[async_trait]
impl HaloTransport for ChannelTransport {
    fn topology(&self) -> Topology {
        self.topology
    }

    async fn sendrecv(
        &self,
        dest: Link,
        packet: HaloPacket,
        source: Link,
    ) -> Result<Option<HaloPacket>, EnvError> {
        let ((), received) = tokio::try_join!(self.send_to(dest, packet), self.recv_from(source))?;
        Ok(received)
    }

    async fn gather(&self, snapshot: BandSnapshot) -> Result<Option<Vec<BandSnapshot>>, EnvError> {
        let inbox = match &self.collective {
            Collective::Member(tx) => {
                tx.send(snapshot)
                    .await
                    .map_err(|_| EnvError::closed(Rank::ROOT))?;
                return Ok(None);
            }
            Collective::Root(inbox) => inbox,
        };

        let generation = snapshot.generation;
        let size = self.topology.size;
        let mut guard = inbox.lock().await;
        let GatherInbox { rx, pending } = &mut *guard;

        pending.entry(generation).or_default().push(snapshot);
        while pending.get(&generation).map_or(0, Vec::len) < size {
            let next = rx
                .recv()
                .await
                .ok_or(EnvError::GatherIncomplete(generation))?;
            pending.entry(next.generation).or_default().push(next);
        }

        let mut parts = pending.remove(&generation).unwrap_or_default();
        parts.sort_by_key(|part| part.rank);
        if parts.iter().enumerate().any(|(i, part)| part.rank != Rank(i)) {
            return Err(EnvError::GatherIncomplete(generation));
        }
        Ok(Some(parts))
    }
}

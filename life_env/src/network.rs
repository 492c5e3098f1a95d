//! Transport abstraction between band workers.

use async_trait::async_trait;
use crate::error::EnvError;
use crate::types::{BandSnapshot, HaloPacket, Link, Topology};

/// Abstraction for row exchange between cooperating band workers.
///
/// # Implementations
///
/// - **In-process**: `ChannelTransport` - one bounded tokio channel per directed link
///
/// # Exchange Flow
///
/// ```text
/// rank r                                   rank r+1
///   |-- sendrecv(up, last row, down) -------->|
///   |<-------- sendrecv(down, first row, up) -|
/// ```
///
/// Both halves of a `sendrecv` are in flight at the same time, so two
/// neighbours calling it against each other can never deadlock.
#[async_trait]
pub trait HaloTransport: Send + Sync + 'static {
    /// Returns this worker's place in the decomposition.
    fn topology(&self) -> Topology;

    /// Sends `packet` to `dest` while receiving one packet from `source`.
    ///
    /// # Returns
    /// * `Ok(Some(packet))` - the packet received from a `Link::Peer` source
    /// * `Ok(None)` - `source` was `Link::Boundary`; nothing was awaited
    /// * `Err(EnvError::ChannelClosed)` - the peer went away
    ///
    /// A `Link::Boundary` destination drops the packet without blocking.
    async fn sendrecv(
        &self,
        dest: Link,
        packet: HaloPacket,
        source: Link,
    ) -> Result<Option<HaloPacket>, EnvError>;

    /// Contributes this worker's owned rows to the gather collective.
    ///
    /// # Returns
    /// * `Ok(Some(parts))` - on the root: every band's rows for this
    ///   generation, in rank order
    /// * `Ok(None)` - on every other rank
    ///
    /// # Blocking
    /// The root blocks until all ranks have arrived for the generation.
    async fn gather(&self, snapshot: BandSnapshot) -> Result<Option<Vec<BandSnapshot>>, EnvError>;
}

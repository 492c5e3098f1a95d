//! Halo exchange protocol.
//!
//! Each generation a worker makes two paired exchanges:
//!
//! ```text
//! A: last owned row  ──► up      lower ghost (row 0)      ◄── down
//! B: first owned row ──► down    upper ghost (row R/P+1)  ◄── up
//! ```
//!
//! A `Link::Boundary` side sends nothing and receives nothing, so the first
//! band's lower ghost and the last band's upper ghost stay dead.

use crate::error::SimError;
use life_core::{Band, Cell};
use life_env::{HaloPacket, HaloTag, HaloTransport, Link};
use tracing::debug;

fn bits(row: &[Cell]) -> Vec<u8> {
    row.iter().map(|c| c.bit()).collect()
}

/// Refreshes both ghost rows of `band` for `generation`.
///
/// Returns only once both exchanges have resolved; the band is then ready
/// for `Band::step`.
pub async fn exchange<T: HaloTransport + ?Sized>(
    transport: &T,
    band: &mut Band,
    generation: u64,
) -> Result<(), SimError> {
    let topology = transport.topology();
    let (up, down) = (topology.up(), topology.down());

    // Exchange A: send up, receive from down
    let packet = HaloPacket::new(topology.rank, generation, HaloTag::Up, bits(band.last_owned_row()));
    let received = transport.sendrecv(up, packet, down).await?;
    if let (Some(packet), Link::Peer(from)) = (received, down) {
        packet.expect(from, generation, HaloTag::Up)?;
        band.set_lower_ghost(&packet.row)?;
    }

    // Exchange B: send down, receive from up
    let packet = HaloPacket::new(topology.rank, generation, HaloTag::Down, bits(band.first_owned_row()));
    let received = transport.sendrecv(down, packet, up).await?;
    if let (Some(packet), Link::Peer(from)) = (received, up) {
        packet.expect(from, generation, HaloTag::Down)?;
        band.set_upper_ghost(&packet.row)?;
    }

    debug!("{} exchanged halo for generation {}", topology.rank, generation);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use life_core::{scatter, Grid, Shape};
    use life_env::{channel_mesh, EnvError, Rank};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    async fn exchange_once(grid: &Grid, workers: usize) -> Vec<Band> {
        let bands = scatter(grid, workers).unwrap();
        let handles: Vec<_> = bands
            .into_iter()
            .zip(channel_mesh(workers))
            .map(|(mut band, transport)| {
                tokio::spawn(async move {
                    let result = exchange(&transport, &mut band, 0).await;
                    result.map(|_| band)
                })
            })
            .collect();

        let mut out = Vec::new();
        for handle in handles {
            out.push(handle.await.unwrap().unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_exchange_32_rows_4_workers() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let grid = Grid::initialize_with(32, Shape::Random, &mut rng).unwrap();
        let bands = exchange_once(&grid, 4).await;

        assert_eq!(bands.len(), 4);
        assert!(bands.iter().all(|b| b.padded().rows() == 10));

        // Band 1's lower ghost mirrors band 0's last owned row.
        assert_eq!(bands[1].lower_ghost(), bands[0].last_owned_row());
        assert_eq!(bands[1].lower_ghost(), grid.row(7));

        // Band 0's lower ghost has no neighbour and stays dead.
        assert!(bands[0].lower_ghost().iter().all(|c| !c.is_alive()));
        assert!(bands[3].upper_ghost().iter().all(|c| !c.is_alive()));

        // Interior ghosts mirror their neighbours in both directions.
        for r in 0..3 {
            assert_eq!(bands[r].upper_ghost(), bands[r + 1].first_owned_row());
            assert_eq!(bands[r + 1].lower_ghost(), bands[r].last_owned_row());
        }
    }

    #[tokio::test]
    async fn test_single_worker_exchange_is_a_no_op() {
        let grid = Grid::initialize(8, "cross").unwrap();
        let bands = exchange_once(&grid, 1).await;
        assert!(bands[0].lower_ghost().iter().all(|c| !c.is_alive()));
        assert!(bands[0].upper_ghost().iter().all(|c| !c.is_alive()));
        assert_eq!(bands[0].owned(), grid);
    }

    #[tokio::test]
    async fn test_generation_mismatch_is_rejected() {
        let grid = Grid::new(4, 4).unwrap();
        let mut bands = scatter(&grid, 2).unwrap();
        let mut mesh = channel_mesh(2);
        let upper_transport = mesh.pop().unwrap();
        let lower_transport = mesh.pop().unwrap();
        let mut upper_band = bands.pop().unwrap();
        let mut lower_band = bands.pop().unwrap();

        let lower = tokio::spawn(async move {
            exchange(&lower_transport, &mut lower_band, 0).await
        });
        let upper = tokio::spawn(async move {
            exchange(&upper_transport, &mut upper_band, 5).await
        });

        let err = upper.await.unwrap().unwrap_err();
        assert!(matches!(
            err,
            SimError::Env(EnvError::OutOfOrder { from: Rank(0), generation: 0, .. })
        ));
        // The lower worker loses its partner mid-exchange.
        assert!(lower.await.unwrap().is_err());
    }
}

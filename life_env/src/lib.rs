//! Halo Life Communication Layer
//!
//! This crate provides the transport abstraction used by band workers to
//! exchange ghost rows and to reassemble the global grid.
//!
//! # Core Concept: Paired Exchange
//!
//! Workers never share memory. Per generation each worker:
//! - Exchanges one row with each neighbouring band (`sendrecv`)
//! - Hands its owned rows to the root (`gather`)
//!
//! Neighbours are `Link::Peer(rank)` or `Link::Boundary`; the first and last
//! bands have a boundary on one side and never block on it.
//!
//! # Example
//!
//! ```ignore
//! use life_env::{channel_mesh, HaloTransport, HaloPacket, HaloTag};
//!
//! async fn send_last_row<T: HaloTransport>(net: &T, generation: u64, row: Vec<u8>) {
//!     let topo = net.topology();
//!     let packet = HaloPacket::new(topo.rank, generation, HaloTag::Up, row);
//!     let ghost = net.sendrecv(topo.up(), packet, topo.down()).await;
//! }
//! ```

mod error;
mod network;
mod tokio_impl;
mod types;

pub use error::EnvError;
pub use network::HaloTransport;
pub use tokio_impl::{channel_mesh, ChannelTransport};
pub use types::{BandSnapshot, HaloPacket, HaloTag, Link, Rank, Topology};

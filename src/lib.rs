//! # dgram-tokio — Non-Blocking Datagram Socket Transport
//!
//! A cross-platform packet transport engine built on the tokio reactor:
//! a socket state machine composed with a batched outbound queue, a
//! bounded inbound receive sequence, and an owned address abstraction.
//!
//! ## Features
//!
//! - **Readiness-driven**: the descriptor is non-blocking from creation;
//!   would-block results arm interest and retry on the next edge
//! - **Batched sends**: the whole outbound queue goes out through the
//!   platform's batching primitive (`sendmmsg` where available), in
//!   strict FIFO order across retries
//! - **Bounded receives**: each readable wakeup drains at most a
//!   configured number of datagrams, each into a fresh owned buffer
//! - **Keep-alive by polling**: a host observes the transport's activity
//!   counters instead of being called back
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────┐
//! │  dgram-tokio                          │
//! │                                       │
//! │  SocketTransport         ← user API   │
//! │  actor                   ← event loop │
//! │  OutboundQueue / InboundReader ← I/O  │
//! │  Endpoint / RawAddress   ← addressing │
//! └───────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dgram_tokio::{consts, Endpoint, TransportConfig, TransportEvent};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TransportConfig::new();
//!     let (mut transport, mut events) =
//!         config.open(consts::AF_INET, consts::SOCK_DGRAM, 0).await?;
//!
//!     transport.bind(&Endpoint::new("127.0.0.1", 0)).await?;
//!     transport.resume().await?;
//!     transport
//!         .write(b"ping", Some(&Endpoint::new("127.0.0.1", 9000)))
//!         .await?;
//!
//!     while let Some(event) = events.recv().await {
//!         match event {
//!             TransportEvent::Data { payload, source } => {
//!                 println!("{} bytes from {:?}", payload.len(), source);
//!             }
//!             TransportEvent::Drain => println!("queue drained"),
//!             TransportEvent::Error { message } => eprintln!("{message}"),
//!         }
//!     }
//!
//!     transport.close().await?;
//!     Ok(())
//! }
//! ```

// ── Layer 1: Addressing & constants ─────────────────────────────────────

pub mod addr;
pub mod consts;
pub use addr::{format, infer_family, resolve, AddrFamily, Endpoint, RawAddress};

// ── Layer 2: Configuration & errors ─────────────────────────────────────

pub mod config;
pub mod error;
pub use config::TransportConfig;
pub use error::{AddressError, DgramError, Result};

// ── Layer 3: Batched I/O ────────────────────────────────────────────────

pub mod inbound;
pub mod outbound;
pub use inbound::{Datagram, InboundReader};
pub use outbound::{OutboundQueue, SendStatus};

// ── Layer 4: Transport (actor + handle) ─────────────────────────────────

pub(crate) mod actor;
pub(crate) mod socket;
pub mod transport;
pub use transport::{SocketTransport, TransportEvent};

pub mod metrics;

// ── Version info ────────────────────────────────────────────────────────

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

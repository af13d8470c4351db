//! Public transport handle and event surface.
//!
//! [`SocketTransport`] owns the actor task for one descriptor. Commands
//! travel over a channel with oneshot replies; everything the socket
//! produces comes back on the event receiver returned by
//! [`open`](SocketTransport::open): `Data` per received datagram, `Drain`
//! when the outbound queue empties, `Error` for asynchronous I/O
//! failures.

use crate::actor::{run_transport_actor, TransportCmd};
use crate::addr::Endpoint;
use crate::config::TransportConfig;
use crate::error::{DgramError, Result};
use crate::metrics::{global_metrics, ActivityCounters, ActivitySnapshot};
use crate::socket;

use bytes::Bytes;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Notifications emitted by the transport.
#[derive(Debug)]
pub enum TransportEvent {
    /// One received datagram, with its source endpoint when tracked.
    Data {
        payload: Bytes,
        source: Option<Endpoint>,
    },
    /// The outbound queue became empty.
    Drain,
    /// An asynchronous I/O failure; the transport remains open.
    Error { message: String },
}

// ── SocketTransport ─────────────────────────────────────────────────────

/// Handle to one non-blocking datagram socket driven by the readiness
/// loop.
///
/// Dropping the handle aborts the actor; [`close`](Self::close) shuts it
/// down in an orderly, idempotent way.
pub struct SocketTransport {
    cmd_tx: mpsc::Sender<TransportCmd>,
    counters: Arc<ActivityCounters>,
    task: Option<JoinHandle<()>>,
    closed: bool,
}

impl SocketTransport {
    /// Create the descriptor from raw (domain, type, protocol) integers
    /// (see [`consts`](crate::consts)), register it with the readiness
    /// loop, and spawn the actor.
    ///
    /// Any failure is a synchronous setup error and no transport
    /// survives.
    pub async fn open(
        domain: i32,
        socket_type: i32,
        protocol: i32,
        config: TransportConfig,
    ) -> Result<(Self, mpsc::Receiver<TransportEvent>)> {
        config.validate()?;
        let socket = socket::create(domain, socket_type, protocol, &config)?;

        let counters = Arc::new(ActivityCounters::new());
        let (cmd_tx, cmd_rx) = mpsc::channel(64);
        let (event_tx, event_rx) = mpsc::channel(config.event_capacity);

        let task = tokio::spawn(run_transport_actor(
            socket,
            config,
            Arc::clone(&counters),
            cmd_rx,
            event_tx,
        ));

        global_metrics().transport_opened();
        debug!(domain, socket_type, protocol, "transport opened");

        Ok((
            Self {
                cmd_tx,
                counters,
                task: Some(task),
                closed: false,
            },
            event_rx,
        ))
    }

    /// Send a command and wait for the reply. Returns a closed error if
    /// the actor has exited.
    async fn request<T>(
        &self,
        cmd: impl FnOnce(oneshot::Sender<T>) -> TransportCmd,
    ) -> Result<T> {
        let (reply, rx) = oneshot::channel();
        self.cmd_tx
            .send(cmd(reply))
            .await
            .map_err(|_| DgramError::Closed)?;
        rx.await.map_err(|_| DgramError::Closed)
    }

    /// Queue `payload` for delivery to `target` (or the connected peer)
    /// and arm writable interest.
    ///
    /// The payload is copied before this returns; the caller's buffer is
    /// immediately reusable. Address and protocol violations fail here
    /// synchronously, before any OS call.
    pub async fn write(&self, payload: &[u8], target: Option<&Endpoint>) -> Result<()> {
        self.request(|reply| TransportCmd::Write {
            payload: Bytes::copy_from_slice(payload),
            target: target.cloned(),
            reply,
        })
        .await?
    }

    /// Bind the descriptor to a local endpoint.
    pub async fn bind(&self, endpoint: &Endpoint) -> Result<()> {
        self.request(|reply| TransportCmd::Bind { endpoint: endpoint.clone(), reply })
            .await?
    }

    /// Connect the descriptor to a peer, switching the outbound queue
    /// into connected-mode address handling.
    pub async fn connect(&self, endpoint: &Endpoint) -> Result<()> {
        self.request(|reply| TransportCmd::Connect { endpoint: endpoint.clone(), reply })
            .await?
    }

    /// setsockopt passthrough; see [`consts`](crate::consts) for levels
    /// and names.
    pub async fn set_option(&self, level: i32, name: i32, value: &[u8]) -> Result<()> {
        self.request(|reply| TransportCmd::SetOption {
            level,
            name,
            value: value.to_vec(),
            reply,
        })
        .await?
    }

    /// getsockopt passthrough returning the raw value bytes.
    pub async fn get_option(&self, level: i32, name: i32) -> Result<Vec<u8>> {
        self.request(|reply| TransportCmd::GetOption { level, name, reply })
            .await?
    }

    /// The local endpoint the descriptor is bound to.
    pub async fn local_addr(&self) -> Result<Endpoint> {
        self.request(|reply| TransportCmd::LocalAddr { reply }).await?
    }

    /// Enable readable interest and raise the read activity counter.
    /// Idempotent.
    pub async fn resume(&self) -> Result<()> {
        self.request(|reply| TransportCmd::Resume { reply }).await
    }

    /// Disable readable interest and lower the read activity counter.
    /// Idempotent.
    pub async fn pause(&self) -> Result<()> {
        self.request(|reply| TransportCmd::Pause { reply }).await
    }

    /// Current (read, write) activity pair. A host polls this to decide
    /// whether to keep awaiting work from the transport.
    pub fn activity(&self) -> ActivitySnapshot {
        self.counters.snapshot()
    }

    /// True while either direction has pending work.
    pub fn is_active(&self) -> bool {
        self.counters.is_active()
    }

    /// Stop the actor, unregister from the readiness loop, and close the
    /// descriptor. Idempotent: a second call is a no-op, never an error.
    /// Unsent queued datagrams are dropped.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        // Actor may already be gone (event receiver dropped); that is
        // still an orderly close.
        let _ = self.request(|reply| TransportCmd::Close { reply }).await;
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        info!("transport closed");
        Ok(())
    }
}

impl Drop for SocketTransport {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

//! Actor owning the transport state — descriptor, outbound queue,
//! interest flags, activity counters — driven in a dedicated task and
//! reached via channels. Zero locks on the hot path: every mutation
//! happens on the task running the readiness loop.

use crate::addr::Endpoint;
use crate::config::TransportConfig;
use crate::error::{DgramError, Result};
use crate::inbound::InboundReader;
use crate::metrics::{global_metrics, ActivityCounters};
use crate::outbound::{OutboundQueue, SendStatus};
use crate::socket;
use crate::transport::TransportEvent;

use bytes::Bytes;
use std::sync::Arc;
use tokio::io::Interest;
use tokio::net::UdpSocket;
use tokio::sync::{mpsc, oneshot};
use tracing::{trace, warn};

/// Commands sent to the transport actor.
pub(crate) enum TransportCmd {
    Write {
        payload: Bytes,
        target: Option<Endpoint>,
        reply: oneshot::Sender<Result<()>>,
    },
    Bind {
        endpoint: Endpoint,
        reply: oneshot::Sender<Result<()>>,
    },
    Connect {
        endpoint: Endpoint,
        reply: oneshot::Sender<Result<()>>,
    },
    SetOption {
        level: i32,
        name: i32,
        value: Vec<u8>,
        reply: oneshot::Sender<Result<()>>,
    },
    GetOption {
        level: i32,
        name: i32,
        reply: oneshot::Sender<Result<Vec<u8>>>,
    },
    LocalAddr {
        reply: oneshot::Sender<Result<Endpoint>>,
    },
    Resume {
        reply: oneshot::Sender<()>,
    },
    Pause {
        reply: oneshot::Sender<()>,
    },
    Close {
        reply: oneshot::Sender<()>,
    },
}

/// Run the transport actor loop.
///
/// Interest is recomputed from `(read_enabled, write_pending)` on every
/// iteration and awaited only when non-empty, so interest mutates purely
/// on queue-state transitions. Readiness handling runs to completion
/// before the next command is taken.
pub(crate) async fn run_transport_actor(
    socket: UdpSocket,
    config: TransportConfig,
    counters: Arc<ActivityCounters>,
    mut cmd_rx: mpsc::Receiver<TransportCmd>,
    event_tx: mpsc::Sender<TransportEvent>,
) {
    let mut queue = OutboundQueue::new();
    let mut read_enabled = false;
    let mut write_pending = false;
    let mut close_reply: Option<oneshot::Sender<()>> = None;

    loop {
        let interest = match (read_enabled, write_pending) {
            (true, true) => Some(Interest::READABLE | Interest::WRITABLE),
            (true, false) => Some(Interest::READABLE),
            (false, true) => Some(Interest::WRITABLE),
            (false, false) => None,
        };

        tokio::select! {
            biased;

            // Collaborator commands (prioritized so close/pause are prompt)
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(TransportCmd::Write { payload, target, reply }) => {
                        let result = queue.add(&payload, target.as_ref());
                        if result.is_ok() && !write_pending {
                            // Zero-to-pending transition: arm writable
                            // interest and raise the write counter once.
                            write_pending = true;
                            counters.arm_write();
                            trace!(queued = queue.len(), "writable interest armed");
                        }
                        let _ = reply.send(result);
                    }
                    Some(TransportCmd::Bind { endpoint, reply }) => {
                        let result = endpoint
                            .resolve()
                            .and_then(|addr| socket::bind(&socket, &addr));
                        let _ = reply.send(result);
                    }
                    Some(TransportCmd::Connect { endpoint, reply }) => {
                        let result = endpoint
                            .resolve()
                            .and_then(|addr| socket::connect(&socket, &addr));
                        if result.is_ok() {
                            queue.set_connected(true);
                            trace!(peer = %endpoint, "connected mode enabled");
                        }
                        let _ = reply.send(result);
                    }
                    Some(TransportCmd::SetOption { level, name, value, reply }) => {
                        let _ = reply.send(socket::set_option(&socket, level, name, &value));
                    }
                    Some(TransportCmd::GetOption { level, name, reply }) => {
                        let _ = reply.send(socket::get_option(&socket, level, name));
                    }
                    Some(TransportCmd::LocalAddr { reply }) => {
                        let result = socket
                            .local_addr()
                            .map(Endpoint::from)
                            .map_err(|e| DgramError::setup(format!("local_addr failed: {e}")));
                        let _ = reply.send(result);
                    }
                    Some(TransportCmd::Resume { reply }) => {
                        if !read_enabled {
                            read_enabled = true;
                            counters.arm_read();
                        }
                        let _ = reply.send(());
                    }
                    Some(TransportCmd::Pause { reply }) => {
                        if read_enabled {
                            read_enabled = false;
                            counters.clear_read();
                        }
                        let _ = reply.send(());
                    }
                    Some(TransportCmd::Close { reply }) => {
                        close_reply = Some(reply);
                        break;
                    }
                    None => {
                        // Handle dropped without close
                        trace!("command channel closed, stopping actor");
                        break;
                    }
                }
            }

            // Descriptor readiness
            ready = socket.ready(interest.unwrap_or(Interest::READABLE)), if interest.is_some() => {
                match ready {
                    Ok(ready) => {
                        if ready.is_readable() && read_enabled {
                            if !drain_readable(&socket, &config, &event_tx).await {
                                break;
                            }
                        }
                        if ready.is_writable() && write_pending {
                            if !flush_writable(&socket, &mut queue, &counters, &mut write_pending, &event_tx).await {
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "readiness wait failed");
                        if event_tx
                            .send(TransportEvent::Error { message: e.to_string() })
                            .await
                            .is_err()
                        {
                            break;
                        }
                    }
                }
            }
        }
    }

    // Unregister and close the descriptor exactly once.
    counters.clear_read();
    counters.clear_write();
    drop(socket);
    global_metrics().transport_closed();
    trace!("transport actor stopped");

    if let Some(reply) = close_reply {
        let _ = reply.send(());
    }
}

/// Drain one readiness wakeup through a fresh [`InboundReader`], emitting
/// one data event per datagram. A terminal error element becomes one
/// error event and ends the drain. Returns false once the event receiver
/// is gone.
async fn drain_readable(
    socket: &UdpSocket,
    config: &TransportConfig,
    event_tx: &mpsc::Sender<TransportEvent>,
) -> bool {
    let mut reader = InboundReader::new(
        socket,
        config.recv_buffer_size,
        config.max_recv_per_event,
        config.track_source,
    );

    while let Some(item) = reader.receive_next() {
        match item {
            Ok(datagram) => {
                global_metrics().record_recv(datagram.payload.len() as u64);
                let source = datagram.source.as_ref().and_then(|raw| raw.to_endpoint());
                let event = TransportEvent::Data { payload: datagram.payload, source };
                if event_tx.send(event).await.is_err() {
                    return false;
                }
            }
            Err(e) => {
                global_metrics().record_recv_error();
                warn!(error = %e, "receive failed");
                return event_tx
                    .send(TransportEvent::Error { message: e.to_string() })
                    .await
                    .is_ok();
            }
        }
    }
    true
}

/// Flush the outbound queue on a writable wakeup and apply the
/// interest/counter bookkeeping for the result. Returns false once the
/// event receiver is gone.
async fn flush_writable(
    socket: &UdpSocket,
    queue: &mut OutboundQueue,
    counters: &ActivityCounters,
    write_pending: &mut bool,
    event_tx: &mpsc::Sender<TransportEvent>,
) -> bool {
    let queued_before = queue.len();
    let bytes_before = queue.pending_bytes();
    let status = queue.send(socket);

    let sent = queued_before - queue.len();
    if sent > 0 {
        global_metrics().record_send(sent as u64, (bytes_before - queue.pending_bytes()) as u64);
    }

    match status {
        SendStatus::Flushed => {
            *write_pending = false;
            counters.clear_write();
            trace!(sent, "outbound queue drained");
            event_tx.send(TransportEvent::Drain).await.is_ok()
        }
        SendStatus::Again => {
            // Interest and counters stay armed; the remaining entries go
            // out in order on the next writable edge.
            trace!(sent, pending = queue.len(), "send would block");
            true
        }
        SendStatus::Fail(e) => {
            // One error event per failed datagram: drop the failed head
            // so it cannot block entries queued behind it. Interest stays
            // armed while a tail remains.
            queue.drop_head();
            if queue.is_empty() {
                *write_pending = false;
                counters.clear_write();
            }
            global_metrics().record_send_error();
            warn!(error = %e, pending = queue.len(), "send failed");
            event_tx
                .send(TransportEvent::Error { message: e.to_string() })
                .await
                .is_ok()
        }
    }
}

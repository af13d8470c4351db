//! Inbound batched-receive sequence.
//!
//! [`InboundReader`] is a lazy, finite, non-restartable pull sequence of
//! received datagrams, created fresh for each readiness wakeup. Each
//! element performs exactly one receive syscall into a fresh buffer, so a
//! yielded [`Datagram`] owns its bytes outright. The explicit
//! [`receive_next`](InboundReader::receive_next) pull replaces an
//! iterator whose mere dereference would perform I/O.

use crate::addr::RawAddress;
use crate::config::{DEFAULT_MAX_RECV_PER_EVENT, DEFAULT_RECV_BUFFER_SIZE};

use bytes::Bytes;
use std::io;
use tokio::net::UdpSocket;

/// One received datagram: owned payload (length = bytes actually
/// received) and, when source tracking is on, the sender's address.
#[derive(Debug)]
pub struct Datagram {
    pub payload: Bytes,
    pub source: Option<RawAddress>,
}

// ── InboundReader ───────────────────────────────────────────────────────

/// Bounded receive sequence over one readiness notification.
///
/// Yields at most `max_read` datagrams, then exhausts regardless of how
/// much data is still pending; the next wakeup gets a fresh instance. A
/// would-block result is normal exhaustion. Any other receive error
/// yields one terminal `Err` element and ends the sequence.
#[derive(Debug)]
pub struct InboundReader<'a> {
    socket: &'a UdpSocket,
    buf_size: usize,
    remaining: usize,
    track_source: bool,
    done: bool,
}

impl<'a> InboundReader<'a> {
    pub fn new(socket: &'a UdpSocket, buf_size: usize, max_read: usize, track_source: bool) -> Self {
        Self {
            socket,
            buf_size,
            remaining: max_read,
            track_source,
            done: false,
        }
    }

    /// Reader with the default buffer size, cap, and source tracking.
    pub fn with_defaults(socket: &'a UdpSocket) -> Self {
        Self::new(socket, DEFAULT_RECV_BUFFER_SIZE, DEFAULT_MAX_RECV_PER_EVENT, true)
    }

    /// Elements still permitted in this instantiation.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Pull the next datagram, if any.
    ///
    /// Exactly one receive syscall per element (EINTR retried inside).
    /// Returns `None` once the cap is reached, the socket has no more
    /// data, or a terminal error was already yielded.
    pub fn receive_next(&mut self) -> Option<io::Result<Datagram>> {
        if self.done || self.remaining == 0 {
            self.done = true;
            return None;
        }

        match self.recv_once() {
            Ok(datagram) => {
                self.remaining -= 1;
                Some(Ok(datagram))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }

    fn recv_once(&self) -> io::Result<Datagram> {
        // Fresh buffer per datagram: ownership of the payload leaves the
        // reader with the yielded element.
        let mut buf = vec![0u8; self.buf_size];
        loop {
            let result = if self.track_source {
                self.socket
                    .try_recv_from(&mut buf)
                    .map(|(n, addr)| (n, Some(RawAddress::from_std(addr))))
            } else {
                self.socket.try_recv(&mut buf).map(|n| (n, None))
            };
            match result {
                Ok((n, source)) => {
                    buf.truncate(n);
                    return Ok(Datagram {
                        payload: Bytes::from(buf),
                        source,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }
}

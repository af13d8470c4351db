//! Outbound batched-send queue.
//!
//! [`OutboundQueue`] buffers (payload, destination) pairs and flushes them
//! through the descriptor with the platform's batching primitive. Exactly
//! one platform module is compiled in:
//!
//! - linux/freebsd: one `sendmmsg(2)` call attempts the whole queue.
//! - other unix: one `send(2)`/`sendto(2)` per entry, draining until the
//!   first would-block.
//! - windows: one send in flight at a time; a pending completion surfaces
//!   as would-block and the entry stays queued.
//!
//! Entries leave the queue in strict FIFO order; a retry never reorders.

use crate::addr::{Endpoint, RawAddress};
use crate::error::{AddressError, DgramError, Result};

use bytes::Bytes;
use std::collections::VecDeque;
use std::io;
use tokio::net::UdpSocket;

/// Largest payload a single UDP datagram can carry.
pub const MAX_DATAGRAM_SIZE: usize = 65535;

/// One queued datagram: owned payload plus the resolved destination.
///
/// Connected sockets carry a destination only on the first entry; the
/// kernel routes the rest through the connected peer.
#[derive(Debug)]
pub(crate) struct OutboundEntry {
    pub(crate) payload: Bytes,
    pub(crate) target: Option<RawAddress>,
}

/// Result of one flush attempt.
#[derive(Debug)]
pub enum SendStatus {
    /// The whole queue was consumed; it is now empty.
    Flushed,
    /// The kernel would block or is out of buffer space. Queue contents
    /// and order are untouched; retry on the next writable notification.
    Again,
    /// Unrecoverable OS error. The queue is left intact for the caller to
    /// inspect or drop.
    Fail(io::Error),
}

// ── OutboundQueue ───────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct OutboundQueue {
    entries: VecDeque<OutboundEntry>,
    connected: bool,
}

impl OutboundQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch to connected-mode address handling: destinations are
    /// resolved only for the first queued entry and omitted afterwards.
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bytes currently queued across all entries.
    pub fn pending_bytes(&self) -> usize {
        self.entries.iter().map(|e| e.payload.len()).sum()
    }

    /// Queued payloads in submission order.
    pub fn payloads(&self) -> impl Iterator<Item = &Bytes> {
        self.entries.iter().map(|e| &e.payload)
    }

    /// Drop all queued entries without sending them.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drop the entry at the head of the queue. Called after the OS
    /// rejected it, so entries queued behind it can still go out.
    pub fn drop_head(&mut self) {
        self.entries.pop_front();
    }

    /// Copy `payload` into owned storage and queue it for `target`.
    ///
    /// The caller's buffer is free for reuse as soon as this returns.
    /// Resolution failures and inexpressible combinations are rejected
    /// here, before any OS call, and nothing is enqueued.
    pub fn add(&mut self, payload: &[u8], target: Option<&Endpoint>) -> Result<()> {
        if payload.len() > MAX_DATAGRAM_SIZE {
            return Err(DgramError::unsupported(format!(
                "payload of {} bytes exceeds the {MAX_DATAGRAM_SIZE} byte datagram limit",
                payload.len()
            )));
        }

        let target = if !self.connected {
            let endpoint = target.ok_or(AddressError::MissingDestination)?;
            Some(endpoint.resolve()?)
        } else if self.entries.is_empty() {
            target.map(|endpoint| endpoint.resolve()).transpose()?
        } else {
            None
        };

        self.entries.push_back(OutboundEntry {
            payload: Bytes::copy_from_slice(payload),
            target,
        });
        Ok(())
    }

    /// Flush as much of the queue as the platform primitive allows.
    ///
    /// Must be called while the socket is writable-ready; a would-block
    /// result clears the cached readiness so the reactor re-arms.
    pub fn send(&mut self, socket: &UdpSocket) -> SendStatus {
        if self.entries.is_empty() {
            return SendStatus::Flushed;
        }
        platform::flush(&mut self.entries, self.connected, socket)
    }
}

// ── Platform: multi-destination batched send (sendmmsg) ─────────────────

#[cfg(any(target_os = "linux", target_os = "freebsd"))]
mod platform {
    use super::{OutboundEntry, SendStatus};
    use crate::error::is_transient_io;

    use std::collections::VecDeque;
    use std::io;
    use std::os::unix::io::{AsRawFd, RawFd};
    use tokio::io::Interest;
    use tokio::net::UdpSocket;

    /// Kernel cap on messages per sendmmsg call (UIO_MAXIOV).
    const SENDMMSG_MAX: usize = 1024;

    pub(super) fn flush(
        entries: &mut VecDeque<OutboundEntry>,
        connected: bool,
        socket: &UdpSocket,
    ) -> SendStatus {
        let fd = socket.as_raw_fd();
        match socket.try_io(Interest::WRITABLE, || sendmmsg_once(fd, &*entries, connected)) {
            Ok(sent) => {
                for _ in 0..sent {
                    entries.pop_front();
                }
                if entries.is_empty() {
                    SendStatus::Flushed
                } else {
                    // Partial completion: the unsent tail stays queued in
                    // order and goes out on the next writable edge.
                    SendStatus::Again
                }
            }
            Err(e) if is_transient_io(&e) => SendStatus::Again,
            Err(e) => SendStatus::Fail(e),
        }
    }

    /// One sendmmsg covering up to the whole queue, with EINTR retried.
    ///
    /// On a connected socket msg_name stays null regardless of any stored
    /// per-entry address; the kernel routes through the connected peer.
    fn sendmmsg_once(
        fd: RawFd,
        entries: &VecDeque<OutboundEntry>,
        connected: bool,
    ) -> io::Result<usize> {
        let count = entries.len().min(SENDMMSG_MAX);

        let mut iovecs: Vec<libc::iovec> = entries
            .iter()
            .take(count)
            .map(|entry| libc::iovec {
                iov_base: entry.payload.as_ptr() as *mut libc::c_void,
                iov_len: entry.payload.len(),
            })
            .collect();

        // msghdr carries private padding on some libcs; zero-init and
        // assign instead of a struct literal.
        let mut headers: Vec<libc::mmsghdr> = Vec::with_capacity(count);
        for (idx, entry) in entries.iter().take(count).enumerate() {
            let mut hdr: libc::mmsghdr = unsafe { std::mem::zeroed() };
            if !connected {
                if let Some(addr) = entry.target.as_ref() {
                    hdr.msg_hdr.msg_name = addr.as_ptr() as *mut libc::c_void;
                    hdr.msg_hdr.msg_namelen = addr.len();
                }
            }
            hdr.msg_hdr.msg_iov = &mut iovecs[idx];
            hdr.msg_hdr.msg_iovlen = 1;
            headers.push(hdr);
        }

        loop {
            let sent = unsafe {
                libc::sendmmsg(fd, headers.as_mut_ptr(), headers.len() as libc::c_uint, 0)
            };
            if sent >= 0 {
                return Ok(sent as usize);
            }
            let err = io::Error::last_os_error();
            if err.kind() != io::ErrorKind::Interrupted {
                return Err(err);
            }
        }
    }
}

// ── Platform: single-destination repeated send ──────────────────────────

#[cfg(all(unix, not(any(target_os = "linux", target_os = "freebsd"))))]
mod platform {
    use super::{OutboundEntry, SendStatus};
    use crate::error::is_transient_io;

    use socket2::SockRef;
    use std::collections::VecDeque;
    use std::io;
    use tokio::io::Interest;
    use tokio::net::UdpSocket;

    pub(super) fn flush(
        entries: &mut VecDeque<OutboundEntry>,
        connected: bool,
        socket: &UdpSocket,
    ) -> SendStatus {
        loop {
            let result = match entries.front() {
                Some(entry) => {
                    socket.try_io(Interest::WRITABLE, || send_one(socket, entry, connected))
                }
                None => return SendStatus::Flushed,
            };
            match result {
                Ok(_) => {
                    entries.pop_front();
                }
                Err(e) if is_transient_io(&e) => return SendStatus::Again,
                Err(e) => return SendStatus::Fail(e),
            }
        }
    }

    /// One sendmsg-equivalent for the head entry, with EINTR retried.
    ///
    /// Connected sockets always use plain send: send_to with an address on
    /// a connected descriptor is EISCONN on BSD-family targets.
    fn send_one(socket: &UdpSocket, entry: &OutboundEntry, connected: bool) -> io::Result<usize> {
        let sock = SockRef::from(socket);
        loop {
            let result = match entry.target.as_ref().filter(|_| !connected) {
                Some(addr) => sock.send_to(&entry.payload, addr.sock_addr()),
                None => sock.send(&entry.payload),
            };
            match result {
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                other => return other,
            }
        }
    }
}

// ── Platform: single in-flight overlapped send ──────────────────────────

#[cfg(windows)]
mod platform {
    use super::{OutboundEntry, SendStatus};
    use crate::error::is_transient_io;

    use socket2::SockRef;
    use std::collections::VecDeque;
    use std::io;
    use tokio::io::Interest;
    use tokio::net::UdpSocket;

    pub(super) fn flush(
        entries: &mut VecDeque<OutboundEntry>,
        connected: bool,
        socket: &UdpSocket,
    ) -> SendStatus {
        // One operation in flight at a time: an immediate completion pops
        // the entry and continues; a pending completion surfaces as
        // would-block and the entry stays at the head of the queue.
        loop {
            let result = match entries.front() {
                Some(entry) => {
                    socket.try_io(Interest::WRITABLE, || send_one(socket, entry, connected))
                }
                None => return SendStatus::Flushed,
            };
            match result {
                Ok(_) => {
                    entries.pop_front();
                }
                Err(e) if is_transient_io(&e) => return SendStatus::Again,
                Err(e) => return SendStatus::Fail(e),
            }
        }
    }

    fn send_one(socket: &UdpSocket, entry: &OutboundEntry, connected: bool) -> io::Result<usize> {
        let sock = SockRef::from(socket);
        match entry.target.as_ref().filter(|_| !connected) {
            Some(addr) => sock.send_to(&entry.payload, addr.sock_addr()),
            None => sock.send(&entry.payload),
        }
    }
}

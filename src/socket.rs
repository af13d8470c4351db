//! Descriptor setup and socket option plumbing.
//!
//! The descriptor is created raw through `socket2` from the caller's
//! (domain, type, protocol) integers, switched to non-blocking, then
//! handed to the tokio reactor via `UdpSocket::from_std`. From that point
//! on every syscall goes through the registered descriptor.

use crate::addr::RawAddress;
use crate::config::TransportConfig;
use crate::error::{DgramError, Result};

use socket2::{Domain, Protocol, SockRef, Socket, Type};
use tokio::net::UdpSocket;

/// Create the OS descriptor and register it with the reactor.
///
/// Any failure here is fatal to construction; nothing survives.
pub(crate) fn create(
    domain: i32,
    socket_type: i32,
    protocol: i32,
    config: &TransportConfig,
) -> Result<UdpSocket> {
    let protocol = if protocol == 0 { None } else { Some(Protocol::from(protocol)) };
    let socket = Socket::new(Domain::from(domain), Type::from(socket_type), protocol)
        .map_err(|e| DgramError::setup(format!("socket creation failed: {e}")))?;

    socket
        .set_nonblocking(true)
        .map_err(|e| DgramError::setup(format!("set_nonblocking failed: {e}")))?;

    if let Some(size) = config.send_buffer {
        socket
            .set_send_buffer_size(size)
            .map_err(|e| DgramError::setup(format!("SO_SNDBUF failed: {e}")))?;
    }
    if let Some(size) = config.recv_buffer {
        socket
            .set_recv_buffer_size(size)
            .map_err(|e| DgramError::setup(format!("SO_RCVBUF failed: {e}")))?;
    }

    let std_socket: std::net::UdpSocket = socket.into();
    UdpSocket::from_std(std_socket)
        .map_err(|e| DgramError::setup(format!("reactor registration failed: {e}")))
}

/// Bind the descriptor to a resolved local address.
pub(crate) fn bind(socket: &UdpSocket, addr: &RawAddress) -> Result<()> {
    SockRef::from(socket)
        .bind(addr.sock_addr())
        .map_err(|e| DgramError::setup(format!("bind to {addr} failed: {e}")))
}

/// Connect the descriptor to a resolved peer address.
pub(crate) fn connect(socket: &UdpSocket, addr: &RawAddress) -> Result<()> {
    SockRef::from(socket)
        .connect(addr.sock_addr())
        .map_err(|e| DgramError::setup(format!("connect to {addr} failed: {e}")))
}

// ── Socket options ──────────────────────────────────────────────────────

/// Raw setsockopt passthrough: (level, name, bytes) straight to the OS.
#[cfg(unix)]
pub(crate) fn set_option(socket: &UdpSocket, level: i32, name: i32, value: &[u8]) -> Result<()> {
    use std::os::unix::io::AsRawFd;

    let rc = unsafe {
        libc::setsockopt(
            socket.as_raw_fd(),
            level,
            name,
            value.as_ptr() as *const libc::c_void,
            value.len() as libc::socklen_t,
        )
    };
    if rc != 0 {
        let e = std::io::Error::last_os_error();
        return Err(DgramError::setup(format!(
            "setsockopt({level}, {name}) failed: {e}"
        )));
    }
    Ok(())
}

/// Raw getsockopt passthrough; returns the value bytes the OS reported.
#[cfg(unix)]
pub(crate) fn get_option(socket: &UdpSocket, level: i32, name: i32) -> Result<Vec<u8>> {
    use std::os::unix::io::AsRawFd;

    let mut value = vec![0u8; 256];
    let mut len = value.len() as libc::socklen_t;
    let rc = unsafe {
        libc::getsockopt(
            socket.as_raw_fd(),
            level,
            name,
            value.as_mut_ptr() as *mut libc::c_void,
            &mut len,
        )
    };
    if rc != 0 {
        let e = std::io::Error::last_os_error();
        return Err(DgramError::setup(format!(
            "getsockopt({level}, {name}) failed: {e}"
        )));
    }
    value.truncate(len as usize);
    Ok(value)
}

/// WinSock exposes no safe raw passthrough here; serve the common
/// SOL_SOCKET subset through socket2's typed accessors.
#[cfg(windows)]
pub(crate) fn set_option(socket: &UdpSocket, level: i32, name: i32, value: &[u8]) -> Result<()> {
    use crate::consts;

    let int_value = || -> Result<i32> {
        let bytes: [u8; 4] = value
            .try_into()
            .map_err(|_| DgramError::config("socket option value must be 4 bytes"))?;
        Ok(i32::from_ne_bytes(bytes))
    };

    if level != consts::SOL_SOCKET {
        return Err(DgramError::unsupported(format!(
            "socket option level {level} is not supported on this platform"
        )));
    }
    let sock = SockRef::from(socket);
    let result = match name {
        x if x == consts::SO_SNDBUF => sock.set_send_buffer_size(int_value()? as usize),
        x if x == consts::SO_RCVBUF => sock.set_recv_buffer_size(int_value()? as usize),
        x if x == consts::SO_REUSEADDR => sock.set_reuse_address(int_value()? != 0),
        x if x == consts::SO_BROADCAST => sock.set_broadcast(int_value()? != 0),
        _ => {
            return Err(DgramError::unsupported(format!(
                "socket option {name} is not supported on this platform"
            )))
        }
    };
    result.map_err(|e| DgramError::setup(format!("setsockopt({level}, {name}) failed: {e}")))
}

#[cfg(windows)]
pub(crate) fn get_option(socket: &UdpSocket, level: i32, name: i32) -> Result<Vec<u8>> {
    use crate::consts;

    if level != consts::SOL_SOCKET {
        return Err(DgramError::unsupported(format!(
            "socket option level {level} is not supported on this platform"
        )));
    }
    let sock = SockRef::from(socket);
    let value: i32 = match name {
        x if x == consts::SO_SNDBUF => sock
            .send_buffer_size()
            .map_err(|e| DgramError::setup(format!("getsockopt failed: {e}")))? as i32,
        x if x == consts::SO_RCVBUF => sock
            .recv_buffer_size()
            .map_err(|e| DgramError::setup(format!("getsockopt failed: {e}")))? as i32,
        x if x == consts::SO_REUSEADDR => sock
            .reuse_address()
            .map_err(|e| DgramError::setup(format!("getsockopt failed: {e}")))?
            as i32,
        x if x == consts::SO_BROADCAST => sock
            .broadcast()
            .map_err(|e| DgramError::setup(format!("getsockopt failed: {e}")))?
            as i32,
        _ => {
            return Err(DgramError::unsupported(format!(
                "socket option {name} is not supported on this platform"
            )))
        }
    };
    Ok(value.to_ne_bytes().to_vec())
}

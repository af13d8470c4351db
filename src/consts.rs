//! OS socket constants, exposed verbatim.
//!
//! Mirrors the system's own socket enumeration so callers can construct a
//! transport the way they would call `socket(2)` directly:
//! `SocketTransport::open(consts::AF_INET, consts::SOCK_DGRAM, 0, ..)`.
//! Values come from libc on unix and from the WinSock headers on windows.

#[cfg(unix)]
mod os {
    pub const AF_UNSPEC: i32 = libc::AF_UNSPEC;
    pub const AF_INET: i32 = libc::AF_INET;
    pub const AF_INET6: i32 = libc::AF_INET6;

    pub const SOCK_STREAM: i32 = libc::SOCK_STREAM;
    pub const SOCK_DGRAM: i32 = libc::SOCK_DGRAM;
    pub const SOCK_RAW: i32 = libc::SOCK_RAW;

    pub const IPPROTO_TCP: i32 = libc::IPPROTO_TCP;
    pub const IPPROTO_UDP: i32 = libc::IPPROTO_UDP;

    pub const SOL_SOCKET: i32 = libc::SOL_SOCKET;
    pub const SO_REUSEADDR: i32 = libc::SO_REUSEADDR;
    pub const SO_BROADCAST: i32 = libc::SO_BROADCAST;
    pub const SO_SNDBUF: i32 = libc::SO_SNDBUF;
    pub const SO_RCVBUF: i32 = libc::SO_RCVBUF;
}

#[cfg(windows)]
mod os {
    pub const AF_UNSPEC: i32 = 0;
    pub const AF_INET: i32 = 2;
    pub const AF_INET6: i32 = 23;

    pub const SOCK_STREAM: i32 = 1;
    pub const SOCK_DGRAM: i32 = 2;
    pub const SOCK_RAW: i32 = 3;

    pub const IPPROTO_TCP: i32 = 6;
    pub const IPPROTO_UDP: i32 = 17;

    pub const SOL_SOCKET: i32 = 0xffff;
    pub const SO_REUSEADDR: i32 = 0x0004;
    pub const SO_BROADCAST: i32 = 0x0020;
    pub const SO_SNDBUF: i32 = 0x1001;
    pub const SO_RCVBUF: i32 = 0x1002;
}

pub use os::*;

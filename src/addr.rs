//! Socket address abstraction.
//!
//! [`Endpoint`] is the logical form (host literal, port, family);
//! [`RawAddress`] is the OS form (a `sockaddr_storage` plus explicit
//! length, owned by exactly one queue slot or received datagram at a
//! time). [`resolve`] is a pure transform from one to the other and is
//! literal-only: name lookup belongs to the caller, not the transport.

use crate::consts;
use crate::error::{AddressError, Result};

use socket2::SockAddr;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::sync::OnceLock;

// ── Address family ──────────────────────────────────────────────────────

/// IP address family, mapped to the OS `AF_*` values in [`consts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddrFamily {
    Unspec,
    Inet,
    Inet6,
}

impl AddrFamily {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            x if x == consts::AF_UNSPEC => Some(Self::Unspec),
            x if x == consts::AF_INET => Some(Self::Inet),
            x if x == consts::AF_INET6 => Some(Self::Inet6),
            _ => None,
        }
    }

    pub fn raw(self) -> i32 {
        match self {
            Self::Unspec => consts::AF_UNSPEC,
            Self::Inet => consts::AF_INET,
            Self::Inet6 => consts::AF_INET6,
        }
    }
}

/// Infer the family of a host literal: IPv4 literal, IPv6 literal, or
/// neither.
pub fn infer_family(host: &str) -> AddrFamily {
    if host.parse::<Ipv4Addr>().is_ok() {
        AddrFamily::Inet
    } else if host.parse::<Ipv6Addr>().is_ok() {
        AddrFamily::Inet6
    } else {
        AddrFamily::Unspec
    }
}

// ── Endpoint ────────────────────────────────────────────────────────────

/// A logical destination: host literal, port, and family.
///
/// Immutable once built. The port is carried wide so an out-of-range
/// value fails at resolution time rather than silently truncating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    host: String,
    port: u32,
    family: AddrFamily,
}

impl Endpoint {
    /// Build an endpoint, inferring the family from the host literal.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        let family = infer_family(&host);
        Self { host, port: u32::from(port), family }
    }

    /// Build an endpoint with an explicit family and unchecked port.
    pub fn with_family(host: impl Into<String>, port: u32, family: AddrFamily) -> Self {
        Self { host: host.into(), port, family }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u32 {
        self.port
    }

    pub fn family(&self) -> AddrFamily {
        self.family
    }

    /// Resolve to the OS representation. Pure and non-caching.
    pub fn resolve(&self) -> Result<RawAddress> {
        resolve(&self.host, self.port, self.family)
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        let family = if addr.is_ipv4() { AddrFamily::Inet } else { AddrFamily::Inet6 };
        Self {
            host: addr.ip().to_string(),
            port: u32::from(addr.port()),
            family,
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.family == AddrFamily::Inet6 {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

// ── RawAddress ──────────────────────────────────────────────────────────

/// An owned OS socket address: opaque storage plus explicit length.
///
/// Moves between owners (an outbound queue slot, a received datagram),
/// never shared. The formatted display string is filled lazily and cached
/// for diagnostics; everything else is immutable.
#[derive(Debug)]
pub struct RawAddress {
    addr: SockAddr,
    display: OnceLock<String>,
}

impl RawAddress {
    pub(crate) fn new(addr: SockAddr) -> Self {
        Self { addr, display: OnceLock::new() }
    }

    pub fn from_std(addr: SocketAddr) -> Self {
        Self::new(SockAddr::from(addr))
    }

    pub fn family(&self) -> AddrFamily {
        AddrFamily::from_raw(i32::from(self.addr.family())).unwrap_or(AddrFamily::Unspec)
    }

    /// The address as a standard `SocketAddr`, when it is an IP address.
    pub fn as_socket(&self) -> Option<SocketAddr> {
        self.addr.as_socket()
    }

    /// Recover the logical endpoint for event reporting.
    pub fn to_endpoint(&self) -> Option<Endpoint> {
        self.as_socket().map(Endpoint::from)
    }

    /// Canonical host string ("127.0.0.1", "::1"), cached after the first
    /// call.
    pub fn format(&self) -> &str {
        self.display.get_or_init(|| match self.as_socket() {
            Some(addr) => addr.ip().to_string(),
            None => String::from("<non-ip address>"),
        })
    }

    pub(crate) fn sock_addr(&self) -> &SockAddr {
        &self.addr
    }

    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
    pub(crate) fn as_ptr(&self) -> *const libc::c_void {
        self.addr.as_ptr() as *const libc::c_void
    }

    #[cfg(any(target_os = "linux", target_os = "freebsd"))]
    pub(crate) fn len(&self) -> libc::socklen_t {
        self.addr.len() as libc::socklen_t
    }
}

impl fmt::Display for RawAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format())
    }
}

// ── Resolution & formatting ─────────────────────────────────────────────

/// Resolve a (host, port, family) triple to an owned OS address.
///
/// Literal-only: the host must already be a numeric address for the given
/// family. Error precedence follows the checks a caller can fix first:
/// empty host, out-of-range port, unsupported family, bad literal.
pub fn resolve(host: &str, port: u32, family: AddrFamily) -> Result<RawAddress> {
    if host.is_empty() {
        return Err(AddressError::EmptyHost.into());
    }
    if port > u32::from(u16::MAX) {
        return Err(AddressError::PortOutOfRange(port).into());
    }
    let port = port as u16;

    let addr = match family {
        AddrFamily::Inet => {
            let ip: Ipv4Addr = host
                .parse()
                .map_err(|_| AddressError::InvalidHost(host.to_string()))?;
            SocketAddr::from((ip, port))
        }
        AddrFamily::Inet6 => {
            let ip: Ipv6Addr = host
                .parse()
                .map_err(|_| AddressError::InvalidHost(host.to_string()))?;
            SocketAddr::from((ip, port))
        }
        AddrFamily::Unspec => return Err(AddressError::UnsupportedFamily.into()),
    };

    Ok(RawAddress::from_std(addr))
}

/// Render the canonical textual form of a raw address.
pub fn format(addr: &RawAddress) -> String {
    addr.format().to_string()
}

//! Error types for the datagram transport.
//!
//! [`DgramError`] splits failures along the lines the event loop cares
//! about: setup errors are synchronous and fatal to the triggering call,
//! address errors fail resolution before any syscall, and I/O errors are
//! either transient (would-block, retried on the next readiness edge) or
//! surfaced as a single error notification.

use std::fmt;
use std::io;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DgramError>;

// ── Error types ─────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum DgramError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Setup error: {message}")]
    Setup { message: String },

    #[error("Address error: {kind}")]
    Address { kind: AddressError },

    #[error("Unsupported operation: {message}")]
    Unsupported { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Transport closed")]
    Closed,
}

/// Reasons endpoint resolution can fail, all detectable before any syscall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    EmptyHost,
    PortOutOfRange(u32),
    UnsupportedFamily,
    InvalidHost(String),
    MissingDestination,
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyHost => write!(f, "empty host"),
            Self::PortOutOfRange(port) => write!(f, "port {port} out of range"),
            Self::UnsupportedFamily => write!(f, "unsupported address family"),
            Self::InvalidHost(host) => write!(f, "invalid host literal '{host}'"),
            Self::MissingDestination => write!(f, "destination required on unconnected socket"),
        }
    }
}

impl From<AddressError> for DgramError {
    fn from(kind: AddressError) -> Self {
        Self::Address { kind }
    }
}

// ── Constructors ────────────────────────────────────────────────────────

impl DgramError {
    pub fn setup(message: impl Into<String>) -> Self {
        Self::Setup { message: message.into() }
    }

    pub fn address(kind: AddressError) -> Self {
        Self::Address { kind }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::Unsupported { message: message.into() }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }
}

// ── Predicates ──────────────────────────────────────────────────────────

impl DgramError {
    /// Would-block class: the operation should be retried on the next
    /// readiness notification, never reported as a failure.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Io(e) => is_transient_io(e),
            _ => false,
        }
    }

    pub fn is_address(&self) -> bool {
        matches!(self, Self::Address { .. })
    }

    pub fn is_setup(&self) -> bool {
        matches!(self, Self::Setup { .. })
    }

    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

/// EAGAIN / EWOULDBLOCK / ENOBUFS: the kernel is out of room right now.
/// Everything else is a real failure.
pub(crate) fn is_transient_io(err: &io::Error) -> bool {
    if err.kind() == io::ErrorKind::WouldBlock {
        return true;
    }
    #[cfg(unix)]
    if err.raw_os_error() == Some(libc::ENOBUFS) {
        return true;
    }
    #[cfg(windows)]
    if err.raw_os_error() == Some(10055) {
        // WSAENOBUFS
        return true;
    }
    false
}

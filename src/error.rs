//! Unified error types for the VoteBox firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! frame loop's error handling uniform.  All variants are `Copy` so they
//! can be cheaply passed out of detached dispatch threads without
//! allocation.  No error ever escapes to the frame loop: the dispatcher
//! and probe translate failures into the shared health flag plus one
//! diagnostic log line.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// No API secret key is available — dispatch and probe cannot
    /// authenticate.  Non-fatal to the process, which keeps running and
    /// flashing the error LED.
    CredentialMissing,
    /// Network-level failure (connect, send, read, or timeout) on a call
    /// to the tally service.  Recoverable — retried by the next probe.
    Transport(TransportError),
    /// The tally service answered with a non-200 status.
    RemoteRejected { status: u16 },
    /// Stored identity/config is missing or invalid.
    Config(&'static str),
    /// Peripheral initialisation failed.
    Init(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CredentialMissing => write!(f, "no API key available"),
            Self::Transport(e) => write!(f, "transport: {e}"),
            Self::RemoteRejected { status } => write!(f, "remote rejected (status {status})"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Init(msg) => write!(f, "init: {msg}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportError {
    /// TCP/TLS connection to the service could not be opened.
    Connect,
    /// Request write or response read failed mid-flight.
    Io,
    /// No response within the configured timeout.
    Timeout,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connect => write!(f, "connect failed"),
            Self::Io => write!(f, "request I/O failed"),
            Self::Timeout => write!(f, "timed out"),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Self::Transport(e)
    }
}

impl std::error::Error for Error {}
impl std::error::Error for TransportError {}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;

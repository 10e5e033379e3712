//! Port traits — the hexagonal boundary between station logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ Controller / net (domain)
//! ```
//!
//! Driven adapters (HTTP client, NVS storage) implement these traits.
//! The dispatch, probe, and provisioning paths consume them through
//! trait objects or generics, so the domain core never touches the
//! ESP-IDF HTTP stack or flash directly — and host tests swap in mocks.
//!
//! ## Security notes
//!
//! - **ConfigPort** implementations MUST validate before persisting.
//! - **StoragePort** implementations SHOULD encrypt sensitive keys; the
//!   API secret lives in the "auth" namespace for exactly this reason.
//! - All port errors are typed — callers must handle every variant explicitly.

use crate::config::StationConfig;

// ───────────────────────────────────────────────────────────────
// Tally service port (driven adapter: domain → HTTPS)
// ───────────────────────────────────────────────────────────────

/// Response surface the domain cares about: the status line plus a short
/// body excerpt for diagnostics.  Full bodies are never buffered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TallyReply {
    pub status: u16,
    /// First bytes of the response body, lossy UTF-8.
    pub body: heapless::String<128>,
}

impl TallyReply {
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Basic-auth credentials attached to every authenticated request.
/// Username is the station uuid; password is a freshly signed token.
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    /// RFC 7617 `Authorization` header value.
    pub fn header_value(&self) -> String {
        use base64::Engine as _;
        let raw = format!("{}:{}", self.username, self.password);
        let encoded = base64::engine::general_purpose::STANDARD.encode(raw.as_bytes());
        format!("Basic {encoded}")
    }
}

/// Outbound port to the remote tally service.
///
/// Object-safe and `Send + Sync`: dispatch and probe calls run on
/// detached worker threads holding an `Arc<dyn TallyPort>`.
pub trait TallyPort: Send + Sync {
    /// `POST /vote` with a JSON body and Basic auth.
    fn post_vote(&self, json_body: &str, auth: &BasicAuth) -> crate::error::Result<TallyReply>;

    /// `GET /ping` with Basic auth, bounded by the configured timeout.
    fn ping(&self, auth: &BasicAuth) -> crate::error::Result<TallyReply>;

    /// `GET /key?uuid=<uuid>` — unauthenticated provisioning fetch.
    fn fetch_key(&self, uuid: &str) -> crate::error::Result<TallyReply>;
}

// ───────────────────────────────────────────────────────────────
// Configuration port (driven adapter: domain ↔ persistent config)
// ───────────────────────────────────────────────────────────────

/// Loads and persists station configuration.
///
/// # Security
///
/// Implementations MUST validate config values before persisting.
/// Invalid ranges should be rejected with [`ConfigError::ValidationFailed`],
/// not silently clamped.  A corrupted or hostile stored blob must never
/// yield a zero `flash_each_ms` (division by zero in the blink clock) or
/// an inverted brightness range (underflow in the sweep).
pub trait ConfigPort {
    /// Load configuration from persistent storage.
    /// Returns [`StationConfig::default()`] if no stored config exists.
    fn load(&self) -> Result<StationConfig, ConfigError>;

    /// Validate and persist configuration.
    fn save(&self, config: &StationConfig) -> Result<(), ConfigError>;
}

// ───────────────────────────────────────────────────────────────
// Storage port (driven adapter: domain ↔ NVS / flash)
// ───────────────────────────────────────────────────────────────

/// Persistent key-value storage for credentials and config blobs.
///
/// # Security
///
/// - Implementations SHOULD encrypt sensitive keys.  On ESP32, the
///   "auth" namespace sits on the encrypted NVS partition.
/// - Keys are namespaced to prevent collisions between subsystems.
/// - Write operations MUST be atomic — no partial writes on power loss.
///   The ESP-IDF NVS API guarantees this natively; in-memory simulation
///   achieves it trivially.
pub trait StoragePort {
    /// Read a value.  Returns the number of bytes written to `buf`.
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value atomically.
    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError>;

    /// Delete a key.  Returns `Ok(())` even if the key didn't exist.
    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError>;

    /// Check whether a key exists without reading it.
    fn exists(&self, namespace: &str, key: &str) -> bool;
}

// ───────────────────────────────────────────────────────────────
// Error types
// ───────────────────────────────────────────────────────────────

/// Errors from [`ConfigPort`] operations.
#[derive(Debug)]
pub enum ConfigError {
    /// No config found in storage (first boot).
    NotFound,
    /// Stored config failed integrity / deserialization check.
    Corrupted,
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
    /// Generic I/O error from the storage backend.
    IoError,
}

/// Errors from [`StoragePort`] operations.
#[derive(Debug)]
pub enum StorageError {
    /// Requested key does not exist.
    NotFound,
    /// Storage partition is full.
    Full,
    /// Generic I/O error.
    IoError,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "config not found"),
            Self::Corrupted => write!(f, "config corrupted"),
            Self::ValidationFailed(msg) => write!(f, "validation failed: {}", msg),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

impl core::fmt::Display for StorageError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotFound => write!(f, "key not found"),
            Self::Full => write!(f, "storage full"),
            Self::IoError => write!(f, "I/O error"),
        }
    }
}

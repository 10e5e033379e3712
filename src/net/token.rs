//! Signed, timestamped API tokens — HMAC-SHA256 over a random nonce.
//!
//! Every authenticated request carries a freshly minted token as the
//! Basic-auth password.  The format is three URL-safe base64 segments
//! joined by dots:
//!
//! ```text
//! b64(nonce) . b64(epoch_secs_be) . b64(HMAC-SHA256(key, "nonce_b64.ts_b64"))
//! ```
//!
//! The timestamp lets the service reject stale tokens; the signature
//! binds nonce and timestamp to the station's secret key.  Crypto is
//! handled by the `hmac-sha256` crate — pure Rust, no_std, constant-time
//! verification, identical on ESP-IDF and host targets.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

const NONCE_LEN: usize = 32;

/// Mint a fresh token signed with `key`, timestamped at `epoch_secs`.
pub fn issue(key: &[u8], epoch_secs: u64) -> String {
    let nonce = fill_random_nonce();
    let value = URL_SAFE_NO_PAD.encode(nonce);
    let ts = URL_SAFE_NO_PAD.encode(epoch_secs.to_be_bytes());
    let payload = format!("{value}.{ts}");
    let tag = hmac_sha256::HMAC::mac(payload.as_bytes(), key);
    let sig = URL_SAFE_NO_PAD.encode(tag);
    format!("{payload}.{sig}")
}

/// Verify a token's signature and return its embedded timestamp.
/// Mirrors the service-side check; used by tests and diagnostics.
pub fn verify(key: &[u8], token: &str) -> Option<u64> {
    let (payload, sig_b64) = token.rsplit_once('.')?;
    let (_, ts_b64) = payload.split_once('.')?;

    let sig = URL_SAFE_NO_PAD.decode(sig_b64).ok()?;
    let tag: &[u8; 32] = sig.as_slice().try_into().ok()?;
    if !hmac_sha256::HMAC::verify(payload.as_bytes(), key, tag) {
        return None;
    }

    let ts_bytes = URL_SAFE_NO_PAD.decode(ts_b64).ok()?;
    let ts_array: [u8; 8] = ts_bytes.as_slice().try_into().ok()?;
    Some(u64::from_be_bytes(ts_array))
}

// ── Platform-specific nonce generation ───────────────────────

/// Fill a 32-byte nonce with cryptographically random data.
///
/// ESP-IDF: delegates to the hardware RNG via `esp_fill_random`.
#[cfg(target_os = "espidf")]
fn fill_random_nonce() -> [u8; NONCE_LEN] {
    let mut buf = [0u8; NONCE_LEN];
    // SAFETY: esp_fill_random writes to the provided buffer using
    // the hardware RNG. Buffer is valid and exclusively owned.
    unsafe {
        esp_idf_sys::esp_fill_random(buf.as_mut_ptr().cast(), buf.len());
    }
    buf
}

/// Simulation stub — uses `RandomState` to produce non-cryptographic entropy.
#[cfg(not(target_os = "espidf"))]
fn fill_random_nonce() -> [u8; NONCE_LEN] {
    use std::collections::hash_map::RandomState;
    use std::hash::{BuildHasher, Hasher};

    let mut buf = [0u8; NONCE_LEN];
    for chunk in buf.chunks_mut(8) {
        let s = RandomState::new();
        let val = s.build_hasher().finish().to_le_bytes();
        let len = chunk.len().min(val.len());
        chunk[..len].copy_from_slice(&val[..len]);
    }
    buf
}

//! Station configuration parameters
//!
//! All tunable parameters for the VoteBox station: animation timing,
//! debounce window, PWM carrier, and the tally-service endpoint.
//! Values can be overridden via NVS; defaults match the deployed
//! hardware.

use serde::{Deserialize, Serialize};

/// Core station configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationConfig {
    /// Base URL of the remote tally service (trailing slash required).
    pub service_url: heapless::String<96>,

    // --- Animation timing ---
    /// Inter-frame sleep of the LED loop (milliseconds).
    pub pause_time_ms: u32,
    /// Press-flash duration after an accepted press (milliseconds).
    pub flash_time_ms: u32,
    /// Half-period of the global blink clock (milliseconds).
    pub flash_each_ms: u32,

    // --- Brightness ---
    /// Upper bound of the idle breathing sweep (duty %, 0-100).
    pub max_bright: u8,
    /// Lower bound of the idle breathing sweep (duty %, 0-100).
    pub min_bright: u8,

    // --- Input ---
    /// Per-line debounce window: edges closer than this to the previous
    /// accepted edge on the same line are suppressed (milliseconds).
    pub debounce_ms: u32,

    // --- Hardware ---
    /// LEDC carrier frequency for the vote LEDs (Hz).
    pub pwm_freq_hz: u32,

    // --- Network ---
    /// Bound on the health-probe ping round trip (seconds).
    pub ping_timeout_secs: u32,
}

impl Default for StationConfig {
    fn default() -> Self {
        let mut service_url = heapless::String::new();
        let _ = service_url.push_str("https://tally.votebox.example/votebox/");
        Self {
            service_url,

            // Animation
            pause_time_ms: 80,
            flash_time_ms: 3000,
            flash_each_ms: 250,

            // Brightness
            max_bright: 50,
            min_bright: 5,

            // Input
            debounce_ms: 400,

            // Hardware
            pwm_freq_hz: 100,

            // Network
            ping_timeout_secs: 10,
        }
    }
}

/// Persisted station identity: stable uuid plus the API secret key
/// obtained from the tally service on first run.  Immutable for the
/// process lifetime once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub uuid: String,
    pub key: String,
}

impl Credentials {
    /// True when the API key has been provisioned.
    pub fn has_key(&self) -> bool {
        !self.key.is_empty()
    }
}

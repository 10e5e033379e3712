//! ESP32 time adapter.
//!
//! Provides the monotonic frame clock and the wall-clock seconds used
//! for token signing.
//!
//! - **`target_os = "espidf"`** — wraps `esp_timer_get_time()` from the
//!   ESP-IDF high-resolution timer (microsecond precision, monotonic)
//!   and `gettimeofday()` for SNTP-synced wall time.
//! - **`not(target_os = "espidf")`** — uses `std::time::Instant` /
//!   `std::time::SystemTime` for host-side testing and simulation.

/// Monotonic clock for the ESP32-S3 platform.
///
/// `now_ms()` never returns 0: the press log and the button ISR both
/// reserve 0 as the "no timestamp" sentinel.
pub struct StationClock {
    #[cfg(not(target_os = "espidf"))]
    start: std::time::Instant,
}

impl Default for StationClock {
    fn default() -> Self {
        Self::new()
    }
}

impl StationClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_os = "espidf"))]
            start: std::time::Instant::now(),
        }
    }

    /// Milliseconds since boot (monotonic, starts at 1).
    #[cfg(target_os = "espidf")]
    pub fn now_ms(&self) -> u64 {
        ((unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1_000).max(1)
    }

    /// Milliseconds since boot (monotonic, starts at 1).
    #[cfg(not(target_os = "espidf"))]
    pub fn now_ms(&self) -> u64 {
        (self.start.elapsed().as_millis() as u64).max(1)
    }
}

/// Wall-clock seconds since the Unix epoch, for token timestamps.
/// Returns `None` when the clock is obviously unsynced (pre-SNTP).
#[cfg(target_os = "espidf")]
pub fn epoch_secs() -> Option<u64> {
    use core::ptr;
    let mut tv = esp_idf_svc::sys::timeval {
        tv_sec: 0,
        tv_usec: 0,
    };
    if unsafe { esp_idf_svc::sys::gettimeofday(&mut tv, ptr::null_mut()) } != 0 {
        return None;
    }
    // Reject obviously unsynced time (e.g. before 2020-01-01)
    const EPOCH_2020: i64 = 1_577_836_800;
    if tv.tv_sec < EPOCH_2020 {
        return None;
    }
    Some(tv.tv_sec as u64)
}

/// Wall-clock seconds since the Unix epoch.
#[cfg(not(target_os = "espidf"))]
pub fn epoch_secs() -> Option<u64> {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .ok()
        .map(|d| d.as_secs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_never_returns_zero() {
        let clock = StationClock::new();
        assert!(clock.now_ms() >= 1);
    }

    #[test]
    fn clock_is_monotonic() {
        let clock = StationClock::new();
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }

    #[test]
    fn host_epoch_is_synced() {
        let secs = epoch_secs().expect("host wall clock available");
        // Sanity: after 2020-01-01.
        assert!(secs > 1_577_836_800);
    }
}

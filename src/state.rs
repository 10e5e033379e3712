//! Shared cross-thread cells: the service-health flag and the per-button
//! press timestamps.
//!
//! Both are plain atomic slots with last-writer-wins semantics.  Writers
//! only ever assert what they directly observed, and every reader
//! tolerates staleness up to one scheduling quantum, so no lock or
//! compound invariant is needed — only word-level write visibility
//! (acquire/release ordering).
//!
//! Both cells are injected via `Arc` into the components that need them;
//! there are no ambient globals.

use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use crate::pins::CHANNELS;

// ───────────────────────────────────────────────────────────────
// Health flag
// ───────────────────────────────────────────────────────────────

/// Binary indicator of whether the last observed interaction with the
/// tally service succeeded.
///
/// Starts `false` (in error) until first successful contact.  Written by
/// the vote dispatcher and the health probe; read by the animator and
/// the controller.
#[derive(Debug)]
pub struct HealthState {
    ok: AtomicBool,
}

impl HealthState {
    pub const fn new() -> Self {
        Self {
            ok: AtomicBool::new(false),
        }
    }

    pub fn set_ok(&self, ok: bool) {
        self.ok.store(ok, Ordering::Release);
    }

    pub fn is_ok(&self) -> bool {
        self.ok.load(Ordering::Acquire)
    }
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// Press timestamps
// ───────────────────────────────────────────────────────────────

/// Last accepted press per channel, in monotonic milliseconds.
/// `0` means "no active press".
///
/// Written by the button bank on accepted edges; cleared by the animator
/// when a press-flash expires; read every frame.
#[derive(Debug)]
pub struct PressLog {
    slots: [AtomicU64; CHANNELS],
}

impl PressLog {
    pub const fn new() -> Self {
        Self {
            slots: [const { AtomicU64::new(0) }; CHANNELS],
        }
    }

    /// Record an accepted press.  `at_ms` must be non-zero (monotonic
    /// clocks start at 1 in this firmware precisely so 0 stays free as
    /// the "none" sentinel).
    pub fn record(&self, index: usize, at_ms: u64) {
        if let Some(slot) = self.slots.get(index) {
            slot.store(at_ms, Ordering::Release);
        }
    }

    /// Timestamp of the last accepted press, or 0 if none is active.
    pub fn get(&self, index: usize) -> u64 {
        self.slots
            .get(index)
            .map_or(0, |slot| slot.load(Ordering::Acquire))
    }

    /// Clear an expired press back to "none".
    pub fn clear(&self, index: usize) {
        if let Some(slot) = self.slots.get(index) {
            slot.store(0, Ordering::Release);
        }
    }
}

impl Default for PressLog {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_starts_in_error() {
        let health = HealthState::new();
        assert!(!health.is_ok());
    }

    #[test]
    fn health_last_writer_wins() {
        let health = HealthState::new();
        health.set_ok(true);
        health.set_ok(false);
        health.set_ok(true);
        assert!(health.is_ok());
    }

    #[test]
    fn press_log_record_and_clear() {
        let log = PressLog::new();
        assert_eq!(log.get(2), 0);
        log.record(2, 1234);
        assert_eq!(log.get(2), 1234);
        log.clear(2);
        assert_eq!(log.get(2), 0);
    }

    #[test]
    fn press_log_slots_are_independent() {
        let log = PressLog::new();
        log.record(0, 10);
        log.record(4, 20);
        assert_eq!(log.get(0), 10);
        assert_eq!(log.get(1), 0);
        assert_eq!(log.get(4), 20);
    }

    #[test]
    fn press_log_out_of_range_is_ignored() {
        let log = PressLog::new();
        log.record(CHANNELS, 99);
        assert_eq!(log.get(CHANNELS), 0);
    }
}

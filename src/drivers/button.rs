//! ISR-debounced vote-button bank.
//!
//! ## Hardware
//!
//! Five active-high momentary switches with external pull-downs.  Each
//! GPIO fires on the rising edge; the ISR records the raw timestamp into
//! a per-line atomic, and `tick()` (called from the frame loop) runs the
//! per-line debounce.
//!
//! ## Debounce contract
//!
//! An edge within `debounce_ms` of the previous **accepted** edge on the
//! same line is suppressed.  Windows are independent per line, so
//! concurrent presses on different buttons are both accepted.

use core::sync::atomic::{AtomicU32, Ordering};

use crate::pins::CHANNELS;

/// Raw ISR timestamps (milliseconds since boot, truncated to u32), one
/// slot per button line.  Written by the ISR, read by the frame loop.
static EDGE_TIMESTAMPS: [AtomicU32; CHANNELS] = [const { AtomicU32::new(0) }; CHANNELS];

/// An accepted, debounced press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PressEvent {
    /// Logical button index (0-4), panel order.
    pub index: usize,
    /// Edge timestamp in monotonic milliseconds.
    pub at_ms: u32,
}

pub struct ButtonBank {
    debounce_ms: u32,
    last_edge_seen: [u32; CHANNELS],
    last_accepted: [u32; CHANNELS],
}

impl ButtonBank {
    /// A new bank treats whatever the ISR latched before this point as
    /// already seen: only edges arriving after construction produce
    /// presses.
    pub fn new(debounce_ms: u32) -> Self {
        let mut last_edge_seen = [0; CHANNELS];
        for (slot, seen) in EDGE_TIMESTAMPS.iter().zip(&mut last_edge_seen) {
            *seen = slot.load(Ordering::Acquire);
        }
        Self {
            debounce_ms,
            last_edge_seen,
            last_accepted: [0; CHANNELS],
        }
    }

    /// Call from the frame loop once per frame.  Latches the newest ISR
    /// edge on each line and returns the presses that survive debounce.
    pub fn tick(&mut self) -> heapless::Vec<PressEvent, CHANNELS> {
        let mut accepted = heapless::Vec::new();
        for index in 0..CHANNELS {
            let edge_ms = EDGE_TIMESTAMPS[index].load(Ordering::Acquire);
            if edge_ms == 0 || edge_ms == self.last_edge_seen[index] {
                continue;
            }
            self.last_edge_seen[index] = edge_ms;
            if let Some(event) = self.offer(index, edge_ms) {
                let _ = accepted.push(event);
            }
        }
        accepted
    }

    /// Per-line debounce decision: accept `edge_ms` unless it falls
    /// within the debounce window of the previous accepted edge.
    pub fn offer(&mut self, index: usize, edge_ms: u32) -> Option<PressEvent> {
        let previous = self.last_accepted[index];
        if previous != 0 && edge_ms.wrapping_sub(previous) < self.debounce_ms {
            return None;
        }
        self.last_accepted[index] = edge_ms;
        Some(PressEvent {
            index,
            at_ms: edge_ms,
        })
    }
}

/// ISR handler — register on each button line's rising edge.
/// Safe to call from interrupt context (lock-free atomic store).
///
/// `now_ms` of 0 is bumped to 1 so that 0 stays free as "no edge yet".
pub fn button_isr_handler(line: usize, now_ms: u32) {
    if let Some(slot) = EDGE_TIMESTAMPS.get(line) {
        slot.store(now_ms.max(1), Ordering::Release);
    }
}

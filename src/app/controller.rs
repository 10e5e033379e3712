//! Frame-loop controller: the station's single place where input,
//! animation, and networking meet.
//!
//! Once per frame the controller drains the debounced button bank,
//! records accepted presses, fires a detached dispatch per press, asks
//! the animator for this frame's duties, and — while unhealthy — paces
//! the background probe on animation-cycle boundaries.  Nothing in here
//! blocks: all network work happens on detached threads.

use std::sync::Arc;

use log::info;

use crate::app::ports::TallyPort;
use crate::config::{Credentials, StationConfig};
use crate::drivers::animator::LedAnimator;
use crate::drivers::button::ButtonBank;
use crate::net::dispatch::spawn_dispatch;
use crate::net::probe::HealthProbe;
use crate::pins::CHANNELS;
use crate::state::{HealthState, PressLog};

pub struct Controller {
    buttons: ButtonBank,
    animator: LedAnimator,
    presses: Arc<PressLog>,
    health: Arc<HealthState>,
    probe: Arc<HealthProbe>,
    tally: Arc<dyn TallyPort>,
    creds: Arc<Credentials>,
}

impl Controller {
    pub fn new(
        cfg: &StationConfig,
        presses: Arc<PressLog>,
        health: Arc<HealthState>,
        tally: Arc<dyn TallyPort>,
        creds: Arc<Credentials>,
    ) -> Self {
        Self {
            buttons: ButtonBank::new(cfg.debounce_ms),
            animator: LedAnimator::new(cfg),
            presses,
            health,
            probe: Arc::new(HealthProbe::new()),
            tally,
            creds,
        }
    }

    /// Run one frame at monotonic time `now_ms`; returns the LED duties
    /// for the frame.
    pub fn frame(&mut self, now_ms: u64) -> [u8; CHANNELS] {
        for press in self.buttons.tick() {
            info!("button {} pressed", press.index);
            self.presses
                .record(press.index, widen_press_timestamp(now_ms, press.at_ms));
            spawn_dispatch(
                Arc::clone(&self.tally),
                Arc::clone(&self.creds),
                Arc::clone(&self.health),
                press.index,
            );
        }

        let healthy = self.health.is_ok();
        let duties = self.animator.tick(now_ms, healthy, &self.presses);

        // One probe per sweep cycle while unhealthy; the in-flight guard
        // inside the probe absorbs slow networks.
        if !healthy && self.animator.cycle_wrapped() {
            self.probe.spawn(
                Arc::clone(&self.tally),
                Arc::clone(&self.creds),
                Arc::clone(&self.health),
            );
        }

        duties
    }

    /// Shared probe handle, for the startup connectivity check.
    pub fn probe(&self) -> Arc<HealthProbe> {
        Arc::clone(&self.probe)
    }
}

/// Rebase a 32-bit ISR timestamp onto the 64-bit frame clock.
///
/// The ISR truncates the monotonic clock to `u32` milliseconds, which
/// wraps after ~49.7 days of uptime.  A latched edge is at most one
/// frame old when the loop picks it up, so its low 32 bits sit just
/// behind `now_ms`'s; anchoring on the frame clock keeps the press-flash
/// expiry arithmetic exact across the wrap.  An edge whose low bits land
/// ahead of the frame clock (ISR fired after the clock sample) is pinned
/// to `now_ms`.
fn widen_press_timestamp(now_ms: u64, at_ms: u32) -> u64 {
    let behind = (now_ms as u32).wrapping_sub(at_ms);
    if behind > u32::MAX / 2 {
        now_ms
    } else {
        // Press timestamp 0 means "none"; keep real presses off it.
        now_ms.saturating_sub(u64::from(behind)).max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_timestamps_pass_through_at_low_uptime() {
        assert_eq!(widen_press_timestamp(1_000, 1_000), 1_000);
        assert_eq!(widen_press_timestamp(1_000, 960), 960);
    }

    #[test]
    fn press_timestamps_survive_the_u32_wrap() {
        // ~49.7 days in: the ISR clock has wrapped, the frame clock
        // has not.
        let now_ms = (1u64 << 32) + 1_000;
        assert_eq!(widen_press_timestamp(now_ms, 900), (1u64 << 32) + 900);
        // Edge latched just before the wrap, frame runs just after it.
        let now_ms = (1u64 << 32) + 40;
        assert_eq!(widen_press_timestamp(now_ms, u32::MAX - 39), (1u64 << 32) - 40);
    }

    #[test]
    fn edge_after_clock_sample_is_pinned_to_the_frame() {
        assert_eq!(widen_press_timestamp(1_000, 1_005), 1_000);
    }
}

//! Per-frame LED animation state machine.
//!
//! Computes all five duty cycles once per frame from the shared health
//! flag and the press timestamps.  Pure logic — the frame loop feeds in
//! the clock and applies the result through [`LedBank`], so every mode
//! below is exercised by host tests with a synthetic clock.
//!
//! ## Mode priority (highest first, per LED per frame)
//!
//! | Mode        | Condition                     | Output                          |
//! |-------------|-------------------------------|---------------------------------|
//! | Error       | health not ok                 | LED 0 blinks 0/`max_bright`, rest 0 |
//! | Press-flash | press younger than flash_time | full 0/100 blink on that LED    |
//! | Idle        | otherwise                     | shared breathing sweep          |
//!
//! Exactly one mode applies per LED per frame; error masks press-flash,
//! which masks idle.  The sweep counter and blink clock are shared
//! across all LEDs, so breathing and blinking stay synchronized.
//!
//! [`LedBank`]: crate::drivers::led::LedBank

use crate::config::StationConfig;
use crate::pins::CHANNELS;
use crate::state::PressLog;

pub struct LedAnimator {
    min_bright: u8,
    max_bright: u8,
    flash_time_ms: u64,
    flash_each_ms: u64,
    /// Current sweep brightness, `min_bright..=max_bright`.
    sweep: u8,
    rising: bool,
    wrapped: bool,
}

impl LedAnimator {
    pub fn new(cfg: &StationConfig) -> Self {
        Self {
            min_bright: cfg.min_bright,
            max_bright: cfg.max_bright,
            flash_time_ms: u64::from(cfg.flash_time_ms),
            flash_each_ms: u64::from(cfg.flash_each_ms.max(1)),
            sweep: cfg.min_bright,
            rising: true,
            wrapped: false,
        }
    }

    /// Advance one frame and return the duty cycle (0-100 %) per LED.
    ///
    /// `now_ms` is the monotonic clock; `healthy` is the health flag
    /// sampled at frame start.  Expired press-flashes are cleared from
    /// `presses` as a side effect.
    pub fn tick(&mut self, now_ms: u64, healthy: bool, presses: &PressLog) -> [u8; CHANNELS] {
        let led_on = ((now_ms / self.flash_each_ms) % 2) as u8;
        let sweep = self.advance_sweep();

        let mut duties = [0u8; CHANNELS];
        for (index, duty) in duties.iter_mut().enumerate() {
            *duty = if !healthy {
                // Error override: only LED 0 blinks, everything else dark.
                if index == 0 { led_on * self.max_bright } else { 0 }
            } else {
                let pressed_at = presses.get(index);
                if pressed_at != 0 {
                    if now_ms.saturating_sub(pressed_at) >= self.flash_time_ms {
                        // Flash expired: clear and fall through to idle
                        // for this frame.
                        presses.clear(index);
                        sweep
                    } else {
                        led_on * 100
                    }
                } else {
                    sweep
                }
            };
        }
        duties
    }

    /// True when the last `tick` started a new sweep cycle (the sweep
    /// returned to its minimum).  The controller paces the health probe
    /// on this boundary.
    pub fn cycle_wrapped(&self) -> bool {
        self.wrapped
    }

    fn advance_sweep(&mut self) -> u8 {
        let current = self.sweep;
        self.wrapped = false;
        if self.rising {
            self.sweep += 1;
            if self.sweep >= self.max_bright {
                self.rising = false;
            }
        } else {
            self.sweep -= 1;
            if self.sweep <= self.min_bright {
                self.rising = true;
                self.wrapped = true;
            }
        }
        current
    }
}

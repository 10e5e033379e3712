//! Vote-LED output bank.
//!
//! Thin layer between the animator's per-frame duty array and the LEDC
//! hardware.  Duties are percentages (0-100); conversion to timer ticks
//! happens in `hw_init::ledc_set`.  Writes are change-only so a steady
//! frame costs nothing on the peripheral bus.

use crate::drivers::hw_init;
use crate::pins::{CHANNELS, LED_LEDC_CHANNELS};

pub struct LedBank {
    current: [u8; CHANNELS],
}

impl LedBank {
    pub fn new() -> Self {
        Self {
            // Force the first apply() to write every channel.
            current: [u8::MAX; CHANNELS],
        }
    }

    /// Push a frame of duty percentages to the hardware.  Only channels
    /// whose duty changed since the last frame are written.
    pub fn apply(&mut self, duties: [u8; CHANNELS]) {
        for (index, &duty) in duties.iter().enumerate() {
            if duty != self.current[index] {
                hw_init::ledc_set(LED_LEDC_CHANNELS[index], duty);
                self.current[index] = duty;
            }
        }
    }

    /// Blank all LEDs, e.g. before a controlled shutdown.
    pub fn all_off(&mut self) {
        self.apply([0; CHANNELS]);
    }

    /// Last duties written to the hardware.
    pub fn current(&self) -> [u8; CHANNELS] {
        self.current
    }
}

impl Default for LedBank {
    fn default() -> Self {
        Self::new()
    }
}

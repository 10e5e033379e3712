//! GPIO / peripheral pin assignments for the VoteBox station board.
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.  Change a pin here and it propagates everywhere.
//!
//! Array ordering is load-bearing: button index `i` visually pairs with
//! LED index `i` on the front panel, and the animator relies on that
//! pairing for press-flash feedback.

/// Number of vote channels (button + LED pairs).
pub const CHANNELS: usize = 5;

// ---------------------------------------------------------------------------
// Vote buttons (active-high momentary switches, external pull-down)
// ---------------------------------------------------------------------------

/// One GPIO line per vote button; rising-edge interrupts.
pub const BUTTON_GPIOS: [i32; CHANNELS] = [4, 5, 6, 7, 9];

// ---------------------------------------------------------------------------
// Vote LEDs (one discrete LED per button, LEDC PWM dimming)
// ---------------------------------------------------------------------------

/// One GPIO line per status LED, same panel order as `BUTTON_GPIOS`.
pub const LED_GPIOS: [i32; CHANNELS] = [10, 11, 12, 13, 14];

/// LEDC channel assignment, index-aligned with `LED_GPIOS`.
pub const LED_LEDC_CHANNELS: [u32; CHANNELS] = [0, 1, 2, 3, 4];

// ---------------------------------------------------------------------------
// PWM configuration
// ---------------------------------------------------------------------------

/// LEDC timer resolution (bits).  8-bit gives 0 – 255 duty levels.
pub const PWM_RESOLUTION_BITS: u32 = 8;

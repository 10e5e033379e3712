//! Input/output drivers, hardware initialisation, and peripheral helpers.

pub mod animator;
pub mod button;
pub mod hw_init;
pub mod led;
pub mod watchdog;

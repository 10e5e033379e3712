//! Fuzz target: debounce edge-train handling
//!
//! Replays arbitrary interleavings of ISR edges across all five lines
//! and asserts the per-line window invariant: no two accepted presses
//! on one line are ever closer than the debounce window.
//!
//! cargo fuzz run fuzz_debounce

#![no_main]

use libfuzzer_sys::fuzz_target;
use votebox::drivers::button::ButtonBank;

fuzz_target!(|data: &[u8]| {
    let mut bank = ButtonBank::new(400);
    let mut last_accepted: [Option<u32>; 5] = [None; 5];

    let mut t: u32 = 0;
    for chunk in data.chunks(3) {
        let line = usize::from(chunk[0]) % 5;
        let gap = chunk.get(1).copied().unwrap_or(1) as u32 * 8
            + chunk.get(2).copied().unwrap_or(0) as u32;
        t = t.saturating_add(gap.max(1));

        if let Some(event) = bank.offer(line, t) {
            if let Some(prev) = last_accepted[line] {
                assert!(
                    event.at_ms - prev >= 400,
                    "line {line}: accepted {prev} then {} inside the window",
                    event.at_ms
                );
            }
            last_accepted[line] = Some(event.at_ms);
        }
    }
});

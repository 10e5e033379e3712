//! End-to-end frame-loop scenarios: ISR edge in, LED duties and tally
//! traffic out.
//!
//! The button ISR statics are process-wide, so each test that injects
//! edges uses its own line index to stay independent under the parallel
//! test harness.

use std::sync::Arc;
use std::time::{Duration, Instant};

use votebox::app::controller::Controller;
use votebox::app::ports::TallyPort;
use votebox::config::{Credentials, StationConfig};
use votebox::drivers::button::button_isr_handler;
use votebox::state::{HealthState, PressLog};

use crate::mock_tally::MockTally;

fn station_creds() -> Credentials {
    Credentials {
        uuid: String::from("vb-001122aabbcc"),
        key: String::from("issued-secret"),
    }
}

struct Rig {
    tally: Arc<MockTally>,
    health: Arc<HealthState>,
    controller: Controller,
}

fn rig(tally: MockTally) -> Rig {
    let cfg = StationConfig::default();
    let tally = Arc::new(tally);
    let port: Arc<dyn TallyPort> = tally.clone();
    let presses = Arc::new(PressLog::new());
    let health = Arc::new(HealthState::new());
    let controller = Controller::new(
        &cfg,
        presses,
        Arc::clone(&health),
        port,
        Arc::new(station_creds()),
    );
    Rig {
        tally,
        health,
        controller,
    }
}

fn wait_until(timeout: Duration, mut done: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    done()
}

#[test]
fn press_is_dispatched_flashes_then_returns_to_breathing() {
    let mut r = rig(MockTally::healthy());

    // Rising edge on line 2 at t=1000.
    button_isr_handler(2, 1000);
    let _ = r.controller.frame(1000);

    // The detached worker delivers the vote and raises health.
    assert!(r.tally.wait_for_calls(1, Duration::from_secs(2)));
    assert_eq!(r.tally.vote_count(), 1);
    let health = Arc::clone(&r.health);
    assert!(wait_until(Duration::from_secs(2), move || health.is_ok()));

    // Mid-flash: full-brightness blink on the pressed LED.
    let duties = r.controller.frame(1250);
    assert_eq!(duties[2], 100);
    let duties = r.controller.frame(1500);
    assert_eq!(duties[2], 0);

    // After flash_time the LED rejoins the breathing sweep.
    let duties = r.controller.frame(4000);
    assert!((5..=50).contains(&duties[2]), "duty was {}", duties[2]);
}

#[test]
fn bounce_inside_debounce_window_submits_once() {
    let mut r = rig(MockTally::healthy());

    button_isr_handler(4, 1000);
    let _ = r.controller.frame(1000);
    assert!(r.tally.wait_for_calls(1, Duration::from_secs(2)));

    // Bounce 200ms later: latched but debounced away.
    button_isr_handler(4, 1200);
    let _ = r.controller.frame(1200);
    std::thread::sleep(Duration::from_millis(100));
    assert_eq!(r.tally.vote_count(), 1);

    // A real second press outside the window goes through.
    button_isr_handler(4, 1500);
    let _ = r.controller.frame(1500);
    assert!(r.tally.wait_for_calls(2, Duration::from_secs(2)));
    assert_eq!(r.tally.vote_count(), 2);
}

#[test]
fn unhealthy_station_probes_once_per_sweep_cycle() {
    let mut r = rig(MockTally::unreachable_service());
    assert!(!r.health.is_ok());

    // Two full triangle sweeps: 2 * (max-min) = 90 frames each.
    for frame in 0..181u64 {
        let _ = r.controller.frame(frame * 80);
        // Let the tiny probe thread finish so the in-flight guard is
        // clear before the next cycle boundary.
        std::thread::sleep(Duration::from_millis(1));
    }

    let pings = r.tally.ping_count();
    assert!(
        (1..=3).contains(&pings),
        "expected one probe per sweep cycle, saw {pings}"
    );
    assert!(!r.health.is_ok());
}

#[test]
fn healthy_station_never_probes() {
    let mut r = rig(MockTally::healthy());
    r.health.set_ok(true);

    for frame in 0..181u64 {
        let _ = r.controller.frame(frame * 80);
    }

    // Vote traffic is not asserted here: the ISR statics are shared with
    // the other tests in this binary, which press lines 2 and 4.
    assert_eq!(r.tally.ping_count(), 0);
}

#[test]
fn probe_recovery_restores_breathing() {
    let mut r = rig(MockTally::unreachable_service());

    // Error mode: LED 0 blinking at max_bright, others dark.
    let duties = r.controller.frame(250);
    assert_eq!(duties[0], 50);
    assert_eq!(&duties[1..], &[0, 0, 0, 0]);

    // Service comes back (all endpoints); the next probe flips the flag.
    r.tally.set_ping_response(Ok(crate::mock_tally::reply(200, "")));
    r.tally.set_vote_response(Ok(crate::mock_tally::reply(200, "")));
    for frame in 4..200u64 {
        let _ = r.controller.frame(frame * 80);
        if r.health.is_ok() {
            break;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    let health = Arc::clone(&r.health);
    assert!(wait_until(Duration::from_secs(2), move || health.is_ok()));

    let duties = r.controller.frame(100_000);
    assert!(duties.iter().all(|d| (5..=50).contains(d)));
}

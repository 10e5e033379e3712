//! VoteBox Firmware — Main Entry Point
//!
//! Hexagonal architecture around a fixed-cadence frame loop.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                  │
//! │                                                          │
//! │  HttpTallyAdapter  NvsAdapter     StationWifi            │
//! │  (TallyPort)       (Config+NVS)   (STA link)             │
//! │  StationClock      identity                              │
//! │  (frame clock)     (eFuse MAC → uuid)                    │
//! │                                                          │
//! │  ────────────── Port Trait Boundary ──────────────       │
//! │                                                          │
//! │  ┌──────────────────────────────────────────────────┐    │
//! │  │            Controller (pure logic)               │    │
//! │  │  ButtonBank · LedAnimator · dispatch · probe     │    │
//! │  └──────────────────────────────────────────────────┘    │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! The frame loop runs every `pause_time_ms`: drain buttons, animate,
//! write LED duties, poll WiFi, feed the watchdog.  Network work never
//! runs on this thread.
#![deny(unused_must_use)]

use std::sync::Arc;

use anyhow::{Context, Result};
use log::{error, info, warn};

use votebox::adapters::http::HttpTallyAdapter;
use votebox::adapters::nvs::NvsAdapter;
use votebox::adapters::time::StationClock;
use votebox::adapters::wifi::StationWifi;
use votebox::app::controller::Controller;
use votebox::app::ports::{ConfigPort, TallyPort};
use votebox::config::{Credentials, StationConfig};
use votebox::drivers::led::LedBank;
use votebox::drivers::{hw_init, watchdog};
use votebox::net::provision;
use votebox::state::{HealthState, PressLog};

/// Frame-loop stall budget before the TWDT resets the board.
const WATCHDOG_TIMEOUT_MS: u32 = 10_000;

// Burned in at build time; stations are flashed per deployment site.
const WIFI_SSID: &str = match option_env!("VOTEBOX_WIFI_SSID") {
    Some(ssid) => ssid,
    None => "votebox-net",
};
const WIFI_PASSWORD: &str = match option_env!("VOTEBOX_WIFI_PASSWORD") {
    Some(pass) => pass,
    None => "",
};

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  VoteBox v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    // ── 2. Load config from NVS (or defaults) ─────────────────
    let mut nvs = match NvsAdapter::new() {
        Ok(n) => n,
        Err(e) => {
            error!("NVS init failed ({e}) — halting");
            anyhow::bail!("NVS init failed: {e}");
        }
    };
    let config = match nvs.load() {
        Ok(cfg) => {
            info!("Config loaded from NVS");
            cfg
        }
        Err(e) => {
            warn!("NVS config load failed ({e}), using defaults");
            StationConfig::default()
        }
    };

    // ── 3. Hardware peripherals ───────────────────────────────
    if let Err(e) = hw_init::init_peripherals(&config) {
        // Peripheral init failure is critical — log and halt.
        // In production this triggers the watchdog reset after timeout.
        error!("HAL init failed: {e} — halting");
        #[allow(clippy::empty_loop)]
        loop {}
    }
    if let Err(e) = hw_init::init_isr_service() {
        error!("ISR service init failed: {e} — continuing without buttons");
    }
    let watchdog = watchdog::Watchdog::new(WATCHDOG_TIMEOUT_MS);

    // ── 4. WiFi station link ──────────────────────────────────
    let peripherals =
        esp_idf_svc::hal::peripherals::Peripherals::take().context("peripherals already taken")?;
    let sysloop = esp_idf_svc::eventloop::EspSystemEventLoop::take()?;
    let nvs_partition = esp_idf_svc::nvs::EspDefaultNvsPartition::take()?;
    let mut wifi = StationWifi::connect(
        peripherals.modem,
        sysloop,
        nvs_partition,
        WIFI_SSID,
        WIFI_PASSWORD,
    )
    .context("WiFi init failed")?;

    // ── 5. Tally port + credentials ───────────────────────────
    let tally: Arc<dyn TallyPort> = Arc::new(HttpTallyAdapter::new(&config));
    let creds = match provision::ensure_credentials(&mut nvs, tally.as_ref()) {
        Ok(creds) => creds,
        Err(e) => {
            // Unprovisioned stations keep running: the error LED and the
            // log line tell the operator, and the next boot retries.
            error!("provisioning incomplete ({e}); running without API key");
            Credentials {
                uuid: votebox::adapters::identity::station_uuid(
                    &votebox::adapters::identity::read_mac(),
                )
                .as_str()
                .to_string(),
                key: String::new(),
            }
        }
    };
    info!("Station ID: {}", creds.uuid);

    // ── 6. Shared state + controller ──────────────────────────
    let presses = Arc::new(PressLog::new());
    let health = Arc::new(HealthState::new());
    let creds = Arc::new(creds);
    let mut controller = Controller::new(
        &config,
        Arc::clone(&presses),
        Arc::clone(&health),
        Arc::clone(&tally),
        Arc::clone(&creds),
    );
    let mut leds = LedBank::new();
    leds.all_off();

    // ── 7. Startup connectivity check ─────────────────────────
    // Synchronous on purpose: boot is the one time a blocking probe is
    // acceptable, and it settles the health LED before the first frame.
    controller.probe().run(tally.as_ref(), &creds, &health);

    info!("System ready. Entering frame loop.");

    // ── 8. Frame loop ─────────────────────────────────────────
    let clock = StationClock::new();
    loop {
        let now_ms = clock.now_ms();
        let duties = controller.frame(now_ms);
        leds.apply(duties);
        wifi.poll(now_ms);
        watchdog.feed();
        std::thread::sleep(std::time::Duration::from_millis(u64::from(
            config.pause_time_ms,
        )));
    }
}

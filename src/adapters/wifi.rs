//! WiFi station-mode adapter.
//!
//! Keeps the station associated with the configured access point so the
//! vote dispatch and health probe threads always have a usable netif.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: real ESP-IDF WiFi driver via
//!   `esp_idf_svc::wifi::BlockingWifi`.
//! - **all other targets**: simulation stubs for host-side tests.
//!
//! ## Reconnection policy
//!
//! On disconnect, `poll()` retries with exponential backoff (2 s → 4 s →
//! 8 s … capped at 60 s).  The frame loop keeps animating throughout;
//! the resulting request failures surface through the health flag, not
//! here.

use core::fmt;
use log::{info, warn};

#[cfg(target_os = "espidf")]
use esp_idf_svc::{
    eventloop::EspSystemEventLoop,
    hal::modem::Modem,
    nvs::EspDefaultNvsPartition,
    wifi::{AuthMethod, BlockingWifi, ClientConfiguration, Configuration, EspWifi},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WifiError {
    InvalidSsid,
    InvalidPassword,
    DriverInit,
    ConnectFailed,
}

impl fmt::Display for WifiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSsid => write!(f, "SSID invalid (must be 1-32 printable ASCII bytes)"),
            Self::InvalidPassword => {
                write!(f, "password invalid (must be 8-64 bytes for WPA2, or empty for open)")
            }
            Self::DriverInit => write!(f, "WiFi driver init failed"),
            Self::ConnectFailed => write!(f, "WiFi connection failed"),
        }
    }
}

impl std::error::Error for WifiError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WifiState {
    Disconnected,
    Connected,
    Reconnecting { attempt: u32 },
}

const INITIAL_BACKOFF_SECS: u32 = 2;
const MAX_BACKOFF_SECS: u32 = 60;

fn is_printable_ascii(s: &str) -> bool {
    s.bytes().all(|b| (0x20..=0x7E).contains(&b))
}

fn validate_ssid(ssid: &str) -> Result<(), WifiError> {
    if ssid.is_empty() || ssid.len() > 32 || !is_printable_ascii(ssid) {
        return Err(WifiError::InvalidSsid);
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), WifiError> {
    if password.is_empty() {
        return Ok(());
    }
    if password.len() < 8 || password.len() > 64 {
        return Err(WifiError::InvalidPassword);
    }
    Ok(())
}

pub struct StationWifi {
    state: WifiState,
    ssid: heapless::String<32>,
    backoff_secs: u32,
    /// Monotonic deadline (ms) before the next reconnect attempt.
    retry_at_ms: u64,
    #[cfg(target_os = "espidf")]
    wifi: BlockingWifi<EspWifi<'static>>,
}

impl StationWifi {
    /// Build the driver and associate with the AP.  Blocks until the
    /// netif is up or the first attempt fails (later attempts happen in
    /// `poll()`).
    #[cfg(target_os = "espidf")]
    pub fn connect(
        modem: Modem,
        sysloop: EspSystemEventLoop,
        nvs: EspDefaultNvsPartition,
        ssid: &str,
        password: &str,
    ) -> Result<Self, WifiError> {
        validate_ssid(ssid)?;
        validate_password(password)?;

        let esp_wifi =
            EspWifi::new(modem, sysloop.clone(), Some(nvs)).map_err(|_| WifiError::DriverInit)?;
        let mut wifi =
            BlockingWifi::wrap(esp_wifi, sysloop).map_err(|_| WifiError::DriverInit)?;

        let auth_method = if password.is_empty() {
            AuthMethod::None
        } else {
            AuthMethod::WPA2Personal
        };
        let client_cfg = ClientConfiguration {
            ssid: ssid.try_into().map_err(|_| WifiError::InvalidSsid)?,
            password: password.try_into().map_err(|_| WifiError::InvalidPassword)?,
            auth_method,
            ..Default::default()
        };
        wifi.set_configuration(&Configuration::Client(client_cfg))
            .map_err(|_| WifiError::DriverInit)?;
        wifi.start().map_err(|_| WifiError::DriverInit)?;

        let mut adapter = Self {
            state: WifiState::Disconnected,
            ssid: heapless::String::try_from(ssid).map_err(|_| WifiError::InvalidSsid)?,
            backoff_secs: INITIAL_BACKOFF_SECS,
            retry_at_ms: 0,
            wifi,
        };
        adapter.try_associate(0);
        Ok(adapter)
    }

    /// Simulation: always "associates" immediately.
    #[cfg(not(target_os = "espidf"))]
    pub fn connect(ssid: &str, password: &str) -> Result<Self, WifiError> {
        validate_ssid(ssid)?;
        validate_password(password)?;
        info!("WiFi(sim): connected to '{ssid}'");
        Ok(Self {
            state: WifiState::Connected,
            ssid: heapless::String::try_from(ssid).map_err(|_| WifiError::InvalidSsid)?,
            backoff_secs: INITIAL_BACKOFF_SECS,
            retry_at_ms: 0,
        })
    }

    pub fn state(&self) -> WifiState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        #[cfg(target_os = "espidf")]
        {
            self.wifi.is_connected().unwrap_or(false)
        }
        #[cfg(not(target_os = "espidf"))]
        {
            self.state == WifiState::Connected
        }
    }

    /// Call once per frame.  Cheap when connected; schedules backed-off
    /// reconnect attempts otherwise.
    pub fn poll(&mut self, now_ms: u64) {
        if self.is_connected() {
            if self.state != WifiState::Connected {
                info!("WiFi: reconnected to '{}'", self.ssid);
                self.state = WifiState::Connected;
                self.backoff_secs = INITIAL_BACKOFF_SECS;
            }
            return;
        }

        match self.state {
            WifiState::Connected | WifiState::Disconnected => {
                warn!("WiFi: link down, retrying in {}s", self.backoff_secs);
                self.retry_at_ms = now_ms + u64::from(self.backoff_secs) * 1000;
                self.state = WifiState::Reconnecting { attempt: 1 };
            }
            WifiState::Reconnecting { attempt } => {
                if now_ms >= self.retry_at_ms {
                    self.try_associate(attempt);
                    if self.is_connected() {
                        info!("WiFi: reconnected to '{}' (attempt {attempt})", self.ssid);
                        self.state = WifiState::Connected;
                        self.backoff_secs = INITIAL_BACKOFF_SECS;
                    } else {
                        self.backoff_secs = (self.backoff_secs * 2).min(MAX_BACKOFF_SECS);
                        self.retry_at_ms = now_ms + u64::from(self.backoff_secs) * 1000;
                        self.state = WifiState::Reconnecting {
                            attempt: attempt.saturating_add(1),
                        };
                    }
                }
            }
        }
    }

    #[cfg(target_os = "espidf")]
    fn try_associate(&mut self, attempt: u32) {
        if let Err(e) = self.wifi.connect() {
            warn!("WiFi: connect failed (attempt {attempt}): {e}");
            return;
        }
        if let Err(e) = self.wifi.wait_netif_up() {
            warn!("WiFi: netif not up (attempt {attempt}): {e}");
            return;
        }
        self.state = WifiState::Connected;
        info!("WiFi: associated with '{}'", self.ssid);
    }

    #[cfg(not(target_os = "espidf"))]
    fn try_associate(&mut self, _attempt: u32) {
        self.state = WifiState::Connected;
    }

    /// Force the simulated link down (tests only).
    #[cfg(all(test, not(target_os = "espidf")))]
    fn sim_drop_link(&mut self) {
        self.state = WifiState::Disconnected;
    }
}

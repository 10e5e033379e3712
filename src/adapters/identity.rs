//! Station identity derived from the ESP32 factory MAC address.
//!
//! Produces the stable station uuid `vb-xxxxxxxxxxxx` (all 6 MAC bytes
//! in lowercase hex). The uuid is:
//! - Deterministic across reboots (factory-burned eFuse MAC)
//! - The `uuid` field of every vote submission
//! - The Basic-auth username on every authenticated request

/// Fixed-size station uuid string: "vb-" + 12 hex chars.
pub type StationUuid = heapless::String<16>;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory MAC address from eFuse.
#[cfg(target_os = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    unsafe {
        esp_idf_svc::sys::esp_efuse_mac_get_default(mac.as_mut_ptr());
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(target_os = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

/// Derive the station uuid from the full MAC.
/// Format: `vb-xxxxxxxxxxxx` (e.g. `vb-deadbeefcafe`).
pub fn station_uuid(mac: &MacAddress) -> StationUuid {
    let mut id = StationUuid::new();
    use core::fmt::Write;
    let _ = write!(
        id,
        "vb-{:02x}{:02x}{:02x}{:02x}{:02x}{:02x}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    );
    id
}

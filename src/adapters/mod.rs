//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements   | Connects to                |
//! |------------|--------------|----------------------------|
//! | `http`     | TallyPort    | ESP-IDF HTTPS client       |
//! | `identity` | —            | eFuse factory MAC          |
//! | `nvs`      | ConfigPort   | NVS / in-memory store      |
//! |            | StoragePort  |                            |
//! | `time`     | —            | ESP32 system timer         |
//! | `wifi`     | —            | ESP-IDF WiFi STA           |

pub mod http;
pub mod identity;
pub mod nvs;
pub mod time;
pub mod wifi;

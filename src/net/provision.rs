//! First-boot credential provisioning.
//!
//! A station needs two credentials before it can authenticate: its uuid
//! (derived from the factory MAC, persisted so it survives board swaps
//! of the identity logic) and the API secret key, handed out once by the
//! tally service's `GET /key?uuid=` endpoint.
//!
//! Provisioning is idempotent: anything already stored is reused, only
//! the gaps are filled.  A station that cannot obtain a key keeps
//! running unprovisioned — the error LED and a critical log line tell
//! the operator to intervene — and retries on next boot.

use log::{error, info};
use serde::Deserialize;

use crate::adapters::identity;
use crate::adapters::nvs::{CRED_API_KEY, CRED_NAMESPACE, CRED_UUID_KEY};
use crate::app::ports::{StoragePort, TallyPort};
use crate::config::Credentials;
use crate::error::{Error, Result};

/// Wire shape of the `GET /key` response.
#[derive(Deserialize)]
struct KeyResponse {
    key: String,
}

fn read_string<S: StoragePort>(store: &S, key: &str) -> Option<String> {
    let mut buf = [0u8; 128];
    let len = store.read(CRED_NAMESPACE, key, &mut buf).ok()?;
    let s = core::str::from_utf8(&buf[..len]).ok()?;
    if s.is_empty() { None } else { Some(s.to_string()) }
}

/// Load credentials, filling any gaps: derive and persist the uuid if
/// absent, fetch and persist the API key if absent.
///
/// Returns `Err(CredentialMissing)` when the key can neither be loaded
/// nor fetched; the returned error leaves the stored uuid intact so the
/// next attempt asks for the same station.
pub fn ensure_credentials<S: StoragePort>(
    store: &mut S,
    port: &dyn TallyPort,
) -> Result<Credentials> {
    let uuid = match read_string(store, CRED_UUID_KEY) {
        Some(uuid) => uuid,
        None => {
            let derived = identity::station_uuid(&identity::read_mac());
            store
                .write(CRED_NAMESPACE, CRED_UUID_KEY, derived.as_bytes())
                .map_err(|_| Error::Config("uuid persist failed"))?;
            info!("provision: derived station uuid {derived}");
            derived.as_str().to_string()
        }
    };

    if let Some(key) = read_string(store, CRED_API_KEY) {
        return Ok(Credentials { uuid, key });
    }

    info!("provision: no stored API key, requesting one for {uuid}");
    match port.fetch_key(&uuid) {
        Ok(reply) if reply.is_success() => {
            let parsed: KeyResponse = serde_json::from_str(reply.body.as_str())
                .map_err(|_| Error::Config("key response malformed"))?;
            if parsed.key.is_empty() {
                return Err(Error::Config("key response empty"));
            }
            store
                .write(CRED_NAMESPACE, CRED_API_KEY, parsed.key.as_bytes())
                .map_err(|_| Error::Config("key persist failed"))?;
            info!("provision: API key stored");
            Ok(Credentials {
                uuid,
                key: parsed.key,
            })
        }
        Ok(reply) => {
            error!(
                "provision: key request refused (status {}) — station stays unprovisioned",
                reply.status
            );
            Err(Error::CredentialMissing)
        }
        Err(e) => {
            error!("provision: key request failed ({e}) — station stays unprovisioned");
            Err(Error::CredentialMissing)
        }
    }
}

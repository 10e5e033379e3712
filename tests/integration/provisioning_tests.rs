//! First-boot provisioning flow against the mock tally service and the
//! simulated NVS store, chained into the first authenticated request.

use votebox::adapters::nvs::NvsAdapter;
use votebox::error::Error;
use votebox::net::dispatch::dispatch_vote;
use votebox::net::provision::ensure_credentials;
use votebox::net::token;
use votebox::state::HealthState;

use crate::mock_tally::{MockTally, TallyCall, reply};

#[test]
fn provisioned_key_signs_the_first_vote() {
    let mut nvs = NvsAdapter::new().unwrap();
    let tally = MockTally::healthy();

    let creds = ensure_credentials(&mut nvs, &tally).unwrap();
    assert_eq!(creds.uuid, "vb-deadbeefcafe");
    assert_eq!(creds.key, "issued-secret");

    // The key request named this station.
    assert!(matches!(
        &tally.calls()[0],
        TallyCall::FetchKey { uuid } if uuid == "vb-deadbeefcafe"
    ));

    // The very next vote authenticates with the freshly issued key.
    let health = HealthState::new();
    dispatch_vote(&tally, &creds, &health, 3).unwrap();
    assert!(health.is_ok());
    match last_call(&tally) {
        TallyCall::Vote { token: tok, username, .. } => {
            assert_eq!(username, "vb-deadbeefcafe");
            assert!(token::verify(b"issued-secret", &tok).is_some());
        }
        other => panic!("expected a vote, got {other:?}"),
    }
}

#[test]
fn refused_key_request_keeps_station_unprovisioned() {
    let mut nvs = NvsAdapter::new().unwrap();
    let tally = MockTally::healthy();
    tally.set_key_response(Ok(reply(404, "unknown station")));

    assert_eq!(
        ensure_credentials(&mut nvs, &tally).unwrap_err(),
        Error::CredentialMissing
    );

    // Re-running does not duplicate the stored uuid and asks again.
    assert!(ensure_credentials(&mut nvs, &tally).is_err());
    let fetches = tally
        .calls()
        .iter()
        .filter(|c| matches!(c, TallyCall::FetchKey { .. }))
        .count();
    assert_eq!(fetches, 2);
}

fn last_call(tally: &MockTally) -> TallyCall {
    tally.calls().last().cloned().expect("at least one call")
}

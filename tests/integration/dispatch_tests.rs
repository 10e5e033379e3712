//! Vote dispatch against the mock tally service: wire format, auth,
//! and health-flag folding.

use std::sync::Arc;
use std::time::Duration;

use votebox::config::Credentials;
use votebox::error::{Error, TransportError};
use votebox::net::dispatch::{dispatch_vote, spawn_dispatch};
use votebox::net::token;
use votebox::state::HealthState;

use crate::mock_tally::{MockTally, TallyCall, reply};

fn station_creds() -> Credentials {
    Credentials {
        uuid: String::from("vb-001122aabbcc"),
        key: String::from("issued-secret"),
    }
}

#[test]
fn accepted_vote_raises_health_and_posts_wire_body() {
    let tally = MockTally::healthy();
    let health = HealthState::new();
    let creds = station_creds();

    dispatch_vote(&tally, &creds, &health, 2).unwrap();

    assert!(health.is_ok());
    let calls = tally.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        TallyCall::Vote {
            body,
            username,
            token: tok,
        } => {
            assert_eq!(body, r#"{"button":2,"uuid":"vb-001122aabbcc"}"#);
            assert_eq!(username, "vb-001122aabbcc");
            // The Basic-auth password is a token signed with the station key.
            assert!(token::verify(b"issued-secret", tok).is_some());
        }
        other => panic!("expected a vote, got {other:?}"),
    }
}

#[test]
fn rejected_vote_lowers_health() {
    let tally = MockTally::healthy();
    tally.set_vote_response(Ok(reply(403, "bad token")));
    let health = HealthState::new();
    health.set_ok(true);

    let err = dispatch_vote(&tally, &station_creds(), &health, 0).unwrap_err();
    assert_eq!(err, Error::RemoteRejected { status: 403 });
    assert!(!health.is_ok());
}

#[test]
fn transport_failure_lowers_health() {
    let tally = MockTally::unreachable_service();
    let health = HealthState::new();
    health.set_ok(true);

    let err = dispatch_vote(&tally, &station_creds(), &health, 4).unwrap_err();
    assert_eq!(err, Error::Transport(TransportError::Connect));
    assert!(!health.is_ok());
    // The request was attempted: transport failed, not short-circuited.
    assert_eq!(tally.vote_count(), 1);
}

#[test]
fn missing_key_short_circuits_before_any_request() {
    let tally = MockTally::healthy();
    let health = HealthState::new();
    let unprovisioned = Credentials {
        uuid: String::from("vb-001122aabbcc"),
        key: String::new(),
    };

    let err = dispatch_vote(&tally, &unprovisioned, &health, 1).unwrap_err();
    assert_eq!(err, Error::CredentialMissing);
    assert!(!health.is_ok());
    assert!(tally.calls().is_empty());
}

#[test]
fn spawned_dispatches_run_independently() {
    let tally = Arc::new(MockTally::healthy());
    let port: Arc<dyn votebox::app::ports::TallyPort> = tally.clone();
    let health = Arc::new(HealthState::new());
    let creds = Arc::new(station_creds());

    // Five presses in the same frame: five independent submissions.
    for button in 0..5 {
        spawn_dispatch(
            Arc::clone(&port),
            Arc::clone(&creds),
            Arc::clone(&health),
            button,
        );
    }

    assert!(tally.wait_for_calls(5, Duration::from_secs(2)));
    assert_eq!(tally.vote_count(), 5);
    assert!(health.is_ok());

    // Each token is unique — no nonce reuse across workers.
    let mut tokens: Vec<String> = tally
        .calls()
        .iter()
        .filter_map(|c| match c {
            TallyCall::Vote { token, .. } => Some(token.clone()),
            _ => None,
        })
        .collect();
    tokens.sort();
    tokens.dedup();
    assert_eq!(tokens.len(), 5);
}

//! Fire-and-forget vote submission.
//!
//! Each accepted press spawns a short-lived worker thread that signs a
//! token, POSTs the vote, folds the outcome into the shared health flag,
//! and exits.  The frame loop never waits on a submission, and parallel
//! submissions never wait on each other.
//!
//! A vote is never retried: the press-flash already told the voter their
//! press registered locally, and the health LED tells the operator when
//! deliveries are failing.

use std::sync::Arc;

use log::{error, info};
use serde::Serialize;

use crate::app::ports::{BasicAuth, TallyPort};
use crate::config::Credentials;
use crate::error::{Error, Result};
use crate::net::token;
use crate::state::HealthState;

/// Wire body of `POST /vote`.
#[derive(Serialize)]
struct VotePayload<'a> {
    button: usize,
    uuid: &'a str,
}

/// Render the JSON body for a vote on `button` from station `uuid`.
pub fn make_vote_body(button: usize, uuid: &str) -> String {
    // Struct-to-JSON of two plain fields cannot fail.
    serde_json::to_string(&VotePayload { button, uuid }).unwrap_or_default()
}

/// Build the per-request Basic auth pair: uuid as username, a freshly
/// signed token as password.
pub fn make_auth(creds: &Credentials) -> Result<BasicAuth> {
    if !creds.has_key() {
        return Err(Error::CredentialMissing);
    }
    let epoch = crate::adapters::time::epoch_secs().unwrap_or(0);
    Ok(BasicAuth {
        username: creds.uuid.clone(),
        password: token::issue(creds.key.as_bytes(), epoch),
    })
}

/// Cap and flatten a response-body excerpt for a single log line.
fn sanitize_excerpt(body: &str) -> String {
    body.chars()
        .take(100)
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect()
}

/// Submit one vote synchronously and fold the outcome into `health`.
///
/// Every outcome is terminal: success raises the health flag, any
/// failure lowers it and logs exactly one line.  The returned `Result`
/// reports the same outcome for callers that want it (tests, the
/// startup path); `spawn_dispatch` discards it.
pub fn dispatch_vote(
    port: &dyn TallyPort,
    creds: &Credentials,
    health: &HealthState,
    button: usize,
) -> Result<()> {
    let auth = match make_auth(creds) {
        Ok(auth) => auth,
        Err(e) => {
            health.set_ok(false);
            error!("vote {button}: cannot submit, {e}");
            return Err(e);
        }
    };

    let body = make_vote_body(button, &creds.uuid);
    match port.post_vote(&body, &auth) {
        Ok(reply) if reply.is_success() => {
            health.set_ok(true);
            info!("vote {button}: accepted");
            Ok(())
        }
        Ok(reply) => {
            health.set_ok(false);
            error!(
                "vote {button}: rejected, status {} body '{}'",
                reply.status,
                sanitize_excerpt(&reply.body)
            );
            Err(Error::RemoteRejected {
                status: reply.status,
            })
        }
        Err(e) => {
            health.set_ok(false);
            error!("vote {button}: submit failed, {e}");
            Err(e)
        }
    }
}

/// Detach a worker thread for one vote.  Never blocks the caller.
pub fn spawn_dispatch(
    port: Arc<dyn TallyPort>,
    creds: Arc<Credentials>,
    health: Arc<HealthState>,
    button: usize,
) {
    let worker_health = Arc::clone(&health);
    let spawned = std::thread::Builder::new()
        .name(format!("vote-{button}"))
        // Room for the mbedTLS handshake on target.
        .stack_size(24 * 1024)
        .spawn(move || {
            let _ = dispatch_vote(port.as_ref(), &creds, &worker_health, button);
        });
    if let Err(e) = spawned {
        // Thread exhaustion: treat like any other delivery failure.
        health.set_ok(false);
        error!("vote {button}: worker spawn failed: {e}");
    }
}

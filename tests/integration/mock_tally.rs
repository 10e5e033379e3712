//! Mock tally service for integration tests.
//!
//! Records every request so tests can assert on the full traffic
//! history, and answers from a scripted response per endpoint.  All
//! interior state sits behind mutexes because dispatch and probe
//! workers call in from detached threads.

use std::sync::Mutex;
use std::time::{Duration, Instant};

use votebox::app::ports::{BasicAuth, TallyPort, TallyReply};
use votebox::error::{Error, Result, TransportError};

// ── Request record ────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum TallyCall {
    Vote {
        body: String,
        username: String,
        token: String,
    },
    Ping {
        username: String,
    },
    FetchKey {
        uuid: String,
    },
}

// ── MockTally ─────────────────────────────────────────────────

pub struct MockTally {
    pub calls: Mutex<Vec<TallyCall>>,
    vote_response: Mutex<Result<TallyReply>>,
    ping_response: Mutex<Result<TallyReply>>,
    key_response: Mutex<Result<TallyReply>>,
}

#[allow(dead_code)]
impl MockTally {
    /// Every endpoint answers 200 with an empty body.
    pub fn healthy() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            vote_response: Mutex::new(Ok(reply(200, ""))),
            ping_response: Mutex::new(Ok(reply(200, ""))),
            key_response: Mutex::new(Ok(reply(200, r#"{"key":"issued-secret"}"#))),
        }
    }

    /// Every endpoint fails at the transport layer.
    pub fn unreachable_service() -> Self {
        let down = || Mutex::new(Err(Error::Transport(TransportError::Connect)));
        Self {
            calls: Mutex::new(Vec::new()),
            vote_response: down(),
            ping_response: down(),
            key_response: down(),
        }
    }

    pub fn set_vote_response(&self, response: Result<TallyReply>) {
        *self.vote_response.lock().unwrap() = response;
    }

    pub fn set_ping_response(&self, response: Result<TallyReply>) {
        *self.ping_response.lock().unwrap() = response;
    }

    pub fn set_key_response(&self, response: Result<TallyReply>) {
        *self.key_response.lock().unwrap() = response;
    }

    pub fn calls(&self) -> Vec<TallyCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn vote_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, TallyCall::Vote { .. }))
            .count()
    }

    pub fn ping_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, TallyCall::Ping { .. }))
            .count()
    }

    /// Block until at least `n` calls have been recorded.  Detached
    /// dispatch/probe threads make call arrival asynchronous.
    pub fn wait_for_calls(&self, n: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.calls.lock().unwrap().len() >= n {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        self.calls.lock().unwrap().len() >= n
    }
}

pub fn reply(status: u16, body: &str) -> TallyReply {
    let mut excerpt = heapless::String::new();
    let _ = excerpt.push_str(body);
    TallyReply {
        status,
        body: excerpt,
    }
}

impl TallyPort for MockTally {
    fn post_vote(&self, json_body: &str, auth: &BasicAuth) -> Result<TallyReply> {
        self.calls.lock().unwrap().push(TallyCall::Vote {
            body: json_body.to_string(),
            username: auth.username.clone(),
            token: auth.password.clone(),
        });
        self.vote_response.lock().unwrap().clone()
    }

    fn ping(&self, auth: &BasicAuth) -> Result<TallyReply> {
        self.calls.lock().unwrap().push(TallyCall::Ping {
            username: auth.username.clone(),
        });
        self.ping_response.lock().unwrap().clone()
    }

    fn fetch_key(&self, uuid: &str) -> Result<TallyReply> {
        self.calls.lock().unwrap().push(TallyCall::FetchKey {
            uuid: uuid.to_string(),
        });
        self.key_response.lock().unwrap().clone()
    }
}

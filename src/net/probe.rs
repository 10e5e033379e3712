//! Background connection health probe.
//!
//! While the station is unhealthy, the controller fires one probe per
//! animation sweep cycle.  The probe pings the tally service on a
//! detached thread; the frame loop never blocks on it, and an in-flight
//! guard ensures at most one probe runs at a time no matter how slow
//! the network is.
//!
//! Failure logging is edge-triggered: the first failure after a healthy
//! (or never-probed) stretch logs at error level, repeats stay quiet
//! until the link recovers.  Recovery always logs.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{error, info};

use crate::app::ports::TallyPort;
use crate::config::Credentials;
use crate::net::dispatch::make_auth;
use crate::state::HealthState;

pub struct HealthProbe {
    /// Set once a failure has been logged; cleared on recovery.
    reported: AtomicBool,
    /// Single-flight guard for the detached probe thread.
    in_flight: AtomicBool,
}

impl HealthProbe {
    pub const fn new() -> Self {
        Self {
            reported: AtomicBool::new(false),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Run one probe synchronously.  Used by the startup connectivity
    /// check and by `spawn`'s worker thread.
    pub fn run(&self, port: &dyn TallyPort, creds: &Credentials, health: &HealthState) {
        let auth = match make_auth(creds) {
            Ok(auth) => auth,
            Err(e) => {
                self.fail(health, &format!("{e}"));
                return;
            }
        };

        match port.ping(&auth) {
            Ok(reply) if reply.is_success() => {
                health.set_ok(true);
                self.reported.store(false, Ordering::Release);
                info!("connection tested and working");
            }
            Ok(reply) => {
                self.fail(health, &format!("ping rejected, status {}", reply.status));
            }
            Err(e) => {
                self.fail(health, &format!("ping failed, {e}"));
            }
        }
    }

    /// Fire a probe on a detached thread.  No-op while a previous probe
    /// is still in flight.
    pub fn spawn(
        self: &Arc<Self>,
        port: Arc<dyn TallyPort>,
        creds: Arc<Credentials>,
        health: Arc<HealthState>,
    ) {
        if self.in_flight.swap(true, Ordering::AcqRel) {
            return;
        }
        let probe = Arc::clone(self);
        let spawned = std::thread::Builder::new()
            .name(String::from("health-probe"))
            // Room for the mbedTLS handshake on target.
            .stack_size(24 * 1024)
            .spawn(move || {
                probe.run(port.as_ref(), &creds, &health);
                probe.in_flight.store(false, Ordering::Release);
            });
        if spawned.is_err() {
            self.in_flight.store(false, Ordering::Release);
        }
    }

    fn fail(&self, health: &HealthState, reason: &str) {
        health.set_ok(false);
        // Log the transition into failure once, not every retry.
        if !self.reported.swap(true, Ordering::AcqRel) {
            error!("service unreachable: {reason}");
        }
    }
}

impl Default for HealthProbe {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;

    use crate::app::ports::{BasicAuth, TallyReply};
    use crate::error::{Error, TransportError};

    struct ScriptedPort {
        calls: AtomicU32,
        /// `true` entries answer 200, `false` entries fail to connect.
        script: Vec<bool>,
    }

    impl TallyPort for ScriptedPort {
        fn post_vote(&self, _: &str, _: &BasicAuth) -> crate::error::Result<TallyReply> {
            unreachable!("probe never posts votes")
        }

        fn ping(&self, _: &BasicAuth) -> crate::error::Result<TallyReply> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) as usize;
            if *self.script.get(n).unwrap_or(&false) {
                Ok(TallyReply {
                    status: 200,
                    body: heapless::String::new(),
                })
            } else {
                Err(Error::Transport(TransportError::Connect))
            }
        }

        fn fetch_key(&self, _: &str) -> crate::error::Result<TallyReply> {
            unreachable!("probe never provisions")
        }
    }

    fn creds() -> Credentials {
        Credentials {
            uuid: String::from("vb-abc"),
            key: String::from("shhh"),
        }
    }

    #[test]
    fn success_raises_health() {
        let probe = HealthProbe::new();
        let port = ScriptedPort {
            calls: AtomicU32::new(0),
            script: vec![true],
        };
        let health = HealthState::new();
        probe.run(&port, &creds(), &health);
        assert!(health.is_ok());
    }

    #[test]
    fn failure_lowers_health_and_arms_report_latch() {
        let probe = HealthProbe::new();
        let port = ScriptedPort {
            calls: AtomicU32::new(0),
            script: vec![false, false, true],
        };
        let health = HealthState::new();
        health.set_ok(true);

        probe.run(&port, &creds(), &health);
        assert!(!health.is_ok());
        assert!(probe.reported.load(Ordering::SeqCst));

        // Second failure keeps the latch set (no duplicate report).
        probe.run(&port, &creds(), &health);
        assert!(probe.reported.load(Ordering::SeqCst));

        // Recovery clears the latch for the next outage.
        probe.run(&port, &creds(), &health);
        assert!(health.is_ok());
        assert!(!probe.reported.load(Ordering::SeqCst));
    }

    #[test]
    fn missing_key_fails_without_pinging() {
        let probe = HealthProbe::new();
        let port = ScriptedPort {
            calls: AtomicU32::new(0),
            script: vec![true],
        };
        let health = HealthState::new();
        let unprovisioned = Credentials {
            uuid: String::from("vb-abc"),
            key: String::new(),
        };
        probe.run(&port, &unprovisioned, &health);
        assert!(!health.is_ok());
        assert_eq!(port.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn spawn_is_single_flight() {
        let probe = Arc::new(HealthProbe::new());
        // Claim the guard as if a probe were in flight.
        assert!(!probe.in_flight.swap(true, Ordering::AcqRel));
        let port: Arc<dyn TallyPort> = Arc::new(ScriptedPort {
            calls: AtomicU32::new(0),
            script: vec![true],
        });
        let health = Arc::new(HealthState::new());
        probe.spawn(Arc::clone(&port), Arc::new(creds()), Arc::clone(&health));
        // The spawn was refused: no ping happened and the flag is untouched.
        std::thread::sleep(std::time::Duration::from_millis(50));
        assert!(!health.is_ok());
        probe.in_flight.store(false, Ordering::Release);
    }
}

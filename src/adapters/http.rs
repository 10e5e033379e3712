//! HTTPS adapter for the remote tally service.
//!
//! Implements [`TallyPort`] on top of the ESP-IDF HTTP client.  Each
//! request opens a fresh connection: the adapter itself holds only the
//! base URL and timeout, so it is cheaply cloneable and safe to share
//! across the detached dispatch and probe threads.
//!
//! TLS uses the ESP-IDF certificate bundle (`crt_bundle_attach`), the
//! same trust store the rest of the device relies on.
//!
//! On non-ESP targets every request fails with a connect error; host
//! tests exercise the network paths through mock ports instead.

use crate::app::ports::{BasicAuth, TallyPort, TallyReply};
use crate::config::StationConfig;
use crate::error::{Error, Result, TransportError};

#[derive(Debug, Clone)]
pub struct HttpTallyAdapter {
    base_url: String,
    timeout_secs: u32,
}

impl HttpTallyAdapter {
    pub fn new(cfg: &StationConfig) -> Self {
        Self {
            base_url: cfg.service_url.as_str().to_string(),
            timeout_secs: cfg.ping_timeout_secs,
        }
    }

    fn url(&self, path: &str) -> String {
        // base_url carries the trailing slash (validated on save).
        format!("{}{}", self.base_url, path)
    }

    #[cfg(target_os = "espidf")]
    fn request(
        &self,
        method: embedded_svc::http::Method,
        url: &str,
        auth: Option<&BasicAuth>,
        body: Option<&str>,
    ) -> Result<TallyReply> {
        use embedded_svc::http::Status as _;
        use embedded_svc::http::client::Client;
        use esp_idf_svc::http::client::{Configuration, EspHttpConnection};

        let connection = EspHttpConnection::new(&Configuration {
            timeout: Some(core::time::Duration::from_secs(u64::from(self.timeout_secs))),
            crt_bundle_attach: Some(esp_idf_svc::sys::esp_crt_bundle_attach),
            ..Default::default()
        })
        .map_err(|_| Error::Transport(TransportError::Connect))?;
        let mut client = Client::wrap(connection);

        let auth_header = auth.map(|a| a.header_value());
        let body_len = body.map(|b| b.len().to_string());
        let mut headers: heapless::Vec<(&str, &str), 4> = heapless::Vec::new();
        if let Some(ref value) = auth_header {
            let _ = headers.push(("Authorization", value.as_str()));
        }
        if body.is_some() {
            let _ = headers.push(("Content-Type", "application/json"));
        }
        if let Some(ref len) = body_len {
            let _ = headers.push(("Content-Length", len.as_str()));
        }

        let mut request = client
            .request(method, url, &headers)
            .map_err(|_| Error::Transport(TransportError::Connect))?;
        if let Some(payload) = body {
            use embedded_svc::io::Write as _;
            request
                .write_all(payload.as_bytes())
                .map_err(|_| Error::Transport(TransportError::Io))?;
        }

        let mut response = request
            .submit()
            .map_err(|_| Error::Transport(TransportError::Io))?;
        let status = response.status();

        // Only the first bytes of the body matter (diagnostics); drain
        // and discard the rest so the connection closes cleanly.
        let mut excerpt = heapless::String::new();
        let mut buf = [0u8; 128];
        use embedded_svc::io::Read as _;
        loop {
            match response.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    if excerpt.is_empty() {
                        for &b in &buf[..n] {
                            let ch = if b.is_ascii() && !b.is_ascii_control() {
                                b as char
                            } else {
                                '.'
                            };
                            if excerpt.push(ch).is_err() {
                                break;
                            }
                        }
                    }
                }
                Err(_) => break,
            }
        }

        Ok(TallyReply {
            status,
            body: excerpt,
        })
    }

    #[cfg(not(target_os = "espidf"))]
    fn request(
        &self,
        _method: u8,
        url: &str,
        _auth: Option<&BasicAuth>,
        _body: Option<&str>,
    ) -> Result<TallyReply> {
        log::debug!("http(sim): refusing request to {url}");
        Err(Error::Transport(TransportError::Connect))
    }
}

#[cfg(target_os = "espidf")]
impl TallyPort for HttpTallyAdapter {
    fn post_vote(&self, json_body: &str, auth: &BasicAuth) -> Result<TallyReply> {
        self.request(
            embedded_svc::http::Method::Post,
            &self.url("vote"),
            Some(auth),
            Some(json_body),
        )
    }

    fn ping(&self, auth: &BasicAuth) -> Result<TallyReply> {
        self.request(embedded_svc::http::Method::Get, &self.url("ping"), Some(auth), None)
    }

    fn fetch_key(&self, uuid: &str) -> Result<TallyReply> {
        let url = format!("{}key?uuid={}", self.base_url, uuid);
        self.request(embedded_svc::http::Method::Get, &url, None, None)
    }
}

#[cfg(not(target_os = "espidf"))]
impl TallyPort for HttpTallyAdapter {
    fn post_vote(&self, _json_body: &str, auth: &BasicAuth) -> Result<TallyReply> {
        let _ = auth;
        self.request(0, &self.url("vote"), None, None)
    }

    fn ping(&self, auth: &BasicAuth) -> Result<TallyReply> {
        let _ = auth;
        self.request(0, &self.url("ping"), None, None)
    }

    fn fetch_key(&self, uuid: &str) -> Result<TallyReply> {
        let url = format!("{}key?uuid={}", self.base_url, uuid);
        self.request(0, &url, None, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_against_trailing_slash_base() {
        let adapter = HttpTallyAdapter::new(&StationConfig::default());
        assert_eq!(
            adapter.url("vote"),
            "https://tally.votebox.example/votebox/vote"
        );
        assert_eq!(
            adapter.url("ping"),
            "https://tally.votebox.example/votebox/ping"
        );
    }

    #[test]
    fn sim_requests_fail_with_connect_error() {
        let adapter = HttpTallyAdapter::new(&StationConfig::default());
        let auth = BasicAuth {
            username: String::from("vb-deadbeefcafe"),
            password: String::from("tok"),
        };
        assert_eq!(
            adapter.ping(&auth).unwrap_err(),
            Error::Transport(TransportError::Connect)
        );
    }
}

use crate::domain::model::{FailureKind, Probe, ProbeOutcome};
use crate::domain::ports::Fetcher;
use crate::utils::error::Result;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::Client;

/// Browser-like identity; several services answer scripts and browsers
/// differently, and the keyword sets are tuned against the browser variant.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    headers
}

/// Builds a redirect-following client with the shared default headers.
/// Also used by the geolocation adapter so both share one identity.
pub fn default_client() -> Result<Client> {
    let client = Client::builder()
        .default_headers(default_headers())
        .redirect(Policy::limited(10))
        .build()?;
    Ok(client)
}

/// Probe executor on a shared client pair. Redirect policy is a client-level
/// setting in reqwest, so one client follows and one does not; probes pick
/// per their configuration.
pub struct HttpFetcher {
    redirecting: Client,
    direct: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let direct = Client::builder()
            .default_headers(default_headers())
            .redirect(Policy::none())
            .build()?;
        Ok(Self {
            redirecting: default_client()?,
            direct,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, probe: &Probe) -> ProbeOutcome {
        let client = if probe.follow_redirects {
            &self.redirecting
        } else {
            &self.direct
        };

        let result = client.get(&probe.url).timeout(probe.timeout).send().await;
        let response = match result {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(url = %probe.url, error = %e, "probe transport failure");
                return ProbeOutcome::Failure(failure_kind(&e));
            }
        };

        let status_code = response.status().as_u16();
        let final_url = response.url().to_string();
        match response.text().await {
            Ok(body_text) => ProbeOutcome::Response {
                status_code,
                body_text,
                final_url,
            },
            Err(e) => {
                tracing::debug!(url = %probe.url, error = %e, "probe body read failure");
                ProbeOutcome::Failure(failure_kind(&e))
            }
        }
    }
}

fn failure_kind(error: &reqwest::Error) -> FailureKind {
    if error.is_timeout() {
        FailureKind::Timeout
    } else if error.is_connect() {
        FailureKind::Connection
    } else {
        FailureKind::Other
    }
}

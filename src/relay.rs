use axum::body::Bytes;
use reqwest::Client;
use std::time::Duration;

use crate::error::GatewayError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Single identifying header sent on relayed fetches. The caller's own
/// headers are never forwarded.
const USER_AGENT: &str = "periscope-relay/0.1";

/// What came back from the relayed upstream, unmodified. The upstream's own
/// status is carried so error statuses can be forwarded to the caller.
#[derive(Debug, Clone)]
pub struct RelayResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Bytes,
}

/// Fetches an arbitrary caller-supplied URL server-side and passes its body
/// and declared content type through untouched.
///
/// This is an open relay by design: any URL is fetched, not just ones issued
/// by a prior search response. Accepted trust boundary, not mitigated here.
#[derive(Clone)]
pub struct RelayService {
    client: Client,
    timeout: Duration,
}

impl RelayService {
    pub fn new() -> RelayService {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> RelayService {
        RelayService {
            client: Client::new(),
            timeout,
        }
    }

    pub async fn relay(&self, url: &str) -> Result<RelayResponse, GatewayError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(GatewayError::from_transport)?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_string();

        let body = response
            .bytes()
            .await
            .map_err(GatewayError::from_transport)?;

        Ok(RelayResponse {
            status,
            content_type,
            body,
        })
    }
}

impl Default for RelayService {
    fn default() -> Self {
        Self::new()
    }
}

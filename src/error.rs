use axum::http::StatusCode;
use thiserror::Error;

/// Classified failure for the search and relay paths. Every variant is
/// resolved at the request boundary; nothing here is fatal to the process.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Missing/empty required request parameter (`q` or `url`).
    #[error("missing required parameter: {0}")]
    ClientInput(String),

    /// Required deployment credential is absent.
    #[error("server configuration error: {0}")]
    Configuration(String),

    /// Upstream detected as actively blocking or challenging the request.
    #[error("upstream is blocking requests: {0}")]
    Blocked(String),

    /// Outbound call exceeded its bound.
    #[error("upstream request timed out: {0}")]
    Timeout(String),

    /// Any other non-2xx or transport failure from the outbound call.
    #[error("upstream request failed: {message}")]
    Upstream {
        status: Option<u16>,
        message: String,
    },
}

impl GatewayError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            GatewayError::ClientInput(_) => StatusCode::BAD_REQUEST,
            GatewayError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
            GatewayError::Blocked(_) => StatusCode::TOO_MANY_REQUESTS,
            GatewayError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            GatewayError::Upstream { status, .. } => status
                .and_then(|s| StatusCode::from_u16(s).ok())
                .filter(|s| s.is_client_error() || s.is_server_error())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// Message safe to hand back to the caller. Upstream detail stays in the
    /// server-side logs.
    pub fn public_message(&self) -> String {
        match self {
            GatewayError::ClientInput(param) => {
                format!("Please provide the '{param}' query parameter")
            }
            GatewayError::Configuration(_) => {
                "Server configuration error: API Key or Search Engine ID missing.".to_string()
            }
            GatewayError::Blocked(_) => {
                "The search backend is rate-limiting or blocking requests. Try again later."
                    .to_string()
            }
            GatewayError::Timeout(_) => "The upstream request timed out.".to_string(),
            GatewayError::Upstream { .. } => "Failed to fetch from the upstream service.".to_string(),
        }
    }

    /// Classify a reqwest transport error for the outbound call sites.
    /// An unreachable upstream surfaces the same way a timeout does.
    pub fn from_transport(err: reqwest::Error) -> GatewayError {
        if err.is_timeout() || err.is_connect() {
            GatewayError::Timeout(err.to_string())
        } else {
            GatewayError::Upstream {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }
}

use axum::{
    Json,
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use crate::data_models::{SearchResult, relay_link_for};
use crate::error::GatewayError;

use super::AppState;
use super::models::{ErrorBody, ProxyParams, SearchParams};

/// Log the full error server-side, hand the caller the minimal message.
fn error_response(err: &GatewayError) -> (StatusCode, Json<ErrorBody>) {
    match err {
        GatewayError::ClientInput(_) => tracing::debug!(error = %err, "rejected request"),
        _ => tracing::error!(error = %err, "request failed"),
    }
    (
        err.status_code(),
        Json(ErrorBody {
            error: err.public_message(),
        }),
    )
}

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<SearchResult>>, (StatusCode, Json<ErrorBody>)> {
    let query = params.q.as_deref().unwrap_or("").trim();
    if query.is_empty() {
        // Rejected before the strategy is ever invoked.
        return Err(error_response(&GatewayError::ClientInput("q".to_string())));
    }

    let mut results = state
        .strategy
        .search(query)
        .await
        .map_err(|err| error_response(&err))?;

    if state.relay_enabled {
        for result in &mut results {
            if !result.link.is_empty() {
                result.relay_link = Some(relay_link_for(&result.link));
            }
        }
    }

    // An empty sequence is a valid response, not an error.
    Ok(Json(results))
}

pub async fn proxy_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ProxyParams>,
) -> Response {
    let url = params.url.as_deref().unwrap_or("").trim();
    if url.is_empty() {
        return error_response(&GatewayError::ClientInput("url".to_string())).into_response();
    }

    match state.relay.relay(url).await {
        Ok(relayed) => {
            // Forward the upstream's own status, content type, and body.
            let status = StatusCode::from_u16(relayed.status).unwrap_or(StatusCode::OK);
            (
                status,
                [(header::CONTENT_TYPE, relayed.content_type)],
                relayed.body,
            )
                .into_response()
        }
        Err(err) => error_response(&err).into_response(),
    }
}

//! Ingress handlers: external delivery and the statistics page.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::debug;

use crate::http::server::AppState;
use crate::session::Outbound;

/// Handle `GET /`: render process statistics, one `name value` line per
/// entry, sorted by name.
pub async fn statistics(State(state): State<AppState>) -> String {
    state.stats.render()
}

/// Handle `POST /`: there is no address to deliver to.
pub async fn push_empty_address() -> Response {
    (StatusCode::NOT_FOUND, "could not find address").into_response()
}

/// Handle `POST /<address>`: enqueue a pre-framed message onto the
/// session's outbound queue. Callers are expected to POST complete frames;
/// the body is delivered verbatim.
pub async fn push(
    State(state): State<AppState>,
    Path(path): Path<String>,
    body: Bytes,
) -> Response {
    let address = first_segment(&path);
    let Ok(message) = String::from_utf8(body.to_vec()) else {
        return (StatusCode::INTERNAL_SERVER_ERROR, "could not read body").into_response();
    };
    let Some(session) = state.registry.lookup_by_address(address) else {
        return not_found(address);
    };
    if session.outbound.send(Outbound::Frame(message)).await.is_err() {
        // The session is tearing down; to the caller that is a miss.
        debug!(address, "outbound queue closed during delivery");
        return not_found(address);
    }
    (StatusCode::OK, "ok").into_response()
}

fn not_found(address: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        format!("could not find address: {address}"),
    )
        .into_response()
}

/// First path segment of a wildcard capture: `cp-1/extra` names `cp-1`.
pub(crate) fn first_segment(path: &str) -> &str {
    path.split('/').next().unwrap_or(path)
}

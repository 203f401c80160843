//! WebSocket upgrade handling: authorization, session setup, read loop.

use std::sync::Arc;

use axum::extract::ws::rejection::WebSocketUpgradeRejection;
use axum::extract::ws::{close_code, CloseFrame, Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite;
use tracing::{info, warn};

use crate::http::ingress::first_segment;
use crate::http::server::AppState;
use crate::observability::stats;
use crate::relay::{InboundPump, OutboundPump};
use crate::session::{Outbound, Session};

/// Close cause reported when the peer vanished without a close handshake.
const EOF_REASON: &str = "EOF";

/// Handle `GET /<address>`: authorize against the backend, then upgrade.
pub async fn connect(
    State(state): State<AppState>,
    Path(path): Path<String>,
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
) -> Response {
    let address = first_segment(&path).to_string();

    // Cheap local reject before bothering the backend. Upgrade races are
    // settled by the atomic register below.
    if state.registry.contains_address(&address) {
        return (StatusCode::CONFLICT, "address in use").into_response();
    }

    match state.backend.authorize(&address).await {
        Err(err) => {
            warn!(address = %address, %err, "authorization probe failed");
            return (StatusCode::BAD_GATEWAY, "error when proxying connect").into_response();
        }
        Ok(body) if body.as_ref() != b"ok" => {
            info!(address = %address, "backend refused connection");
            return (StatusCode::FORBIDDEN, "not allowed to connect").into_response();
        }
        Ok(_) => {}
    }

    let Ok(ws) = ws else {
        return (StatusCode::BAD_REQUEST, "no upgrade requested").into_response();
    };

    ws.on_upgrade(move |socket| run_session(state, address, socket))
}

/// Own a connection from upgrade to teardown: register the session, spawn
/// its pumps, then read frames until the socket ends.
async fn run_session(state: AppState, address: String, socket: WebSocket) {
    let (mut sink, mut stream) = socket.split();
    let (outbound_tx, outbound_rx) = mpsc::channel(state.queue_capacity);
    let (inbound_tx, inbound_rx) = mpsc::channel(state.queue_capacity);

    let session = Session::new(address.clone(), outbound_tx.clone());
    let pending_actions = Arc::clone(&session.pending_actions);

    let conn_id = match state.registry.register(Arc::clone(&session)) {
        Ok(id) => id,
        Err(err) => {
            // Lost an upgrade race for this address.
            warn!(address = %address, %err, "closing duplicate connection");
            let _ = sink
                .send(Message::Close(Some(CloseFrame {
                    code: close_code::POLICY,
                    reason: "address in use".into(),
                })))
                .await;
            return;
        }
    };

    tokio::spawn(OutboundPump::new(outbound_rx, sink, Arc::clone(&pending_actions)).run());
    tokio::spawn(
        InboundPump::new(
            address.clone(),
            Arc::clone(&state.backend),
            Arc::clone(&state.stats),
            pending_actions,
            inbound_rx,
            outbound_tx.clone(),
        )
        .run(),
    );

    state.stats.increment(stats::CONNECTIONS_OPENED);
    info!(address = %address, %conn_id, "session established");

    let mut close_reason: Option<String> = None;
    while let Some(received) = stream.next().await {
        match received {
            Ok(Message::Text(text)) => {
                if inbound_tx.send(text.to_string()).await.is_err() {
                    break;
                }
            }
            Ok(Message::Binary(_)) => {
                // Protocol error, not a transport one: drop and carry on.
                warn!(address = %address, "binary messages not supported");
            }
            Ok(Message::Ping(payload)) => {
                if outbound_tx
                    .send(Outbound::Pong(payload.to_vec()))
                    .await
                    .is_err()
                {
                    break;
                }
            }
            Ok(Message::Pong(_)) => {}
            Ok(Message::Close(frame)) => {
                // A close without a reason payload reads as a silent end.
                close_reason = frame
                    .filter(|f| !f.reason.is_empty())
                    .map(|f| f.reason.to_string());
                break;
            }
            Err(err) => {
                close_reason = Some(describe_transport_error(err));
                break;
            }
        }
    }

    // All session state becomes unreachable before the close is
    // acknowledged: dropping the queue ends makes both pumps drain and
    // exit, and the outbound pump closes the socket behind itself.
    state.registry.unregister(conn_id);
    drop(session);
    drop(inbound_tx);
    drop(outbound_tx);
    state.stats.increment(stats::CONNECTIONS_CLOSED);

    let reason = close_reason.unwrap_or_else(|| EOF_REASON.to_string());
    info!(address = %address, %conn_id, reason = %reason, "session closed");
    match state.backend.disconnected(&address, &reason).await {
        Ok(body) if body.as_ref() != b"ok" => {
            warn!(address = %address, "backend answered close notification non-ok");
        }
        Ok(_) => {}
        Err(err) => {
            warn!(address = %address, %err, "backend close notification failed");
        }
    }
}

/// Render a read error the way close causes are reported to the backend.
fn describe_transport_error(err: axum::Error) -> String {
    match err.into_inner().downcast::<tungstenite::Error>() {
        Ok(err) => describe_tungstenite_error(*err),
        Err(other) => other.to_string(),
    }
}

fn describe_tungstenite_error(err: tungstenite::Error) -> String {
    use tungstenite::error::ProtocolError;

    match err {
        tungstenite::Error::Protocol(ProtocolError::ResetWithoutClosingHandshake) => {
            EOF_REASON.to_string()
        }
        tungstenite::Error::Io(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
            EOF_REASON.to_string()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silent_disconnects_read_as_eof() {
        use tungstenite::error::ProtocolError;

        assert_eq!(
            describe_tungstenite_error(tungstenite::Error::Protocol(
                ProtocolError::ResetWithoutClosingHandshake
            )),
            "EOF"
        );
        assert_eq!(
            describe_tungstenite_error(tungstenite::Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "eof"
            ))),
            "EOF"
        );
    }

    #[test]
    fn other_errors_keep_their_description() {
        let described = describe_tungstenite_error(tungstenite::Error::AttackAttempt);
        assert!(!described.is_empty());
        assert_ne!(described, "EOF");
    }
}

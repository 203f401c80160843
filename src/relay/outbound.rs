//! Outbound pump: writes queued messages to the client socket.

use axum::extract::ws::{Message, WebSocket};
use futures_util::stream::SplitSink;
use futures_util::SinkExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::protocol::Frame;
use crate::session::{Outbound, PendingActions};

/// Sole owner of a connection's socket write end.
///
/// Messages arrive pre-framed; the pump does no translation. It is also the
/// sole writer of the pending-action table: a server-initiated CALL has its
/// action recorded before the frame is written, so the table entry exists
/// by the time the client can possibly reply.
pub struct OutboundPump {
    outbound: mpsc::Receiver<Outbound>,
    sink: SplitSink<WebSocket, Message>,
    pending_actions: PendingActions,
}

impl OutboundPump {
    pub fn new(
        outbound: mpsc::Receiver<Outbound>,
        sink: SplitSink<WebSocket, Message>,
        pending_actions: PendingActions,
    ) -> Self {
        Self {
            outbound,
            sink,
            pending_actions,
        }
    }

    pub async fn run(mut self) {
        while let Some(message) = self.outbound.recv().await {
            let ws_message = match message {
                Outbound::Frame(text) => {
                    if let Some((id, action)) = pending_call(&text) {
                        self.pending_actions.insert(id, action);
                    }
                    Message::Text(text.into())
                }
                Outbound::Pong(payload) => Message::Pong(payload.into()),
            };
            if let Err(err) = self.sink.send(ws_message).await {
                warn!(%err, "socket write failed, outbound pump exiting");
                return;
            }
        }
        debug!("outbound queue closed, pump exiting");
        let _ = self.sink.close().await;
    }
}

/// Extract `(id, action)` from a server-initiated CALL frame, `None` for
/// every other message. Unparseable payloads are delivered unrecorded; the
/// expectation is that ingress callers POST complete frames.
fn pending_call(text: &str) -> Option<(String, String)> {
    match Frame::parse(text) {
        Ok(Frame::Call { id, action, .. }) => Some((id.to_owned(), action.to_owned())),
        Ok(_) => None,
        Err(err) => {
            warn!(%err, "unparseable ingress payload, delivering as-is");
            None
        }
    }
}

//! Inbound pump: dispatches client frames to the backend.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::backend::BackendClient;
use crate::observability::{stats, Stats};
use crate::protocol::{emit_call_error, emit_call_result, Frame};
use crate::session::{Outbound, PendingActions};

/// Description used for every synthesized bridge error.
const CONNECT_FAILED: &str = "connect failed";

/// Consumes one frame at a time from the session's inbound queue and drives
/// the matching backend call. Exits when the queue closes.
///
/// Serialization is the point: the backend call for frame `n` completes
/// before frame `n + 1` is taken, so a CALL's response frame is enqueued
/// before any later frame's response.
pub struct InboundPump {
    address: String,
    backend: Arc<BackendClient>,
    stats: Arc<Stats>,
    pending_actions: PendingActions,
    inbound: mpsc::Receiver<String>,
    outbound: mpsc::Sender<Outbound>,
}

impl InboundPump {
    pub fn new(
        address: String,
        backend: Arc<BackendClient>,
        stats: Arc<Stats>,
        pending_actions: PendingActions,
        inbound: mpsc::Receiver<String>,
        outbound: mpsc::Sender<Outbound>,
    ) -> Self {
        Self {
            address,
            backend,
            stats,
            pending_actions,
            inbound,
            outbound,
        }
    }

    pub async fn run(mut self) {
        while let Some(raw) = self.inbound.recv().await {
            self.stats.increment(stats::MESSAGES_STARTED);
            self.dispatch(&raw).await;
            self.stats.increment(stats::MESSAGES_FINISHED);
        }
        debug!(address = %self.address, "inbound queue closed, pump exiting");
    }

    async fn dispatch(&mut self, raw: &str) {
        let frame = match Frame::parse(raw) {
            Ok(frame) => frame,
            Err(err) => {
                // Protocol error: drop the frame, keep the connection.
                warn!(address = %self.address, %err, "dropping malformed frame");
                return;
            }
        };
        match frame {
            Frame::Call { id, action, .. } => self.handle_call(id, action, raw).await,
            Frame::CallResult { id, .. } => self.forward_reply(id, raw, ReplyKind::Result).await,
            Frame::CallError { id, .. } => self.forward_reply(id, raw, ReplyKind::Error).await,
        }
    }

    /// Client-initiated CALL: forward to the backend and frame its answer
    /// back to the client. Backend exhaustion becomes a synthesized
    /// CALLERROR instead of a dropped message.
    async fn handle_call(&mut self, id: &str, action: &str, raw: &str) {
        let started = Instant::now();
        let result = self.backend.call(action, &self.address, id, raw).await;
        self.stats
            .observe(stats::CALL_SECONDS, started.elapsed().as_secs_f64());
        let reply = match result {
            Ok(body) => emit_call_result(id, &String::from_utf8_lossy(&body)),
            Err(err) => {
                warn!(address = %self.address, id, action, %err, "backend call failed");
                emit_call_error(id, CONNECT_FAILED)
            }
        };
        if self.outbound.send(Outbound::Frame(reply)).await.is_err() {
            debug!(address = %self.address, id, "outbound queue closed, reply dropped");
        }
    }

    /// Reply to a prior server-initiated CALL: resolve its recorded action
    /// and forward to the backend. Fire-and-forget, no reply to the client.
    async fn forward_reply(&mut self, id: &str, raw: &str, kind: ReplyKind) {
        let action = match self.pending_actions.remove(id) {
            Some((_, action)) => action,
            None => {
                warn!(address = %self.address, id, "no pending action for reply");
                String::new()
            }
        };
        let started = Instant::now();
        let result = match kind {
            ReplyKind::Result => {
                self.backend
                    .forward_result(&action, &self.address, id, raw)
                    .await
            }
            ReplyKind::Error => {
                self.backend
                    .forward_error(&action, &self.address, id, raw)
                    .await
            }
        };
        self.stats
            .observe(kind.seconds_stat(), started.elapsed().as_secs_f64());
        if let Err(err) = result {
            warn!(address = %self.address, id, %err, "dropping reply after retries");
        }
    }
}

#[derive(Clone, Copy)]
enum ReplyKind {
    Result,
    Error,
}

impl ReplyKind {
    fn seconds_stat(self) -> &'static str {
        match self {
            ReplyKind::Result => stats::RESULT_SECONDS,
            ReplyKind::Error => stats::ERROR_SECONDS,
        }
    }
}

//! Per-connection session state.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;

/// Identifier of one live WebSocket connection.
///
/// The registry owns the session; pumps and handlers refer to it by this id
/// so no reference cycle forms between session and connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnId(pub u64);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// One message awaiting write on a session's outbound queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outbound {
    /// A complete, pre-framed text payload.
    Frame(String),
    /// A pong answering a client ping, echoing its payload.
    Pong(Vec<u8>),
}

/// In-flight server-initiated CALLs: message id → action name.
///
/// Single-writer discipline: the outbound pump inserts, the inbound pump
/// reads and removes. The map is concurrent only so that discipline is a
/// convention rather than a soundness requirement.
pub type PendingActions = Arc<DashMap<String, String>>;

/// The per-connection aggregate, created at upgrade and destroyed when the
/// read loop returns.
pub struct Session {
    /// Caller-supplied address naming this session for external delivery.
    pub address: String,

    /// Write end of the outbound queue; held here for the ingress handler.
    pub outbound: mpsc::Sender<Outbound>,

    /// Actions of server-initiated CALLs awaiting their reply.
    pub pending_actions: PendingActions,
}

impl Session {
    pub fn new(address: String, outbound: mpsc::Sender<Outbound>) -> Arc<Self> {
        Arc::new(Self {
            address,
            outbound,
            pending_actions: Arc::new(DashMap::new()),
        })
    }
}

//! Registry mapping addresses and connection ids to live sessions.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use thiserror::Error;

use crate::session::state::{ConnId, Session};

/// Shard count for both maps. Contention is per-address and per-connection,
/// so a modest shard count is enough even at tens of thousands of sockets.
const SHARD_AMOUNT: usize = 16;

/// The only shared mutable state in the bridge besides the statistics sink.
pub struct SessionRegistry {
    by_address: DashMap<String, ConnId>,
    by_connection: DashMap<ConnId, Arc<Session>>,
    next_id: AtomicU64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            by_address: DashMap::with_shard_amount(SHARD_AMOUNT),
            by_connection: DashMap::with_shard_amount(SHARD_AMOUNT),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a session under its address, allocating a connection id.
    ///
    /// Duplicate addresses are rejected: an address maps to at most one
    /// live connection at a time. The address slot is claimed under its
    /// shard lock, so two concurrent registrations of the same address
    /// cannot both succeed.
    pub fn register(&self, session: Arc<Session>) -> Result<ConnId, RegistryError> {
        let id = ConnId(self.next_id.fetch_add(1, Ordering::Relaxed));
        // Insert the session first so a lookup that wins the address race
        // never observes an address without its session.
        self.by_connection.insert(id, Arc::clone(&session));
        match self.by_address.entry(session.address.clone()) {
            Entry::Occupied(_) => {
                self.by_connection.remove(&id);
                Err(RegistryError::AddressInUse(session.address.clone()))
            }
            Entry::Vacant(slot) => {
                slot.insert(id);
                Ok(id)
            }
        }
    }

    /// Look up the live session registered under an address.
    pub fn lookup_by_address(&self, address: &str) -> Option<Arc<Session>> {
        let id = *self.by_address.get(address)?;
        self.lookup_by_connection(id)
    }

    /// Look up a session by its connection id.
    pub fn lookup_by_connection(&self, id: ConnId) -> Option<Arc<Session>> {
        self.by_connection.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    /// Whether an address currently has a live connection.
    pub fn contains_address(&self, address: &str) -> bool {
        self.by_address.contains_key(address)
    }

    /// Remove both entries for a connection. Idempotent; the address entry
    /// is only removed if it still points at this connection.
    pub fn unregister(&self, id: ConnId) {
        if let Some((_, session)) = self.by_connection.remove(&id) {
            self.by_address
                .remove_if(&session.address, |_, registered| *registered == id);
        }
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.by_connection.len()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors from registry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The address is already bound to a live connection.
    #[error("address already registered: {0}")]
    AddressInUse(String),
}

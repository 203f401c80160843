//! Session registry and per-connection state.

pub mod registry;
pub mod state;

pub use registry::{RegistryError, SessionRegistry};
pub use state::{ConnId, Outbound, PendingActions, Session};

//! HTTP ingress subsystem.
//!
//! # Data Flow
//! ```text
//! GET  /            → ingress.rs (statistics page)
//! GET  /<address>   → websocket.rs (authorize, upgrade, read loop)
//! POST /<address>   → ingress.rs (enqueue onto the session's outbound queue)
//! ```

pub mod ingress;
pub mod server;
pub mod websocket;

pub use server::{build_router, AppState, BridgeServer};

//! Per-connection relay pumps.
//!
//! # Data Flow
//! ```text
//! socket read loop ──▶ inbound queue ──▶ inbound pump ──▶ backend HTTP
//!                                             │
//!                                             ▼ (replies)
//! ingress POST ──────▶ outbound queue ──▶ outbound pump ──▶ socket write
//! ```
//!
//! # Design Decisions
//! - Queues over callbacks: FIFO order falls out of ownership, not locking
//! - One inbound pump per connection, processing frames serially, so each
//!   frame's backend call completes before the next frame starts
//! - One outbound pump per connection owning the socket write end; replies
//!   from the inbound pump travel through the same queue as ingress pushes

pub mod inbound;
pub mod outbound;

pub use inbound::InboundPump;
pub use outbound::OutboundPump;

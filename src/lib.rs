//! Bidirectional bridge between WebSocket sessions and an HTTP backend.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌───────────────────────────────────────────────┐
//!                        │                    BRIDGE                      │
//!                        │                                                │
//!   WebSocket client     │  ┌──────────┐   ┌─────────┐   ┌────────────┐  │
//!   ─────────────────────┼─▶│   http   │──▶│ session │──▶│   relay    │  │
//!    [2,"id","act",{…}]  │  │ ingress  │   │ registry│   │   pumps    │  │
//!                        │  └──────────┘   └─────────┘   └─────┬──────┘  │
//!                        │                                      │         │
//!   External caller      │                                      ▼         │
//!   POST /<address> ─────┼───────▶ outbound queue        ┌────────────┐  │
//!                        │                                │  backend   │──┼──▶ HTTP
//!                        │                                │  client    │  │    backend
//!                        │                                └────────────┘  │
//!                        │                                                │
//!                        │  ┌──────────────────────────────────────────┐ │
//!                        │  │           Cross-Cutting Concerns          │ │
//!                        │  │  config · observability · resilience ·    │ │
//!                        │  │  lifecycle                                │ │
//!                        │  └──────────────────────────────────────────┘ │
//!                        └───────────────────────────────────────────────┘
//! ```
//!
//! Each live connection runs three tasks: the socket read loop, an inbound
//! pump that forwards frames to the backend one at a time, and an outbound
//! pump that owns the socket write end. All inter-task communication is via
//! bounded queues; the registry is the only shared mutable state.

// Core subsystems
pub mod backend;
pub mod config;
pub mod http;
pub mod protocol;
pub mod relay;
pub mod session;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::BridgeConfig;
pub use http::BridgeServer;

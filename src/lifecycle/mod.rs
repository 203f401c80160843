//! Lifecycle management subsystem.
//!
//! # Design Decisions
//! - Ordered startup: limits first, then subsystems, listener last
//! - Shutdown is signal-driven and handled by the server's accept loop

pub mod startup;

pub use startup::raise_open_file_limit;

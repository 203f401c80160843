//! Backend HTTP egress subsystem.

pub mod client;

pub use client::{BackendClient, BackendError};

//! Retry policy helpers.
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Retry is policy, not control flow: the backend client owns the loop,
//!   this module only computes delays

pub mod backoff;

pub use backoff::retry_delay;

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing log events (stdout)
//!     → stats.rs (process-wide counters and duration sums)
//!
//! Consumers:
//!     → GET / on the ingress (line-oriented statistics page)
//!     → metrics.rs (optional Prometheus scrape endpoint)
//! ```
//!
//! # Design Decisions
//! - Statistics are cheap (atomic increments)
//! - Every statistic dual-writes to the `metrics` facade, so the Prometheus
//!   exporter needs no wiring of its own

pub mod metrics;
pub mod stats;

pub use stats::Stats;

//! Configuration management subsystem.
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so the bridge runs with no configuration at all
//! - CLI flags override individual fields after deserialization

pub mod loader;
pub mod schema;

pub use loader::{load_config, ConfigError};
pub use schema::BackendConfig;
pub use schema::BridgeConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::QueueConfig;
pub use schema::RetryConfig;

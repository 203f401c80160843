//! Configuration schema definitions.
//!
//! All types derive Serde traits and carry defaults that match the bridge's
//! documented behavior, so an empty config runs the production defaults.

use serde::{Deserialize, Serialize};

/// Root configuration for the bridge.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BridgeConfig {
    /// Ingress listener configuration.
    pub listener: ListenerConfig,

    /// Backend HTTP service the bridge relays to.
    pub backend: BackendConfig,

    /// Retry policy for backend calls.
    pub retries: RetryConfig,

    /// Per-connection queue sizing.
    pub queues: QueueConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Ingress listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:4000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4000".to_string(),
        }
    }
}

/// Backend HTTP service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend; endpoint paths are appended to it.
    pub base_url: String,

    /// Total timeout per request attempt, in seconds.
    pub request_timeout_secs: u64,

    /// Idle connections kept per host in the shared pool.
    pub pool_max_idle_per_host: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000/".to_string(),
            request_timeout_secs: 60,
            pool_max_idle_per_host: 1_000,
        }
    }
}

/// Retry policy for backend calls.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per call, the first one included.
    pub attempts: u32,

    /// Fixed delay before each retry, in milliseconds.
    pub base_delay_ms: u64,

    /// Upper bound of the uniform jitter added per retry, in milliseconds.
    pub max_jitter_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay_ms: 3_000,
            max_jitter_ms: 1_000,
        }
    }
}

/// Per-connection queue sizing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct QueueConfig {
    /// Capacity of each inbound and outbound queue.
    ///
    /// Bounded queues are the only backpressure mechanism: a full inbound
    /// queue stalls the socket reader, a full outbound queue stalls ingress
    /// POSTs for that address.
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { capacity: 100_000 }
    }
}

/// Observability settings.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Address for the Prometheus scrape endpoint; disabled when unset.
    pub metrics_address: Option<String>,
}

//! Prometheus metrics exposition.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder with its own scrape listener.
///
/// Once installed, every statistic recorded through [`crate::observability::Stats`]
/// is also visible to the scraper via the `metrics` facade.
pub fn init_metrics(addr: SocketAddr) {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus recorder");

    tracing::info!(address = %addr, "metrics scrape endpoint ready");
}

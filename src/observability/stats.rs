//! Process-wide statistics registry.
//!
//! Backs the line-oriented statistics page served on `GET /`. Counters are
//! plain atomics; duration sums store f64 bits in an atomic word. Every
//! update also goes to the `metrics` facade, which is a no-op unless a
//! recorder (the Prometheus exporter) has been installed.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;

pub const CONNECTIONS_OPENED: &str = "connections_opened";
pub const CONNECTIONS_CLOSED: &str = "connections_closed";
pub const REQUESTS_STARTED: &str = "requests_started";
pub const REQUESTS_SUCCEEDED: &str = "requests_succeeded";
pub const REQUESTS_FAILED: &str = "requests_failed";
pub const MESSAGES_STARTED: &str = "messages_started";
pub const MESSAGES_FINISHED: &str = "messages_finished";

pub const CALL_SECONDS: &str = "call_seconds";
pub const RESULT_SECONDS: &str = "result_seconds";
pub const ERROR_SECONDS: &str = "error_seconds";

/// Statistics sink shared by every subsystem.
pub struct Stats {
    counters: DashMap<&'static str, AtomicU64>,
    sums: DashMap<&'static str, AtomicU64>,
}

impl Stats {
    pub fn new() -> Self {
        let stats = Self {
            counters: DashMap::new(),
            sums: DashMap::new(),
        };
        // Pre-register so the statistics page is stable from the first scrape.
        for name in [
            CONNECTIONS_OPENED,
            CONNECTIONS_CLOSED,
            REQUESTS_STARTED,
            REQUESTS_SUCCEEDED,
            REQUESTS_FAILED,
            MESSAGES_STARTED,
            MESSAGES_FINISHED,
        ] {
            stats.counters.insert(name, AtomicU64::new(0));
        }
        stats
    }

    /// Increment a named counter by one.
    pub fn increment(&self, name: &'static str) {
        self.counters
            .entry(name)
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(1, Ordering::Relaxed);
        metrics::counter!(name).increment(1);
    }

    /// Read a counter, zero if it was never written.
    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .get(name)
            .map(|c| c.load(Ordering::Relaxed))
            .unwrap_or(0)
    }

    /// Add an observed duration to a named sum.
    pub fn observe(&self, name: &'static str, seconds: f64) {
        let sum = self.sums.entry(name).or_insert_with(|| AtomicU64::new(0));
        let mut current = sum.load(Ordering::Relaxed);
        loop {
            let next = (f64::from_bits(current) + seconds).to_bits();
            match sum.compare_exchange_weak(
                current,
                next,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(observed) => current = observed,
            }
        }
        metrics::histogram!(name).record(seconds);
    }

    /// Render all statistics as `name value` lines, sorted by name.
    ///
    /// Counters print as base-10 integers, duration sums as fixed-point
    /// floats.
    pub fn render(&self) -> String {
        let mut lines: Vec<String> = self
            .counters
            .iter()
            .map(|entry| format!("{} {}\n", entry.key(), entry.value().load(Ordering::Relaxed)))
            .chain(self.sums.iter().map(|entry| {
                let sum = f64::from_bits(entry.value().load(Ordering::Relaxed));
                format!("{} {:.6}\n", entry.key(), sum)
            }))
            .collect();
        lines.sort();
        lines.concat()
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero() {
        let stats = Stats::new();
        assert_eq!(stats.counter(REQUESTS_STARTED), 0);
        assert_eq!(stats.counter("never_registered"), 0);
    }

    #[test]
    fn increments_are_visible() {
        let stats = Stats::new();
        stats.increment(MESSAGES_STARTED);
        stats.increment(MESSAGES_STARTED);
        assert_eq!(stats.counter(MESSAGES_STARTED), 2);
    }

    #[test]
    fn render_is_sorted_by_name() {
        let stats = Stats::new();
        stats.increment(REQUESTS_STARTED);
        stats.observe(CALL_SECONDS, 0.25);
        let page = stats.render();
        let names: Vec<&str> = page
            .lines()
            .map(|line| line.split_whitespace().next().unwrap())
            .collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn render_formats_counters_and_sums() {
        let stats = Stats::new();
        stats.increment(CONNECTIONS_OPENED);
        stats.observe(CALL_SECONDS, 0.5);
        stats.observe(CALL_SECONDS, 0.25);
        let page = stats.render();
        assert!(page.contains("connections_opened 1\n"));
        assert!(page.contains("call_seconds 0.750000\n"));
    }
}

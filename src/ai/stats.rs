//! Selection Statistics
//!
//! Per-provider counters for selections and dispatch outcomes. Lock-free
//! updates: a [`DashMap`] of atomic counters, one entry per provider.
//!
//! ## Usage
//!
//! ```ignore
//! let stats = SelectionStats::new();
//! stats.record_selection("claude", ComplexityClass::ComplexText);
//! stats.record_outcome("claude", Outcome::Success, elapsed);
//! let summary = stats.summary();
//! ```

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::types::ComplexityClass;

/// How a dispatch attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
    Timeout,
}

#[derive(Debug, Default)]
struct ProviderCounters {
    simple_selections: AtomicU64,
    complex_selections: AtomicU64,
    successes: AtomicU64,
    failures: AtomicU64,
    timeouts: AtomicU64,
    total_latency_ms: AtomicU64,
}

/// Point-in-time view of one provider's counters
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStats {
    pub provider: String,
    pub selections: u64,
    pub simple_selections: u64,
    pub complex_selections: u64,
    pub successes: u64,
    pub failures: u64,
    pub timeouts: u64,
    pub avg_latency_ms: f64,
}

impl ProviderStats {
    pub fn success_rate(&self) -> f64 {
        let attempts = self.successes + self.failures + self.timeouts;
        if attempts == 0 {
            0.0
        } else {
            self.successes as f64 / attempts as f64
        }
    }
}

/// Summary over all providers
#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub since: DateTime<Utc>,
    pub total_selections: u64,
    pub providers: Vec<ProviderStats>,
}

/// Thread-safe selection statistics collector
#[derive(Debug)]
pub struct SelectionStats {
    since: DateTime<Utc>,
    providers: DashMap<String, ProviderCounters>,
}

impl Default for SelectionStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionStats {
    pub fn new() -> Self {
        Self {
            since: Utc::now(),
            providers: DashMap::new(),
        }
    }

    pub fn record_selection(&self, provider: &str, class: ComplexityClass) {
        let counters = self.providers.entry(provider.to_string()).or_default();
        match class {
            ComplexityClass::SimpleAudio => &counters.simple_selections,
            ComplexityClass::ComplexText => &counters.complex_selections,
        }
        .fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_outcome(&self, provider: &str, outcome: Outcome, elapsed: Duration) {
        let counters = self.providers.entry(provider.to_string()).or_default();
        match outcome {
            Outcome::Success => {
                counters.successes.fetch_add(1, Ordering::Relaxed);
                counters
                    .total_latency_ms
                    .fetch_add(elapsed.as_millis() as u64, Ordering::Relaxed);
            }
            Outcome::Failure => {
                counters.failures.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Timeout => {
                counters.timeouts.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Snapshot of all counters, most selected first
    pub fn summary(&self) -> StatsSummary {
        let mut providers: Vec<ProviderStats> = self
            .providers
            .iter()
            .map(|entry| {
                let c = entry.value();
                let simple = c.simple_selections.load(Ordering::Relaxed);
                let complex = c.complex_selections.load(Ordering::Relaxed);
                let successes = c.successes.load(Ordering::Relaxed);
                let latency = c.total_latency_ms.load(Ordering::Relaxed);
                ProviderStats {
                    provider: entry.key().clone(),
                    selections: simple + complex,
                    simple_selections: simple,
                    complex_selections: complex,
                    successes,
                    failures: c.failures.load(Ordering::Relaxed),
                    timeouts: c.timeouts.load(Ordering::Relaxed),
                    avg_latency_ms: if successes == 0 {
                        0.0
                    } else {
                        latency as f64 / successes as f64
                    },
                }
            })
            .collect();

        providers.sort_by(|a, b| {
            b.selections
                .cmp(&a.selections)
                .then_with(|| a.provider.cmp(&b.provider))
        });

        StatsSummary {
            since: self.since,
            total_selections: providers.iter().map(|p| p.selections).sum(),
            providers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_counts_and_latency() {
        let stats = SelectionStats::new();
        stats.record_selection("claude", ComplexityClass::ComplexText);
        stats.record_selection("claude", ComplexityClass::ComplexText);
        stats.record_selection("gemini_live", ComplexityClass::SimpleAudio);
        stats.record_outcome("claude", Outcome::Success, Duration::from_millis(100));
        stats.record_outcome("claude", Outcome::Success, Duration::from_millis(300));
        stats.record_outcome("gemini_live", Outcome::Timeout, Duration::from_secs(5));

        let summary = stats.summary();
        assert_eq!(summary.total_selections, 3);
        assert_eq!(summary.providers[0].provider, "claude");
        assert_eq!(summary.providers[0].avg_latency_ms, 200.0);
        assert_eq!(summary.providers[0].success_rate(), 1.0);
        assert_eq!(summary.providers[1].timeouts, 1);
        assert_eq!(summary.providers[1].success_rate(), 0.0);
    }

    #[test]
    fn test_concurrent_updates() {
        let stats = Arc::new(SelectionStats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = Arc::clone(&stats);
                std::thread::spawn(move || {
                    for _ in 0..1000 {
                        stats.record_selection("mistral", ComplexityClass::ComplexText);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(stats.summary().providers[0].selections, 8000);
    }
}

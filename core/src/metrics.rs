//! Request counters shared by every transport call.
//!
//! All counters are independent atomics, so concurrent callers never lose an
//! update. Readers may observe a total that is momentarily ahead of the
//! success/failure split; nothing here relies on a consistent snapshot.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};

#[derive(Debug)]
pub struct ClientMetrics {
    total_requests: AtomicU64,
    successful_requests: AtomicU64,
    failed_requests: AtomicU64,
    total_response_time_ms: AtomicU64,
    started_at: DateTime<Utc>,
}

impl Default for ClientMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientMetrics {
    pub fn new() -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            successful_requests: AtomicU64::new(0),
            failed_requests: AtomicU64::new(0),
            total_response_time_ms: AtomicU64::new(0),
            started_at: Utc::now(),
        }
    }

    pub fn record_success(&self, response_time_ms: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.successful_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_ms
            .fetch_add(response_time_ms, Ordering::Relaxed);
    }

    pub fn record_failure(&self, response_time_ms: u64) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        self.failed_requests.fetch_add(1, Ordering::Relaxed);
        self.total_response_time_ms
            .fetch_add(response_time_ms, Ordering::Relaxed);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn successful_requests(&self) -> u64 {
        self.successful_requests.load(Ordering::Relaxed)
    }

    pub fn failed_requests(&self) -> u64 {
        self.failed_requests.load(Ordering::Relaxed)
    }

    /// Percentage of successful requests, `0.0` before the first request.
    pub fn success_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        self.successful_requests() as f64 / total as f64 * 100.0
    }

    pub fn average_response_time_ms(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        self.total_response_time_ms.load(Ordering::Relaxed) as f64 / total as f64
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn uptime_seconds(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }

    /// Zero every counter. The start timestamp is kept.
    pub fn reset(&self) {
        self.total_requests.store(0, Ordering::Relaxed);
        self.successful_requests.store(0, Ordering::Relaxed);
        self.failed_requests.store(0, Ordering::Relaxed);
        self.total_response_time_ms.store(0, Ordering::Relaxed);
    }
}

impl fmt::Display for ClientMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClientMetrics{{totalRequests={}, successfulRequests={}, failedRequests={}, \
             successRate={:.2}%, avgResponseTime={:.2}ms, uptime={}s}}",
            self.total_requests(),
            self.successful_requests(),
            self.failed_requests(),
            self.success_rate(),
            self.average_response_time_ms(),
            self.uptime_seconds(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn empty_metrics_report_zero_rates() {
        let metrics = ClientMetrics::new();
        assert_eq!(metrics.total_requests(), 0);
        assert_eq!(metrics.success_rate(), 0.0);
        assert_eq!(metrics.average_response_time_ms(), 0.0);
    }

    #[test]
    fn success_rate_reflects_split() {
        let metrics = ClientMetrics::new();
        for _ in 0..3 {
            metrics.record_success(10);
        }
        metrics.record_failure(30);

        assert_eq!(metrics.total_requests(), 4);
        assert_eq!(metrics.successful_requests(), 3);
        assert_eq!(metrics.failed_requests(), 1);
        assert_eq!(metrics.success_rate(), 75.0);
        assert_eq!(metrics.average_response_time_ms(), 15.0);
    }

    #[test]
    fn reset_clears_counters() {
        let metrics = ClientMetrics::new();
        metrics.record_success(5);
        metrics.record_failure(5);
        metrics.reset();
        assert_eq!(metrics.total_requests(), 0);
        assert_eq!(metrics.successful_requests(), 0);
        assert_eq!(metrics.failed_requests(), 0);
        assert_eq!(metrics.average_response_time_ms(), 0.0);
    }

    #[test]
    fn concurrent_updates_are_not_lost() {
        let metrics = Arc::new(ClientMetrics::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let metrics = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        if i % 2 == 0 {
                            metrics.record_success(1);
                        } else {
                            metrics.record_failure(1);
                        }
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.total_requests(), 8_000);
        assert_eq!(metrics.successful_requests(), 4_000);
        assert_eq!(metrics.failed_requests(), 4_000);
        assert_eq!(metrics.success_rate(), 50.0);
    }

    #[test]
    fn display_summarises_counters() {
        let metrics = ClientMetrics::new();
        metrics.record_success(20);
        let summary = metrics.to_string();
        assert!(summary.contains("totalRequests=1"));
        assert!(summary.contains("successRate=100.00%"));
        assert!(summary.contains("avgResponseTime=20.00ms"));
    }
}

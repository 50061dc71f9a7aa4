//! Metrics collection for flow authorization

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for queries, admissions and mining work
#[derive(Debug, Default)]
pub struct Metrics {
    /// Total membership queries
    pub queries: AtomicU64,

    /// Queries that found the flow
    pub query_hits: AtomicU64,

    /// Admissions that appended a block
    pub admissions: AtomicU64,

    /// Admissions that ended without a block
    pub admissions_rejected: AtomicU64,

    /// Hash evaluations spent mining
    pub hashes_evaluated: AtomicU64,

    /// Total mining time (milliseconds)
    pub mining_time_ms: AtomicU64,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a membership query
    pub fn record_query(&self, hit: bool) {
        self.queries.fetch_add(1, Ordering::Relaxed);
        if hit {
            self.query_hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record mining work for one candidate
    pub fn record_mining(&self, attempts: u64, duration_ms: u64) {
        self.hashes_evaluated.fetch_add(attempts, Ordering::Relaxed);
        self.mining_time_ms.fetch_add(duration_ms, Ordering::Relaxed);
    }

    /// Record the outcome of an admission
    pub fn record_admission(&self, accepted: bool) {
        if accepted {
            self.admissions.fetch_add(1, Ordering::Relaxed);
        } else {
            self.admissions_rejected.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Get total queries
    pub fn get_queries(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }

    /// Get successful admissions
    pub fn get_admissions(&self) -> u64 {
        self.admissions.load(Ordering::Relaxed)
    }

    /// Get rejected admissions
    pub fn get_admissions_rejected(&self) -> u64 {
        self.admissions_rejected.load(Ordering::Relaxed)
    }

    /// Fraction of queries that found their flow
    pub fn get_query_hit_rate(&self) -> f64 {
        let queries = self.queries.load(Ordering::Relaxed);
        if queries == 0 {
            return 0.0;
        }
        self.query_hits.load(Ordering::Relaxed) as f64 / queries as f64
    }

    /// Average hash evaluations per successful admission
    pub fn get_avg_hashes_per_admission(&self) -> f64 {
        let admissions = self.admissions.load(Ordering::Relaxed);
        if admissions == 0 {
            return 0.0;
        }
        self.hashes_evaluated.load(Ordering::Relaxed) as f64 / admissions as f64
    }

    /// Average mining time per successful admission (milliseconds)
    pub fn get_avg_mining_time(&self) -> f64 {
        let admissions = self.admissions.load(Ordering::Relaxed);
        if admissions == 0 {
            return 0.0;
        }
        self.mining_time_ms.load(Ordering::Relaxed) as f64 / admissions as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_recording() {
        let metrics = Metrics::new();

        metrics.record_query(true);
        metrics.record_query(false);
        metrics.record_query(true);
        metrics.record_query(false);

        assert_eq!(metrics.get_queries(), 4);
        assert_eq!(metrics.get_query_hit_rate(), 0.5);
    }

    #[test]
    fn test_admission_recording() {
        let metrics = Metrics::new();

        metrics.record_mining(300, 4);
        metrics.record_admission(true);
        metrics.record_mining(100, 2);
        metrics.record_admission(true);
        metrics.record_admission(false);

        assert_eq!(metrics.get_admissions(), 2);
        assert_eq!(metrics.get_admissions_rejected(), 1);
        assert_eq!(metrics.get_avg_hashes_per_admission(), 200.0);
        assert_eq!(metrics.get_avg_mining_time(), 3.0);
    }

    #[test]
    fn test_empty_averages() {
        let metrics = Metrics::new();
        assert_eq!(metrics.get_query_hit_rate(), 0.0);
        assert_eq!(metrics.get_avg_hashes_per_admission(), 0.0);
    }
}

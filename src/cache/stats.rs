//! Cache Statistics Module
//!
//! Running counters for hits, misses, evictions and lookup latency, plus the
//! derived snapshot handed out to callers.

use std::collections::VecDeque;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Number of most recent lookup latencies kept for the rolling average.
pub const LOOKUP_WINDOW: usize = 100;

// == Stats Recorder ==
/// Primary statistics state owned by a cache.
#[derive(Debug, Clone, Default)]
pub struct StatsRecorder {
    hits: u64,
    misses: u64,
    evictions: u64,
    /// Latest lookup durations, oldest at the front
    lookup_times: VecDeque<Duration>,
}

impl StatsRecorder {
    // == Constructor ==
    pub fn new() -> Self {
        Self {
            lookup_times: VecDeque::with_capacity(LOOKUP_WINDOW),
            ..Self::default()
        }
    }

    // == Record Hit ==
    pub fn record_hit(&mut self, elapsed: Duration) {
        self.hits += 1;
        self.record_lookup_time(elapsed);
    }

    // == Record Miss ==
    pub fn record_miss(&mut self, elapsed: Duration) {
        self.misses += 1;
        self.record_lookup_time(elapsed);
    }

    // == Record Eviction ==
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    fn record_lookup_time(&mut self, elapsed: Duration) {
        if self.lookup_times.len() == LOOKUP_WINDOW {
            self.lookup_times.pop_front();
        }
        self.lookup_times.push_back(elapsed);
    }

    // == Average Lookup Time ==
    /// Mean of the latency window in milliseconds, 0.0 when empty.
    pub fn avg_lookup_time_ms(&self) -> f64 {
        if self.lookup_times.is_empty() {
            return 0.0;
        }
        let total: Duration = self.lookup_times.iter().sum();
        total.as_secs_f64() * 1000.0 / self.lookup_times.len() as f64
    }

    // == Reset ==
    /// Zeroes all counters and empties the latency window.
    pub fn reset(&mut self) {
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
        self.lookup_times.clear();
    }

    // == Snapshot ==
    /// Derives a [`CacheStats`] for a cache holding `size` of `max_size` entries.
    pub fn snapshot(&self, size: usize, max_size: usize) -> CacheStats {
        let total_lookups = self.hits + self.misses;
        let (hit_rate, miss_rate) = if total_lookups == 0 {
            (0.0, 0.0)
        } else {
            (
                self.hits as f64 / total_lookups as f64,
                self.misses as f64 / total_lookups as f64,
            )
        };

        CacheStats {
            size,
            max_size,
            hit_count: self.hits,
            miss_count: self.misses,
            hit_rate,
            miss_rate,
            avg_lookup_time_ms: self.avg_lookup_time_ms(),
            total_lookups,
            evictions: self.evictions,
        }
    }
}

// == Cache Stats ==
/// Read-only statistics snapshot, computed on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Current number of stored entries
    pub size: usize,
    /// Configured capacity
    pub max_size: usize,
    pub hit_count: u64,
    pub miss_count: u64,
    /// hits / (hits + misses), 0.0 before any lookup
    pub hit_rate: f64,
    /// misses / (hits + misses), 0.0 before any lookup
    pub miss_rate: f64,
    /// Mean latency over the last `LOOKUP_WINDOW` lookups
    pub avg_lookup_time_ms: f64,
    pub total_lookups: u64,
    /// Entries removed by LRU eviction or expiry sweeps
    pub evictions: u64,
}

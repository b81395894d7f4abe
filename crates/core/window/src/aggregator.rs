//! Windowed aggregator
//!
//! Samples live in a lock-free skip list ordered by `(timestamp_ms, seq)`.
//! The sequence number makes every key unique, so two transactions with the
//! same timestamp are both retained. Eviction is a range delete over the
//! key prefix below the cutoff; inserts, trims and summary scans never take
//! a lock.

use chrono::{DateTime, Duration, Utc};
use crossbeam_skiplist::SkipMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

use crate::clock::{Clock, SystemClock};
use crate::sample::Sample;
use crate::summary::{Summary, SummaryBuilder};

/// Retention period in seconds
pub const RETENTION_SECONDS: i64 = 60;

/// Retention period as a duration
#[must_use]
pub fn retention() -> Duration {
    Duration::seconds(RETENTION_SECONDS)
}

/// Oldest timestamp (epoch millis) still inside the window at `now`
fn cutoff_millis(now: DateTime<Utc>, retention: Duration) -> i64 {
    now.timestamp_millis()
        .saturating_sub(retention.num_milliseconds())
}

/// Whether a transaction at `timestamp` is older than the retention period
///
/// Strict comparison at millisecond resolution: a timestamp exactly
/// `retention` before `now` is still inside the window.
#[must_use]
pub fn is_stale(timestamp: DateTime<Utc>, now: DateTime<Utc>, retention: Duration) -> bool {
    timestamp.timestamp_millis() < cutoff_millis(now, retention)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct SampleKey {
    timestamp_ms: i64,
    seq: u64,
}

impl SampleKey {
    /// Smallest key at the given timestamp
    const fn floor(timestamp_ms: i64) -> Self {
        Self {
            timestamp_ms,
            seq: 0,
        }
    }
}

/// Concurrent trailing window of transaction samples
pub struct WindowedAggregator {
    samples: SkipMap<SampleKey, f64>,
    next_seq: AtomicU64,
    clock: Arc<dyn Clock>,
    retention: Duration,
}

impl WindowedAggregator {
    /// Create an aggregator with the standard 60 second retention
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_retention(clock, retention())
    }

    /// Create an aggregator with a custom retention period
    #[must_use]
    pub fn with_retention(clock: Arc<dyn Clock>, retention: Duration) -> Self {
        Self {
            samples: SkipMap::new(),
            next_seq: AtomicU64::new(1),
            clock,
            retention,
        }
    }

    /// Add a transaction unconditionally, then evict stale entries
    ///
    /// Callers check staleness first; this never rejects.
    pub fn insert(&self, timestamp: DateTime<Utc>, amount: f64) {
        self.insert_sample(Sample::new(timestamp, amount));
    }

    /// Add a sample unconditionally, then evict stale entries
    pub fn insert_sample(&self, sample: Sample) {
        let key = SampleKey {
            timestamp_ms: sample.timestamp_millis(),
            seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
        };
        self.samples.insert(key, sample.amount);
        trace!(
            timestamp_ms = key.timestamp_ms,
            seq = key.seq,
            amount = sample.amount,
            "Sample inserted"
        );

        self.trim(self.clock.now(), self.retention);
    }

    /// Remove every sample older than `now - retention`
    ///
    /// Returns how many entries this call removed. Concurrent trims may
    /// race over the same prefix; each entry is removed exactly once.
    pub fn trim(&self, now: DateTime<Utc>, retention: Duration) -> usize {
        let cutoff = SampleKey::floor(cutoff_millis(now, retention));

        let removed = self
            .samples
            .range(..cutoff)
            .filter(|entry| entry.remove())
            .count();

        if removed > 0 {
            debug!(
                removed,
                cutoff_ms = cutoff.timestamp_ms,
                remaining = self.samples.len(),
                "Evicted stale samples"
            );
        }
        removed
    }

    /// Trim, then aggregate the samples still inside the window
    ///
    /// Only keys at or above the cutoff are scanned, so a stale sample
    /// inserted concurrently with the trim is never counted.
    pub fn summary(&self, now: DateTime<Utc>, retention: Duration) -> Summary {
        self.trim(now, retention);

        let cutoff = SampleKey::floor(cutoff_millis(now, retention));
        let mut builder = SummaryBuilder::new();
        for entry in self.samples.range(cutoff..) {
            builder.accept(*entry.value());
        }

        trace!(count = builder.count(), "Window summarised");
        builder.finish()
    }

    /// Samples inside the window at `now`, oldest first
    pub fn snapshot(&self, now: DateTime<Utc>, retention: Duration) -> Vec<Sample> {
        self.trim(now, retention);

        let cutoff = SampleKey::floor(cutoff_millis(now, retention));
        self.samples
            .range(cutoff..)
            .filter_map(|entry| Sample::from_millis(entry.key().timestamp_ms, *entry.value()))
            .collect()
    }

    /// Number of retained samples, including any not yet trimmed
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    #[must_use]
    pub const fn retention(&self) -> Duration {
        self.retention
    }

    #[must_use]
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

impl Default for WindowedAggregator {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl fmt::Debug for WindowedAggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindowedAggregator")
            .field("len", &self.samples.len())
            .field("retention", &self.retention)
            .field("clock", &self.clock)
            .finish()
    }
}

//! Trailing time window over timestamped transaction amounts
//!
//! Keeps every transaction recorded within the retention period and
//! answers sum / average / max / min / count over it on demand.
//! Features:
//! - Lock-free ordered storage, safe for concurrent writers and readers
//! - Range eviction of everything older than the retention period
//! - Duplicate timestamps are kept as distinct samples
//! - Injectable clock for deterministic time travel in tests

pub mod aggregator;
pub mod clock;
pub mod sample;
pub mod summary;

pub use aggregator::{RETENTION_SECONDS, WindowedAggregator, is_stale, retention};
pub use clock::{Clock, ManualClock, SystemClock};
pub use sample::Sample;
pub use summary::{Summary, SummaryBuilder};

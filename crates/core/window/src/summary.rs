//! Aggregate statistics over the window

use serde::{Deserialize, Serialize};

/// Five-field aggregate over the samples currently in the window
///
/// An empty window reports every numeric field as `0.0` and `count == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Summary {
    pub sum: f64,
    pub avg: f64,
    pub max: f64,
    pub min: f64,
    pub count: u64,
}

impl Summary {
    /// Summary of an empty window
    pub const EMPTY: Self = Self {
        sum: 0.0,
        avg: 0.0,
        max: 0.0,
        min: 0.0,
        count: 0,
    };

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}

impl FromIterator<f64> for Summary {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut builder = SummaryBuilder::new();
        for amount in iter {
            builder.accept(amount);
        }
        builder.finish()
    }
}

/// Running accumulator behind [`Summary`]
///
/// The sum is compensated (Neumaier) so that long runs of small amounts
/// next to large ones do not lose precision.
#[derive(Debug, Clone, Copy)]
pub struct SummaryBuilder {
    count: u64,
    sum: f64,
    compensation: f64,
    min: f64,
    max: f64,
}

impl SummaryBuilder {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            compensation: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Add one amount
    pub fn accept(&mut self, amount: f64) {
        self.count += 1;
        self.add_compensated(amount);
        self.min = self.min.min(amount);
        self.max = self.max.max(amount);
    }

    /// Fold another partial accumulator into this one
    pub fn merge(&mut self, other: &Self) {
        if other.count == 0 {
            return;
        }
        self.count += other.count;
        self.add_compensated(other.sum);
        self.add_compensated(other.compensation);
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
    }

    #[must_use]
    pub const fn count(&self) -> u64 {
        self.count
    }

    /// Produce the final summary
    #[must_use]
    pub fn finish(self) -> Summary {
        if self.count == 0 {
            return Summary::EMPTY;
        }

        let sum = self.sum + self.compensation;
        // SAFETY: counts stay far below 2^53 so the conversion is exact
        #[allow(clippy::cast_precision_loss)]
        let avg = sum / self.count as f64;

        Summary {
            sum,
            avg,
            max: self.max,
            min: self.min,
            count: self.count,
        }
    }

    fn add_compensated(&mut self, value: f64) {
        let total = self.sum + value;
        if self.sum.abs() >= value.abs() {
            self.compensation += (self.sum - total) + value;
        } else {
            self.compensation += (value - total) + self.sum;
        }
        self.sum = total;
    }
}

impl Default for SummaryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

use serde::{Deserialize, Serialize};
use zdecay_core::errors::{ErrorInfo, ZdError};

/// Uniform binning of `[low, high)` into `bins` equal-width bins.
///
/// This is the only place a value is mapped to a bin or a bin to its
/// abscissa; histogram fills and the fit engine both go through it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Binning {
    low: f64,
    high: f64,
    bins: usize,
}

impl Binning {
    /// Validates and constructs a binning.
    pub fn new(low: f64, high: f64, bins: usize) -> Result<Self, ZdError> {
        if !low.is_finite() || !high.is_finite() || low >= high {
            return Err(ZdError::Config(
                ErrorInfo::new("binning-range", "histogram edges must be finite with low < high")
                    .with_context("low", low)
                    .with_context("high", high),
            ));
        }
        if bins == 0 {
            return Err(ZdError::Config(
                ErrorInfo::new("binning-count", "histogram needs at least one bin")
                    .with_context("bins", bins),
            ));
        }
        Ok(Self { low, high, bins })
    }

    /// Lower edge of the first bin.
    pub fn low(&self) -> f64 {
        self.low
    }

    /// Upper edge of the last bin (exclusive).
    pub fn high(&self) -> f64 {
        self.high
    }

    /// Number of bins.
    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Width of every bin.
    pub fn width(&self) -> f64 {
        (self.high - self.low) / self.bins as f64
    }

    /// Bin containing `value`, or `None` outside `[low, high)` and for NaN.
    pub fn index(&self, value: f64) -> Option<usize> {
        if value.is_nan() || value < self.low || value >= self.high {
            return None;
        }
        let scaled = (value - self.low) / (self.high - self.low) * self.bins as f64;
        // Rounding can push values just below `high` onto the upper edge.
        Some((scaled.floor() as usize).min(self.bins - 1))
    }

    /// Center of bin `index`.
    pub fn center(&self, index: usize) -> f64 {
        self.low + (index as f64 + 0.5) * self.width()
    }

    /// All `bins + 1` edges, the last one equal to `high`.
    pub fn edges(&self) -> Vec<f64> {
        let width = self.width();
        (0..self.bins)
            .map(|idx| self.low + idx as f64 * width)
            .chain(std::iter::once(self.high))
            .collect()
    }

    /// Whether `[lo, hi]` is a non-empty sub-interval of the binned domain.
    pub fn contains_range(&self, lo: f64, hi: f64) -> bool {
        lo.is_finite() && hi.is_finite() && lo < hi && lo >= self.low && hi <= self.high
    }
}

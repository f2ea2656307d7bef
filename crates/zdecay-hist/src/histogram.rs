use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use zdecay_core::errors::{ErrorInfo, ZdError};

use crate::binning::Binning;

/// Fixed-range one-dimensional histogram with drop accounting.
///
/// Every fill either increments exactly one bin or is tallied as underflow,
/// overflow or non-finite, so `integral() + dropped() == entries()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    name: String,
    title: String,
    binning: Binning,
    counts: Vec<u64>,
    underflow: u64,
    overflow: u64,
    non_finite: u64,
}

impl Histogram {
    /// Empty histogram; the title defaults to the name.
    pub fn new(name: impl Into<String>, binning: Binning) -> Self {
        let name = name.into();
        Self {
            title: name.clone(),
            name,
            counts: vec![0; binning.bins()],
            binning,
            underflow: 0,
            overflow: 0,
            non_finite: 0,
        }
    }

    /// Sets the display title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    pub fn underflow(&self) -> u64 {
        self.underflow
    }

    pub fn overflow(&self) -> u64 {
        self.overflow
    }

    pub fn non_finite(&self) -> u64 {
        self.non_finite
    }

    /// Records one value, returning the bin it landed in.
    pub fn fill(&mut self, value: f64) -> Option<usize> {
        if !value.is_finite() {
            self.non_finite += 1;
            return None;
        }
        match self.binning.index(value) {
            Some(idx) => {
                self.counts[idx] += 1;
                Some(idx)
            }
            None if value < self.binning.low() => {
                self.underflow += 1;
                None
            }
            None => {
                self.overflow += 1;
                None
            }
        }
    }

    /// Records every value of `values`.
    pub fn fill_all<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = f64>,
    {
        let non_finite_before = self.non_finite;
        for value in values {
            self.fill(value);
        }
        let non_finite = self.non_finite - non_finite_before;
        if non_finite > 0 {
            tracing::warn!(histogram = %self.name, non_finite, "dropped non-finite values");
        }
    }

    /// Fills from a slice using per-worker partial histograms merged in order.
    pub fn fill_par(&mut self, values: &[f64]) {
        let template = self.empty_like();
        let partial = values
            .par_iter()
            .fold(
                || template.clone(),
                |mut hist, value| {
                    hist.fill(*value);
                    hist
                },
            )
            .reduce(
                || template.clone(),
                |mut left, right| {
                    left.absorb(&right);
                    left
                },
            );
        if partial.non_finite > 0 {
            tracing::warn!(
                histogram = %self.name,
                non_finite = partial.non_finite,
                "dropped non-finite values"
            );
        }
        self.absorb(&partial);
    }

    /// Adds the contents of `other`, which must share this binning.
    pub fn merge(&mut self, other: &Histogram) -> Result<(), ZdError> {
        if self.binning != other.binning {
            return Err(ZdError::Config(
                ErrorInfo::new("binning-mismatch", "cannot merge histograms with different binning")
                    .with_context("left", &self.name)
                    .with_context("right", &other.name),
            ));
        }
        self.absorb(other);
        Ok(())
    }

    fn absorb(&mut self, other: &Histogram) {
        for (count, extra) in self.counts.iter_mut().zip(&other.counts) {
            *count += extra;
        }
        self.underflow += other.underflow;
        self.overflow += other.overflow;
        self.non_finite += other.non_finite;
    }

    fn empty_like(&self) -> Histogram {
        Histogram::new(self.name.clone(), self.binning).with_title(self.title.clone())
    }

    /// Total number of fill calls.
    pub fn entries(&self) -> u64 {
        self.integral() + self.dropped()
    }

    /// Fills that did not land in a bin.
    pub fn dropped(&self) -> u64 {
        self.underflow + self.overflow + self.non_finite
    }

    /// Sum of all in-range bin counts.
    pub fn integral(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Index of the highest bin; the lowest index wins ties.
    pub fn max_bin(&self) -> usize {
        let mut best = 0;
        for (idx, count) in self.counts.iter().enumerate() {
            if *count > self.counts[best] {
                best = idx;
            }
        }
        best
    }

    /// `(center, count)` pairs for every bin.
    pub fn points(&self) -> impl Iterator<Item = (f64, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(idx, count)| (self.binning.center(idx), *count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mass_histogram() -> Histogram {
        Histogram::new("mass", Binning::new(80.0, 100.0, 60).unwrap())
    }

    #[test]
    fn drops_are_classified() {
        let mut hist = mass_histogram();
        assert_eq!(hist.fill(91.2), Some(33));
        assert_eq!(hist.fill(79.0), None);
        assert_eq!(hist.fill(100.0), None);
        assert_eq!(hist.fill(f64::NAN), None);
        assert_eq!(hist.fill(f64::NEG_INFINITY), None);
        assert_eq!(hist.underflow(), 1);
        assert_eq!(hist.overflow(), 1);
        assert_eq!(hist.non_finite(), 2);
        assert_eq!(hist.integral(), 1);
        assert_eq!(hist.entries(), 5);
    }

    #[test]
    fn max_bin_prefers_first_tie() {
        let mut hist = mass_histogram();
        hist.fill_all([85.0, 85.0, 95.0, 95.0, 90.0]);
        assert_eq!(hist.max_bin(), hist.binning().index(85.0).unwrap());
    }

    #[test]
    fn merge_requires_identical_binning() {
        let mut left = mass_histogram();
        let other = Histogram::new("mass", Binning::new(80.0, 100.0, 40).unwrap());
        let err = left.merge(&other).unwrap_err();
        assert_eq!(err.info().code, "binning-mismatch");
    }

    #[test]
    fn parallel_fill_matches_sequential() {
        let values: Vec<f64> = (0..5000).map(|i| 75.0 + (i as f64) * 0.0061).collect();
        let mut sequential = mass_histogram();
        sequential.fill_all(values.iter().copied());
        let mut parallel = mass_histogram();
        parallel.fill_par(&values);
        assert_eq!(sequential, parallel);
    }
}

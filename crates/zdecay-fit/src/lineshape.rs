use zdecay_core::errors::{ErrorInfo, ZdError};
use zdecay_hist::Histogram;

use crate::options::FitRange;

/// A parametric curve the fit engine can adjust to a histogram.
pub trait Lineshape: Send + Sync {
    /// Stable model name recorded in fit results.
    fn name(&self) -> &str;

    /// Parameter names, in parameter-vector order.
    fn parameter_names(&self) -> &[&str];

    /// Curve value at `x`.
    fn evaluate(&self, x: f64, params: &[f64]) -> f64;

    /// Partial derivatives at `x`, written into `out`.
    ///
    /// The default is a central difference with a step relative to each
    /// parameter's magnitude.
    fn gradient(&self, x: f64, params: &[f64], out: &mut [f64]) {
        let mut shifted = params.to_vec();
        for (idx, slot) in out.iter_mut().enumerate() {
            let step = 1e-6 * params[idx].abs().max(1.0);
            shifted[idx] = params[idx] + step;
            let upper = self.evaluate(x, &shifted);
            shifted[idx] = params[idx] - step;
            let lower = self.evaluate(x, &shifted);
            shifted[idx] = params[idx];
            *slot = (upper - lower) / (2.0 * step);
        }
    }

    /// Maps equivalent parameter vectors onto one representative.
    fn canonicalize(&self, _params: &mut [f64]) {}
}

/// Non-relativistic Breit-Wigner `A / ((x - mean)^2 + (width / 2)^2)`.
///
/// Parameters are `(amplitude, mean, width)`. Only `width^2` enters the
/// curve, so [`Lineshape::canonicalize`] reports `|width|`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BreitWigner;

impl BreitWigner {
    /// Model name recorded in fit results.
    pub const NAME: &'static str = "breit-wigner";

    /// Starting point read off the histogram inside `range`: the highest bin
    /// gives the mean, the span of bins above half of it the width, and the
    /// peak height fixes the amplitude.
    pub fn guess(histogram: &Histogram, range: FitRange) -> Result<Vec<f64>, ZdError> {
        let binning = histogram.binning();
        let included: Vec<(f64, u64)> = histogram
            .points()
            .filter(|(x, _)| range.contains(*x))
            .collect();
        let peak = included
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, u64)>, (idx, (_, count))| match best {
                Some((_, top)) if top >= *count => best,
                _ => Some((idx, *count)),
            });
        let (peak_idx, peak_count) = match peak {
            Some((idx, count)) if count > 0 => (idx, count),
            _ => {
                return Err(ZdError::Config(
                    ErrorInfo::new("empty-fit-range", "no entries inside the fit range")
                        .with_context("histogram", histogram.name())
                        .with_context("range", format!("[{}, {}]", range.low, range.high)),
                ))
            }
        };
        let half = peak_count as f64 / 2.0;
        let mut left = peak_idx;
        while left > 0 && included[left - 1].1 as f64 >= half {
            left -= 1;
        }
        let mut right = peak_idx;
        while right + 1 < included.len() && included[right + 1].1 as f64 >= half {
            right += 1;
        }
        let width = (included[right].0 - included[left].0 + binning.width()).max(binning.width());
        let mean = included[peak_idx].0;
        let amplitude = peak_count as f64 * (width / 2.0).powi(2);
        Ok(vec![amplitude, mean, width])
    }
}

impl Lineshape for BreitWigner {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn parameter_names(&self) -> &[&str] {
        &["amplitude", "mean", "width"]
    }

    fn evaluate(&self, x: f64, params: &[f64]) -> f64 {
        let (amplitude, mean, width) = (params[0], params[1], params[2]);
        let dx = x - mean;
        amplitude / (dx * dx + 0.25 * width * width)
    }

    fn gradient(&self, x: f64, params: &[f64], out: &mut [f64]) {
        let (amplitude, mean, width) = (params[0], params[1], params[2]);
        let dx = x - mean;
        let denom = dx * dx + 0.25 * width * width;
        let denom2 = denom * denom;
        out[0] = 1.0 / denom;
        out[1] = 2.0 * amplitude * dx / denom2;
        out[2] = -0.5 * amplitude * width / denom2;
    }

    fn canonicalize(&self, params: &mut [f64]) {
        params[2] = params[2].abs();
    }
}

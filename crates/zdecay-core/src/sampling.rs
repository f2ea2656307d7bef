//! Named distributions drawn from an explicitly owned stream.
//!
//! Every draw consumes the same stream words whatever the parameter values
//! are, so degenerate parameters (zero width, zero smearing, zero mean) keep
//! the remainder of a job's stream aligned with the non-degenerate run.

use std::f64::consts::PI;

use rand::Rng;
use rand_distr::{Cauchy, Distribution, Exp1, StandardNormal};

/// Sampling primitives available on every random stream.
pub trait Sampler: Rng {
    /// Uniform draw on `[lo, hi)`. Returns `lo` when the interval is empty.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        let u: f64 = self.gen();
        lo + (hi - lo) * u
    }

    /// Uniform azimuthal angle on `[0, 2π)`.
    fn azimuth(&mut self) -> f64 {
        self.uniform(0.0, 2.0 * PI)
    }

    /// Exponential draw with the given mean.
    fn exponential(&mut self, mean: f64) -> f64 {
        let unit: f64 = Exp1.sample(self);
        mean * unit
    }

    /// Normal draw with the given mean and standard deviation.
    fn gaussian(&mut self, mean: f64, sigma: f64) -> f64 {
        let unit: f64 = StandardNormal.sample(self);
        mean + sigma * unit
    }

    /// Cauchy-form Breit-Wigner draw centred at `mean` with full width at
    /// half maximum `width`.
    fn breit_wigner(&mut self, mean: f64, width: f64) -> f64 {
        debug_assert!(width >= 0.0, "negative Breit-Wigner width");
        match Cauchy::new(mean, 0.5 * width) {
            Ok(dist) => dist.sample(self),
            Err(_) => {
                let _: f64 = self.gen();
                mean
            }
        }
    }
}

impl<R: Rng + ?Sized> Sampler for R {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::RngHandle;

    #[test]
    fn uniform_stays_in_half_open_interval() {
        let mut rng = RngHandle::from_seed(3);
        for _ in 0..10_000 {
            let value = rng.uniform(-2.5, 2.5);
            assert!((-2.5..2.5).contains(&value));
        }
    }

    #[test]
    fn degenerate_parameters_return_location() {
        let mut rng = RngHandle::from_seed(11);
        assert_eq!(rng.uniform(0.0, 0.0), 0.0);
        assert_eq!(rng.exponential(0.0), 0.0);
        assert_eq!(rng.gaussian(45.0, 0.0), 45.0);
        assert_eq!(rng.breit_wigner(91.1876, 0.0), 91.1876);
    }

    #[test]
    fn degenerate_draws_keep_stream_aligned() {
        let mut a = RngHandle::from_seed(21);
        let mut b = RngHandle::from_seed(21);
        let _ = a.breit_wigner(91.0, 2.5);
        let _ = b.breit_wigner(91.0, 0.0);
        assert_eq!(a.uniform(0.0, 1.0), b.uniform(0.0, 1.0));
    }

    #[test]
    fn sample_moments_match_parameters() {
        let mut rng = RngHandle::from_seed(5);
        let n = 200_000;
        let exp_mean = (0..n).map(|_| rng.exponential(10.0)).sum::<f64>() / n as f64;
        assert!((exp_mean - 10.0).abs() < 0.15, "exponential mean {exp_mean}");

        let draws: Vec<f64> = (0..n).map(|_| rng.gaussian(1.0, 2.0)).collect();
        let mean = draws.iter().sum::<f64>() / n as f64;
        let var = draws.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((mean - 1.0).abs() < 0.03, "gaussian mean {mean}");
        assert!((var.sqrt() - 2.0).abs() < 0.03, "gaussian sigma {}", var.sqrt());
    }

    #[test]
    fn breit_wigner_half_width_quantiles() {
        // For a Cauchy shape half of the mass lies within mean ± width/2.
        let mut rng = RngHandle::from_seed(8);
        let n = 100_000;
        let inside = (0..n)
            .map(|_| rng.breit_wigner(91.1876, 2.4952))
            .filter(|m| (m - 91.1876).abs() < 1.2476)
            .count();
        let fraction = inside as f64 / n as f64;
        assert!((fraction - 0.5).abs() < 0.01, "fraction {fraction}");
    }
}

use serde::{Deserialize, Serialize};

/// Closed abscissa interval selecting the bins a fit uses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FitRange {
    /// Lower bound (inclusive).
    pub low: f64,
    /// Upper bound (inclusive).
    pub high: f64,
}

impl FitRange {
    /// Creates a range; validity is checked against the histogram at fit time.
    pub const fn new(low: f64, high: f64) -> Self {
        Self { low, high }
    }

    /// Whether a bin center at `x` is part of the fit.
    pub fn contains(&self, x: f64) -> bool {
        x >= self.low && x <= self.high
    }
}

impl Default for FitRange {
    fn default() -> Self {
        Self::new(80.0, 100.0)
    }
}

/// Options controlling a Levenberg-Marquardt fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitOpts {
    /// Starting parameter vector, one entry per model parameter.
    #[serde(default = "default_initial")]
    pub initial: Vec<f64>,
    /// Bins whose centers fall inside this range are fitted.
    #[serde(default)]
    pub range: FitRange,
    /// Iteration cap; reaching it without convergence is an error.
    #[serde(default = "default_max_iterations")]
    pub max_iterations: usize,
    /// Accepted steps improving chi-square by less than this end the fit.
    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
    /// Starting damping factor.
    #[serde(default = "default_initial_damping")]
    pub initial_damping: f64,
}

fn default_initial() -> Vec<f64> {
    vec![1.0e5, 91.2, 2.5]
}

fn default_max_iterations() -> usize {
    200
}

fn default_tolerance() -> f64 {
    1.0e-6
}

fn default_initial_damping() -> f64 {
    1.0e-3
}

impl Default for FitOpts {
    fn default() -> Self {
        Self {
            initial: default_initial(),
            range: FitRange::default(),
            max_iterations: default_max_iterations(),
            tolerance: default_tolerance(),
            initial_damping: default_initial_damping(),
        }
    }
}

impl FitOpts {
    /// Options with a different starting point.
    pub fn with_initial(mut self, initial: Vec<f64>) -> Self {
        self.initial = initial;
        self
    }

    /// Options with a different fit range.
    pub fn with_range(mut self, low: f64, high: f64) -> Self {
        self.range = FitRange::new(low, high);
        self
    }

    /// Options with a different iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

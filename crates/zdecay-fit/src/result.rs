use serde::{Deserialize, Serialize};

use crate::options::FitRange;

/// Outcome of a converged fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitResult {
    /// Name of the fitted model.
    pub model: String,
    /// Parameter names, matching `parameters` by position.
    pub parameter_names: Vec<String>,
    /// Best-fit parameters.
    pub parameters: Vec<f64>,
    /// Marginal one-sigma errors from the covariance diagonal.
    pub parameter_errors: Vec<f64>,
    /// Chi-square at the optimum.
    pub chi_square: f64,
    /// Included bins minus free parameters.
    pub degrees_of_freedom: usize,
    /// Iterations performed.
    pub iterations: usize,
    /// Inverse of the curvature matrix `J^T J` at the optimum, row major.
    pub covariance: Vec<Vec<f64>>,
    /// Range the fit was performed over.
    pub fit_range: FitRange,
}

impl FitResult {
    /// `chi_square / degrees_of_freedom`, undefined for zero degrees of freedom.
    pub fn reduced_chi_square(&self) -> Option<f64> {
        (self.degrees_of_freedom > 0).then(|| self.chi_square / self.degrees_of_freedom as f64)
    }

    /// Best-fit value and error of the named parameter.
    pub fn parameter(&self, name: &str) -> Option<(f64, f64)> {
        self.parameter_names
            .iter()
            .position(|candidate| candidate == name)
            .map(|idx| (self.parameters[idx], self.parameter_errors[idx]))
    }
}

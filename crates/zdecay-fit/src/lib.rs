//! Lineshape fits for zdecay histograms.
//!
//! [`fit_histogram`] minimizes a binned chi-square with Levenberg-Marquardt
//! steps and reports parameter errors from the inverse curvature matrix.
//! Models implement [`Lineshape`]; [`BreitWigner`] is the resonance model.

#![deny(missing_docs)]

/// Levenberg-Marquardt minimizer.
pub mod engine;
/// Fit models.
pub mod lineshape;
/// Fit options and ranges.
pub mod options;
/// Fit outcomes.
pub mod result;

pub use engine::fit_histogram;
pub use lineshape::{BreitWigner, Lineshape};
pub use options::{FitOpts, FitRange};
pub use result::FitResult;

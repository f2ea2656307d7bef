use nalgebra::{DMatrix, DVector};
use zdecay_core::errors::{ErrorInfo, FitFailure, ZdError};
use zdecay_hist::Histogram;

use crate::lineshape::Lineshape;
use crate::options::FitOpts;
use crate::result::FitResult;

const DAMPING_UP: f64 = 10.0;
const DAMPING_DOWN: f64 = 10.0;
const MIN_DAMPING: f64 = 1.0e-12;
const MAX_DAMPING: f64 = 1.0e12;

/// One included bin.
#[derive(Debug, Clone, Copy)]
struct FitPoint {
    x: f64,
    observed: f64,
    sigma: f64,
}

fn collect_points(histogram: &Histogram, opts: &FitOpts) -> Vec<FitPoint> {
    histogram
        .points()
        .filter(|(x, _)| opts.range.contains(*x))
        .map(|(x, count)| {
            let observed = count as f64;
            FitPoint {
                x,
                observed,
                sigma: observed.sqrt().max(1.0),
            }
        })
        .collect()
}

fn chi_square<M: Lineshape + ?Sized>(points: &[FitPoint], model: &M, params: &[f64]) -> f64 {
    points
        .iter()
        .map(|point| {
            let pull = (point.observed - model.evaluate(point.x, params)) / point.sigma;
            pull * pull
        })
        .sum()
}

/// Weighted `J^T J` and `J^T r` at `params`.
fn normal_equations<M: Lineshape + ?Sized>(
    points: &[FitPoint],
    model: &M,
    params: &[f64],
) -> (DMatrix<f64>, DVector<f64>) {
    let n = params.len();
    let mut curvature = DMatrix::<f64>::zeros(n, n);
    let mut gradient = DVector::<f64>::zeros(n);
    let mut grad = vec![0.0; n];
    for point in points {
        model.gradient(point.x, params, &mut grad);
        let weight = 1.0 / (point.sigma * point.sigma);
        let residual = point.observed - model.evaluate(point.x, params);
        for a in 0..n {
            gradient[a] += grad[a] * residual * weight;
            for b in 0..n {
                curvature[(a, b)] += grad[a] * grad[b] * weight;
            }
        }
    }
    (curvature, gradient)
}

fn config_error(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message).with_context("stage", "fit-setup")
}

fn validate<M: Lineshape + ?Sized>(
    histogram: &Histogram,
    model: &M,
    opts: &FitOpts,
) -> Result<(), ZdError> {
    let expected = model.parameter_names().len();
    if opts.initial.len() != expected {
        return Err(ZdError::Config(
            config_error("guess-length", "initial guess does not match the model")
                .with_context("model", model.name())
                .with_context("expected", expected)
                .with_context("found", opts.initial.len()),
        ));
    }
    if opts.initial.iter().any(|value| !value.is_finite()) {
        return Err(ZdError::Config(
            config_error("initial-guess", "initial guess must be finite")
                .with_context("initial", format!("{:?}", opts.initial)),
        ));
    }
    let binning = histogram.binning();
    if !binning.contains_range(opts.range.low, opts.range.high) {
        return Err(ZdError::Config(
            config_error("fit-range", "fit range must lie inside the histogram domain")
                .with_context("histogram", histogram.name())
                .with_context("range", format!("[{}, {}]", opts.range.low, opts.range.high))
                .with_context("domain", format!("[{}, {})", binning.low(), binning.high())),
        ));
    }
    if opts.max_iterations == 0 {
        return Err(ZdError::Config(config_error(
            "max-iterations",
            "iteration cap must be positive",
        )));
    }
    if !(opts.tolerance.is_finite() && opts.tolerance >= 0.0)
        || !(opts.initial_damping.is_finite() && opts.initial_damping > 0.0)
    {
        return Err(ZdError::Config(
            config_error(
                "fit-options",
                "tolerance must be non-negative and damping positive",
            )
            .with_context("tolerance", opts.tolerance)
            .with_context("initial_damping", opts.initial_damping),
        ));
    }
    Ok(())
}

/// Fits `model` to the bins of `histogram` whose centers lie in `opts.range`.
///
/// Each bin contributes `((observed - f(center)) / sigma)^2` with
/// `sigma = max(sqrt(observed), 1)`. Steps solve the damped normal equations
/// `(J^T J + lambda diag(J^T J)) delta = J^T r`; the damping shrinks after an
/// accepted step and grows after a rejected one. A step that cannot lower
/// chi-square even at maximal damping ends the fit at the current point.
pub fn fit_histogram<M: Lineshape + ?Sized>(
    histogram: &Histogram,
    model: &M,
    opts: &FitOpts,
) -> Result<FitResult, ZdError> {
    validate(histogram, model, opts)?;
    let points = collect_points(histogram, opts);
    let n = opts.initial.len();
    if points.len() < n {
        return Err(ZdError::Config(
            config_error("too-few-bins", "fit range includes fewer bins than parameters")
                .with_context("bins", points.len())
                .with_context("parameters", n),
        ));
    }

    let mut params = opts.initial.clone();
    model.canonicalize(&mut params);
    let mut chi2 = chi_square(&points, model, &params);
    if !chi2.is_finite() {
        return Err(ZdError::Config(
            config_error("non-finite-start", "chi-square is not finite at the initial guess")
                .with_context("initial", format!("{params:?}")),
        ));
    }

    let mut damping = opts.initial_damping;
    let mut iterations = 0;
    let mut converged = false;
    while iterations < opts.max_iterations {
        iterations += 1;
        let (curvature, gradient) = normal_equations(&points, model, &params);
        let mut improvement = None;
        while damping <= MAX_DAMPING {
            let mut damped = curvature.clone();
            for j in 0..n {
                let diag = curvature[(j, j)];
                damped[(j, j)] = if diag > 0.0 {
                    diag * (1.0 + damping)
                } else {
                    damping
                };
            }
            if let Some(cholesky) = damped.cholesky() {
                let step = cholesky.solve(&gradient);
                let mut trial: Vec<f64> =
                    params.iter().zip(step.iter()).map(|(p, d)| p + d).collect();
                model.canonicalize(&mut trial);
                let trial_chi2 = chi_square(&points, model, &trial);
                if trial_chi2.is_finite() && trial_chi2 < chi2 {
                    improvement = Some(chi2 - trial_chi2);
                    params = trial;
                    chi2 = trial_chi2;
                    damping = (damping / DAMPING_DOWN).max(MIN_DAMPING);
                    break;
                }
            }
            damping *= DAMPING_UP;
        }
        tracing::debug!(
            iteration = iterations,
            chi_square = chi2,
            damping,
            parameters = ?params,
            "fit iteration"
        );
        match improvement {
            Some(delta) if delta > opts.tolerance => {}
            _ => {
                converged = true;
                break;
            }
        }
    }

    if !converged {
        return Err(ZdError::NonConvergence(FitFailure {
            info: ErrorInfo::new("iteration-cap", "fit reached its iteration cap")
                .with_context("model", model.name())
                .with_context("max_iterations", opts.max_iterations)
                .with_hint("raise max_iterations or start closer to the optimum"),
            parameters: params,
            iterations,
            chi_square: chi2,
        }));
    }

    let singular = |code: &str, message: &str, params: Vec<f64>| {
        ZdError::SingularCurvature(FitFailure {
            info: ErrorInfo::new(code, message).with_context("model", model.name()),
            parameters: params,
            iterations,
            chi_square: chi2,
        })
    };
    let (curvature, _) = normal_equations(&points, model, &params);
    let singular_values = curvature.singular_values();
    let largest = singular_values.max();
    let condition = singular_values.min() / largest;
    if !(largest > 0.0 && condition >= n as f64 * f64::EPSILON) {
        tracing::warn!(model = model.name(), condition, "flat optimum");
        return Err(ZdError::SingularCurvature(FitFailure {
            info: ErrorInfo::new(
                "ill-conditioned-curvature",
                "curvature matrix is numerically singular at the optimum",
            )
            .with_context("model", model.name())
            .with_context("condition", condition)
            .with_hint("check that the fit range holds populated bins"),
            parameters: params,
            iterations,
            chi_square: chi2,
        }));
    }
    let covariance = match curvature.cholesky() {
        Some(cholesky) => cholesky.inverse(),
        None => {
            return Err(singular(
                "singular-curvature",
                "curvature matrix is not invertible at the optimum",
                params,
            ))
        }
    };
    let mut parameter_errors = Vec::with_capacity(n);
    for j in 0..n {
        let variance = covariance[(j, j)];
        if !(variance.is_finite() && variance > 0.0) {
            return Err(singular(
                "non-positive-variance",
                "covariance has a non-positive variance",
                params,
            ));
        }
        parameter_errors.push(variance.sqrt());
    }

    let result = FitResult {
        model: model.name().to_string(),
        parameter_names: model
            .parameter_names()
            .iter()
            .map(|name| name.to_string())
            .collect(),
        parameters: params,
        parameter_errors,
        chi_square: chi2,
        degrees_of_freedom: points.len() - n,
        iterations,
        covariance: (0..n)
            .map(|i| (0..n).map(|j| covariance[(i, j)]).collect())
            .collect(),
        fit_range: opts.range,
    };
    tracing::info!(
        model = %result.model,
        chi_square = result.chi_square,
        dof = result.degrees_of_freedom,
        iterations,
        "fit converged"
    );
    Ok(result)
}

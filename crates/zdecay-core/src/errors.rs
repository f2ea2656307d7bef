//! Structured error types shared across zdecay crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`ZdError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (stage, parameter values, paths, etc.).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

/// Diagnostic state captured when a fit terminates without a usable optimum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitFailure {
    /// Structured description of the failure.
    pub info: ErrorInfo,
    /// Parameter vector at termination.
    pub parameters: Vec<f64>,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Chi-square at the last accepted parameter vector.
    pub chi_square: f64,
}

impl Display for FitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | iterations={} chi_square={} parameters={:?}",
            self.info, self.iterations, self.chi_square, self.parameters
        )
    }
}

/// Canonical error type for the zdecay pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum ZdError {
    /// Invalid physics, run, histogram or fit parameters.
    #[error("configuration error: {0}")]
    Config(ErrorInfo),
    /// The fit hit its iteration cap before meeting the tolerance.
    #[error("fit did not converge: {0}")]
    NonConvergence(FitFailure),
    /// The curvature matrix could not be inverted at termination.
    #[error("singular curvature: {0}")]
    SingularCurvature(FitFailure),
    /// Event store, manifest or renderer I/O failures.
    #[error("storage error: {0}")]
    Storage(ErrorInfo),
    /// Serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl ZdError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            ZdError::Config(info) | ZdError::Storage(info) | ZdError::Serde(info) => info,
            ZdError::NonConvergence(failure) | ZdError::SingularCurvature(failure) => {
                &failure.info
            }
        }
    }

    /// Returns the fit diagnostics for fit failures.
    pub fn fit_failure(&self) -> Option<&FitFailure> {
        match self {
            ZdError::NonConvergence(failure) | ZdError::SingularCurvature(failure) => {
                Some(failure)
            }
            _ => None,
        }
    }

    /// Shorthand for a configuration error.
    pub fn config(code: &str, message: impl Into<String>) -> Self {
        ZdError::Config(ErrorInfo::new(code, message))
    }

    /// Shorthand for a storage error wrapping an underlying I/O failure.
    pub fn storage(code: &str, err: impl ToString) -> Self {
        ZdError::Storage(ErrorInfo::new(code, err.to_string()))
    }

    /// Shorthand for a serialization error.
    pub fn serde(code: &str, err: impl ToString) -> Self {
        ZdError::Serde(ErrorInfo::new(code, err.to_string()))
    }
}

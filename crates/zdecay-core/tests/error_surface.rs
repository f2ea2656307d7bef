use zdecay_core::errors::{ErrorInfo, FitFailure, ZdError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("stage", "generate")
        .with_context("central_mass", 91.1876)
}

fn sample_failure(code: &str) -> FitFailure {
    FitFailure {
        info: sample_info(code, "fit failed"),
        parameters: vec![1e5, 91.2, 2.5],
        iterations: 7,
        chi_square: 12.5,
    }
}

#[test]
fn config_error_surface() {
    let err = ZdError::Config(sample_info("CFG001", "mass below threshold"));
    assert_eq!(err.info().code, "CFG001");
    assert_eq!(err.info().context["central_mass"], "91.1876");
    assert!(err.fit_failure().is_none());
}

#[test]
fn storage_error_surface() {
    let err = ZdError::storage("store-open", "permission denied");
    assert_eq!(err.info().code, "store-open");
    assert!(err.to_string().starts_with("storage error"));
}

#[test]
fn fit_errors_carry_diagnostics() {
    let err = ZdError::NonConvergence(sample_failure("iteration-cap"));
    let failure = err.fit_failure().expect("diagnostics");
    assert_eq!(failure.iterations, 7);
    assert_eq!(failure.parameters.len(), 3);
    assert_eq!(err.info().code, "iteration-cap");

    let err = ZdError::SingularCurvature(sample_failure("singular"));
    assert!(err.to_string().contains("iterations=7"));
}

#[test]
fn errors_round_trip_json() {
    let err = ZdError::SingularCurvature(sample_failure("singular"));
    let json = serde_json::to_string(&err).expect("serialize");
    let decoded: ZdError = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(decoded, err);
}

#[test]
fn hint_is_rendered() {
    let info = ErrorInfo::new("E1", "bad width").with_hint("use a positive width");
    assert!(info.to_string().ends_with("hint: use a positive width"));
}

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use zdecay_core::errors::{ErrorInfo, ZdError};
use zdecay_core::serde::to_canonical_json_bytes;
use zdecay_core::{Event, RunProvenance};
use zdecay_fit::{fit_histogram, BreitWigner, FitResult, Lineshape};
use zdecay_gen::{EventGenerator, GenerationSummary};
use zdecay_hist::{Histogram, Overlay, Renderer};
use zdecay_store::{open_sink, read_events, stable_hash, RunManifest};

use crate::config::{AnalysisConfig, RunConfig};

/// File name of the run manifest inside a run directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Outcome of [`run_generation`].
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    /// Path of the written manifest.
    pub manifest_path: PathBuf,
    /// The manifest itself.
    pub manifest: RunManifest<RunConfig>,
    /// Generator summary statistics.
    pub summary: GenerationSummary,
}

fn io_error(code: &str, path: &Path, err: std::io::Error) -> ZdError {
    ZdError::Storage(ErrorInfo::new(code, err.to_string()).with_context("path", path.display()))
}

/// Writes `value` as canonical JSON to `path`.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ZdError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| io_error("output-mkdir", parent, err))?;
    }
    let bytes = to_canonical_json_bytes(value)?;
    fs::write(path, bytes).map_err(|err| io_error("output-write", path, err))
}

/// Generates the configured events into `out_dir` and records a manifest.
pub fn run_generation(config: &RunConfig, out_dir: &Path) -> Result<GenerationOutcome, ZdError> {
    config.validate()?;
    fs::create_dir_all(out_dir).map_err(|err| io_error("output-mkdir", out_dir, err))?;

    let events_path = config.store.events_path(out_dir);
    if let Some(parent) = events_path.parent() {
        fs::create_dir_all(parent).map_err(|err| io_error("output-mkdir", parent, err))?;
    }
    let generator = EventGenerator::new(config.generator.clone())?;
    let mut sink = open_sink(config.store.format, &events_path)?;
    let summary = if config.generator.workers > 1 {
        let events = generator.generate()?;
        sink.write_all(&events)?;
        generator.summarise(&events)
    } else {
        generator.stream(|chunk| sink.write_all(chunk))?
    };
    sink.finish()?;
    drop(sink);

    let seed_policy = &config.generator.seed_policy;
    let provenance = RunProvenance {
        config_hash: stable_hash(config)?,
        seed: seed_policy.master_seed,
        created_at: Utc::now().to_rfc3339(),
        ..RunProvenance::default()
    }
    .with_tool("zdecay-sim", env!("CARGO_PKG_VERSION"));
    let manifest = RunManifest::describe(
        config.clone(),
        seed_policy.master_seed,
        seed_policy.label.clone(),
        config.store.format,
        &events_path,
        summary.events,
        provenance,
    )?
    .relative_to(out_dir)?;
    let manifest_path = out_dir.join(MANIFEST_FILE);
    manifest.write(&manifest_path)?;
    write_json(&out_dir.join("summary.json"), &summary)?;
    tracing::info!(
        out = %out_dir.display(),
        events = summary.events,
        sha256 = %manifest.events_sha256,
        "generation run recorded"
    );
    Ok(GenerationOutcome {
        manifest_path,
        manifest,
        summary,
    })
}

/// Loads a run manifest, checks the event file digest and reads the events.
pub fn load_run(run_dir: &Path) -> Result<(RunManifest<RunConfig>, Vec<Event>), ZdError> {
    let manifest_path = run_dir.join(MANIFEST_FILE);
    let manifest: RunManifest<RunConfig> = RunManifest::load(&manifest_path)?;
    manifest.verify(&manifest_path)?;
    let events = read_events(manifest.format, &manifest.events_path(&manifest_path))?;
    if events.len() != manifest.event_count {
        return Err(ZdError::Storage(
            ErrorInfo::new("event-count", "event store does not hold the recorded event count")
                .with_context("expected", manifest.event_count)
                .with_context("found", events.len()),
        ));
    }
    Ok((manifest, events))
}

/// Filled histograms plus the fit of the target histogram.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Histograms in configuration order.
    pub histograms: Vec<Histogram>,
    /// Fit of the configured target histogram.
    pub fit: FitResult,
}

/// Per-histogram bookkeeping written to the analysis report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSummary {
    /// Histogram name.
    pub name: String,
    /// Fill calls.
    pub entries: u64,
    /// In-range fills.
    pub integral: u64,
    /// Fills below the lower edge.
    pub underflow: u64,
    /// Fills at or above the upper edge.
    pub overflow: u64,
    /// NaN or infinite fills.
    pub non_finite: u64,
}

impl From<&Histogram> for HistogramSummary {
    fn from(hist: &Histogram) -> Self {
        Self {
            name: hist.name().to_string(),
            entries: hist.entries(),
            integral: hist.integral(),
            underflow: hist.underflow(),
            overflow: hist.overflow(),
            non_finite: hist.non_finite(),
        }
    }
}

/// Serializable summary of an analysis pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Events analysed.
    pub events: usize,
    /// Histogram bookkeeping.
    pub histograms: Vec<HistogramSummary>,
    /// Name of the fitted histogram.
    pub fit_target: String,
    /// Fit outcome.
    pub fit: FitResult,
}

/// Fills one histogram per configured observable.
pub fn fill_histograms(
    events: &[Event],
    config: &AnalysisConfig,
) -> Result<Vec<Histogram>, ZdError> {
    let mut histograms = Vec::with_capacity(config.histograms.len());
    for spec in &config.histograms {
        let mut hist = Histogram::new(spec.name.clone(), spec.binning()?);
        if let Some(title) = &spec.title {
            hist = hist.with_title(title.clone());
        }
        let values: Vec<f64> = events
            .iter()
            .map(|event| spec.observable.value(event))
            .collect();
        hist.fill_par(&values);
        tracing::debug!(
            histogram = %spec.name,
            integral = hist.integral(),
            dropped = hist.dropped(),
            "histogram filled"
        );
        histograms.push(hist);
    }
    Ok(histograms)
}

/// Histograms the events and fits the configured target.
pub fn analyze(events: &[Event], config: &AnalysisConfig) -> Result<Analysis, ZdError> {
    config.validate()?;
    let histograms = fill_histograms(events, config)?;
    let target = histograms
        .iter()
        .find(|hist| hist.name() == config.fit.target)
        .ok_or_else(|| {
            ZdError::Config(
                ErrorInfo::new("fit-target", "fit target is not a configured histogram")
                    .with_context("target", &config.fit.target),
            )
        })?;
    let mut opts = config.fit.options.clone();
    if config.fit.guess_from_histogram {
        opts.initial = BreitWigner::guess(target, opts.range)?;
    }
    let fit =
        fit_histogram(target, &BreitWigner, &opts).map_err(|err| annotate_fit(err, target))?;
    tracing::info!(
        target = %config.fit.target,
        mean = fit.parameters[1],
        width = fit.parameters[2],
        chi_square = fit.chi_square,
        dof = fit.degrees_of_freedom,
        "lineshape fitted"
    );
    Ok(Analysis { histograms, fit })
}

fn annotate_fit(err: ZdError, target: &Histogram) -> ZdError {
    match err {
        ZdError::Config(info) => ZdError::Config(info.with_context("histogram", target.name())),
        ZdError::NonConvergence(mut failure) => {
            failure.info = failure.info.with_context("histogram", target.name());
            ZdError::NonConvergence(failure)
        }
        ZdError::SingularCurvature(mut failure) => {
            failure.info = failure.info.with_context("histogram", target.name());
            ZdError::SingularCurvature(failure)
        }
        other => other,
    }
}

impl Analysis {
    /// Fitted curve sampled across the fit range.
    pub fn overlay(&self, samples: usize) -> Overlay {
        let params = self.fit.parameters.clone();
        Overlay::sample(
            BreitWigner.name(),
            params.clone(),
            (self.fit.fit_range.low, self.fit.fit_range.high),
            samples,
            |x| BreitWigner.evaluate(x, &params),
        )
    }

    /// Sends every histogram to `renderer`, attaching the overlay to the fitted one.
    pub fn render<R: Renderer + ?Sized>(
        &self,
        renderer: &mut R,
        fit_target: &str,
        overlay_samples: usize,
    ) -> Result<(), ZdError> {
        let overlay = self.overlay(overlay_samples);
        for hist in &self.histograms {
            let attached = (hist.name() == fit_target).then_some(&overlay);
            renderer.render(hist, attached)?;
        }
        Ok(())
    }

    /// Bookkeeping summary for `events` analysed events.
    pub fn report(&self, events: usize, fit_target: &str) -> AnalysisReport {
        AnalysisReport {
            events,
            histograms: self.histograms.iter().map(HistogramSummary::from).collect(),
            fit_target: fit_target.to_string(),
            fit: self.fit.clone(),
        }
    }
}

/// Fit parameters compared against the generator's truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClosureReport {
    /// Generated pole mass.
    pub true_mass: f64,
    /// Generated width.
    pub true_width: f64,
    /// Fitted mean and its error.
    pub fitted_mass: (f64, f64),
    /// Fitted width and its error.
    pub fitted_width: (f64, f64),
    /// `|fitted - true| / true` for the mass.
    pub mass_deviation: f64,
    /// `|fitted - true| / true` for the width.
    pub width_deviation: f64,
    /// Chi-square per degree of freedom.
    pub reduced_chi_square: Option<f64>,
    /// Whether both deviations are inside their tolerances.
    pub passed: bool,
}

/// Relative tolerance on the recovered mass.
pub const MASS_TOLERANCE: f64 = 0.01;
/// Relative tolerance on the recovered width.
pub const WIDTH_TOLERANCE: f64 = 0.10;

/// Compares a fit of the resonance mass against the generating parameters.
pub fn closure_report(config: &RunConfig, fit: &FitResult) -> ClosureReport {
    let physics = &config.generator.physics;
    let (mass, mass_err) = fit.parameter("mean").unwrap_or((f64::NAN, f64::NAN));
    let (width, width_err) = fit.parameter("width").unwrap_or((f64::NAN, f64::NAN));
    let mass_deviation = (mass - physics.central_mass).abs() / physics.central_mass;
    let width_deviation = (width - physics.natural_width).abs() / physics.natural_width;
    ClosureReport {
        true_mass: physics.central_mass,
        true_width: physics.natural_width,
        fitted_mass: (mass, mass_err),
        fitted_width: (width, width_err),
        mass_deviation,
        width_deviation,
        reduced_chi_square: fit.reduced_chi_square(),
        passed: mass_deviation <= MASS_TOLERANCE && width_deviation <= WIDTH_TOLERANCE,
    }
}

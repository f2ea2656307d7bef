use std::collections::BTreeSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use zdecay_core::errors::{ErrorInfo, ZdError};
use zdecay_core::Observable;
use zdecay_fit::FitOpts;
use zdecay_gen::GeneratorConfig;
use zdecay_hist::Binning;
use zdecay_store::StoreFormat;

/// Top-level YAML configuration of a generate/analyze run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunConfig {
    /// Event generation parameters.
    #[serde(default)]
    pub generator: GeneratorConfig,
    /// Event store layout.
    #[serde(default)]
    pub store: StoreConfig,
    /// Histogramming and fit settings.
    #[serde(default)]
    pub analysis: AnalysisConfig,
}

impl RunConfig {
    /// Reads a YAML configuration.
    pub fn load(path: &Path) -> Result<Self, ZdError> {
        let contents = fs::read_to_string(path).map_err(|err| {
            ZdError::Storage(
                ErrorInfo::new("config-read", err.to_string()).with_context("path", path.display()),
            )
        })?;
        serde_yaml::from_str(&contents).map_err(|err| {
            ZdError::Serde(
                ErrorInfo::new("config-parse", err.to_string())
                    .with_context("path", path.display()),
            )
        })
    }

    /// Validates every section before any work starts.
    pub fn validate(&self) -> Result<(), ZdError> {
        self.generator.validate()?;
        self.store.validate()?;
        self.analysis.validate()
    }
}

/// Where and how events are persisted.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Store encoding.
    #[serde(default)]
    pub format: StoreFormat,
    /// Path inside the run directory; `events.<ext>` when unset.
    #[serde(default)]
    pub events_file: Option<PathBuf>,
}

impl StoreConfig {
    /// Checks that `events_file` stays inside the run directory and that
    /// its extension agrees with `format`.
    pub fn validate(&self) -> Result<(), ZdError> {
        let Some(file) = &self.events_file else {
            return Ok(());
        };
        let inside_run = file
            .components()
            .all(|component| matches!(component, Component::Normal(_) | Component::CurDir));
        if !inside_run || file.file_name().is_none() {
            return Err(ZdError::Config(
                ErrorInfo::new(
                    "events-file",
                    "events_file must be a relative path inside the run directory",
                )
                .with_context("events_file", file.display())
                .with_hint("drop leading '/' and '..' components"),
            ));
        }
        let inferred = StoreFormat::from_path(file)?;
        if inferred != self.format {
            return Err(ZdError::Config(
                ErrorInfo::new(
                    "store-format-mismatch",
                    "events_file extension does not match store.format",
                )
                .with_context("events_file", file.display())
                .with_context("format", self.format.extension()),
            ));
        }
        Ok(())
    }

    /// Location of the event file for a run written to `out_dir`.
    pub fn events_path(&self, out_dir: &Path) -> PathBuf {
        match &self.events_file {
            Some(file) => out_dir.join(file),
            None => out_dir.join(format!("events.{}", self.format.extension())),
        }
    }
}

/// One histogram of an event observable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistogramSpec {
    /// Unique name, also the rendered file stem.
    pub name: String,
    /// Display title.
    #[serde(default)]
    pub title: Option<String>,
    /// Event quantity to histogram.
    pub observable: Observable,
    /// Lower edge.
    pub low: f64,
    /// Upper edge (exclusive).
    pub high: f64,
    /// Number of bins.
    pub bins: usize,
}

impl HistogramSpec {
    fn new(
        name: &str,
        title: &str,
        observable: Observable,
        low: f64,
        high: f64,
        bins: usize,
    ) -> Self {
        Self {
            name: name.to_string(),
            title: Some(title.to_string()),
            observable,
            low,
            high,
            bins,
        }
    }

    /// Validated binning of this histogram.
    pub fn binning(&self) -> Result<Binning, ZdError> {
        Binning::new(self.low, self.high, self.bins).map_err(|err| match err {
            ZdError::Config(info) => ZdError::Config(info.with_context("histogram", &self.name)),
            other => other,
        })
    }
}

/// Histogram layout and fit settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Histograms filled from the stored events.
    #[serde(default = "default_histograms")]
    pub histograms: Vec<HistogramSpec>,
    /// Lineshape fit of one histogram.
    #[serde(default)]
    pub fit: FitConfig,
}

fn default_histograms() -> Vec<HistogramSpec> {
    vec![
        HistogramSpec::new("mass", "Z boson mass", Observable::ResonanceMass, 80.0, 100.0, 60),
        HistogramSpec::new(
            "lepton_energy",
            "Electron energy",
            Observable::LeptonEnergy,
            0.0,
            100.0,
            100,
        ),
        HistogramSpec::new(
            "lepton_pt",
            "Electron transverse momentum",
            Observable::LeptonPt,
            0.0,
            50.0,
            100,
        ),
        HistogramSpec::new(
            "resonance_pt",
            "Z boson transverse momentum",
            Observable::ResonancePt,
            0.0,
            50.0,
            100,
        ),
        HistogramSpec::new(
            "dilepton_mass",
            "Reconstructed dilepton mass",
            Observable::DileptonMass,
            80.0,
            100.0,
            60,
        ),
    ]
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            histograms: default_histograms(),
            fit: FitConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Checks binnings, name uniqueness and the fit target.
    pub fn validate(&self) -> Result<(), ZdError> {
        let mut names = BTreeSet::new();
        for spec in &self.histograms {
            spec.binning()?;
            if !names.insert(spec.name.as_str()) {
                return Err(ZdError::Config(
                    ErrorInfo::new("duplicate-histogram", "histogram names must be unique")
                        .with_context("histogram", &spec.name),
                ));
            }
        }
        if self.fit_target().is_none() {
            return Err(ZdError::Config(
                ErrorInfo::new("fit-target", "fit target is not a configured histogram")
                    .with_context("target", &self.fit.target)
                    .with_hint("set analysis.fit.target to one of analysis.histograms"),
            ));
        }
        Ok(())
    }

    /// Specification of the histogram the fit runs on.
    pub fn fit_target(&self) -> Option<&HistogramSpec> {
        self.histograms
            .iter()
            .find(|spec| spec.name == self.fit.target)
    }
}

/// Which histogram is fitted and how.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitConfig {
    /// Name of the fitted histogram.
    #[serde(default = "default_fit_target")]
    pub target: String,
    /// Start from a guess read off the histogram instead of `options.initial`.
    #[serde(default)]
    pub guess_from_histogram: bool,
    /// Minimizer options.
    #[serde(default)]
    pub options: FitOpts,
    /// Points sampled for the rendered fit curve.
    #[serde(default = "default_overlay_samples")]
    pub overlay_samples: usize,
}

fn default_fit_target() -> String {
    "mass".to_string()
}

fn default_overlay_samples() -> usize {
    200
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            target: default_fit_target(),
            guess_from_histogram: false,
            options: FitOpts::default(),
            overlay_samples: default_overlay_samples(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        RunConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "generator:\n  events: 500\nstore:\n  format: binary\nanalysis:\n  fit:\n    target: dilepton_mass\n";
        let config: RunConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.generator.events, 500);
        assert_eq!(config.generator.physics.central_mass, 91.1876);
        assert_eq!(config.store.format, StoreFormat::Binary);
        assert_eq!(config.analysis.histograms.len(), 5);
        assert_eq!(config.analysis.fit_target().unwrap().observable, Observable::DileptonMass);
        assert_eq!(config.analysis.fit.options.initial, vec![1.0e5, 91.2, 2.5]);
        assert_eq!(
            config.store.events_path(Path::new("run")),
            PathBuf::from("run/events.zdb")
        );
    }

    #[test]
    fn unknown_fit_target_is_rejected() {
        let mut config = RunConfig::default();
        config.analysis.fit.target = "missing".into();
        assert_eq!(config.validate().unwrap_err().info().code, "fit-target");
    }

    #[test]
    fn duplicate_histograms_are_rejected() {
        let mut config = RunConfig::default();
        let first = config.analysis.histograms[0].clone();
        config.analysis.histograms.push(first);
        assert_eq!(
            config.validate().unwrap_err().info().code,
            "duplicate-histogram"
        );
    }

    #[test]
    fn nested_events_file_is_accepted() {
        let mut config = RunConfig::default();
        config.store.events_file = Some(PathBuf::from("data/events.csv"));
        config.validate().unwrap();
        assert_eq!(
            config.store.events_path(Path::new("run")),
            PathBuf::from("run/data/events.csv")
        );
    }

    #[test]
    fn events_file_outside_run_directory_is_rejected() {
        for file in ["/tmp/events.csv", "../events.csv", "data/../../events.csv"] {
            let mut config = RunConfig::default();
            config.store.events_file = Some(PathBuf::from(file));
            assert_eq!(config.validate().unwrap_err().info().code, "events-file", "{file}");
        }
    }

    #[test]
    fn events_file_extension_must_match_format() {
        let mut config = RunConfig::default();
        config.store.format = StoreFormat::Binary;
        config.store.events_file = Some(PathBuf::from("events.csv"));
        assert_eq!(
            config.validate().unwrap_err().info().code,
            "store-format-mismatch"
        );

        config.store.events_file = Some(PathBuf::from("events.parquet"));
        assert_eq!(config.validate().unwrap_err().info().code, "store-format");
    }

    #[test]
    fn invalid_binning_names_histogram() {
        let mut config = RunConfig::default();
        config.analysis.histograms[1].bins = 0;
        let err = config.validate().unwrap_err();
        assert_eq!(err.info().code, "binning-count");
        assert_eq!(err.info().context["histogram"], "lepton_energy");
    }
}

use serde::{Deserialize, Serialize};
use zdecay_core::errors::{ErrorInfo, ZdError};

/// YAML-configurable parameters governing a generation job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of events to generate.
    #[serde(default = "default_events")]
    pub events: usize,
    /// Events per independently seeded chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Worker threads used for chunk generation. Does not affect the output.
    #[serde(default = "default_workers")]
    pub workers: usize,
    /// Physics parameters shared by every event.
    #[serde(default)]
    pub physics: PhysicsParams,
    /// Master seed and substream policy.
    #[serde(default)]
    pub seed_policy: SeedPolicy,
}

fn default_events() -> usize {
    100_000
}

fn default_chunk_size() -> usize {
    4096
}

fn default_workers() -> usize {
    1
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            events: default_events(),
            chunk_size: default_chunk_size(),
            workers: default_workers(),
            physics: PhysicsParams::default(),
            seed_policy: SeedPolicy::default(),
        }
    }
}

impl GeneratorConfig {
    /// Checks the run layout and the physics parameters.
    pub fn validate(&self) -> Result<(), ZdError> {
        if self.chunk_size == 0 {
            return Err(ZdError::Config(
                config_error("chunk-size", "chunk_size must be positive")
                    .with_context("chunk_size", self.chunk_size),
            ));
        }
        if self.workers == 0 {
            return Err(ZdError::Config(
                config_error("workers", "workers must be positive")
                    .with_context("workers", self.workers),
            ));
        }
        self.physics.validate()
    }
}

/// Resonance, lepton and detector parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsParams {
    /// Pole mass of the resonance (GeV).
    #[serde(default = "default_central_mass")]
    pub central_mass: f64,
    /// Full width at half maximum of the resonance (GeV).
    #[serde(default = "default_natural_width")]
    pub natural_width: f64,
    /// Rest mass of each decay lepton (GeV).
    #[serde(default = "default_lepton_mass")]
    pub lepton_mass: f64,
    /// Mean of the exponential transverse-momentum spectrum (GeV).
    #[serde(default = "default_pt_mean")]
    pub pt_mean: f64,
    /// Rapidity is drawn uniformly on `[-rapidity_max, rapidity_max)`.
    #[serde(default = "default_rapidity_max")]
    pub rapidity_max: f64,
    /// Relative Gaussian energy resolution applied to each lepton.
    #[serde(default = "default_smearing_fraction")]
    pub smearing_fraction: f64,
}

fn default_central_mass() -> f64 {
    91.1876
}

fn default_natural_width() -> f64 {
    2.4952
}

fn default_lepton_mass() -> f64 {
    0.000511
}

fn default_pt_mean() -> f64 {
    10.0
}

fn default_rapidity_max() -> f64 {
    2.5
}

fn default_smearing_fraction() -> f64 {
    0.02
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            central_mass: default_central_mass(),
            natural_width: default_natural_width(),
            lepton_mass: default_lepton_mass(),
            pt_mean: default_pt_mean(),
            rapidity_max: default_rapidity_max(),
            smearing_fraction: default_smearing_fraction(),
        }
    }
}

impl PhysicsParams {
    /// Returns a copy with smearing disabled.
    pub fn without_smearing(&self) -> Self {
        Self {
            smearing_fraction: 0.0,
            ..self.clone()
        }
    }

    /// Rejects parameter sets that cannot produce a physical decay.
    pub fn validate(&self) -> Result<(), ZdError> {
        let fields = [
            ("central_mass", self.central_mass),
            ("natural_width", self.natural_width),
            ("lepton_mass", self.lepton_mass),
            ("pt_mean", self.pt_mean),
            ("rapidity_max", self.rapidity_max),
            ("smearing_fraction", self.smearing_fraction),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(ZdError::Config(
                    config_error(
                        "physics-parameter",
                        "physics parameters must be finite and non-negative",
                    )
                    .with_context("field", name)
                    .with_context("value", value),
                ));
            }
        }
        if self.central_mass < 2.0 * self.lepton_mass {
            return Err(ZdError::Config(
                config_error(
                    "below-threshold",
                    "central mass is below the two-lepton threshold",
                )
                .with_context("central_mass", self.central_mass)
                .with_context("lepton_mass", self.lepton_mass)
                .with_hint("central_mass must be at least twice lepton_mass"),
            ));
        }
        Ok(())
    }
}

/// Deterministic seeding configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedPolicy {
    /// Master seed used for the run.
    #[serde(default = "default_master_seed")]
    pub master_seed: u64,
    /// Optional label recorded in manifests.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_master_seed() -> u64 {
    0x05EE_D5EE_DD15_5EED_u64
}

impl Default for SeedPolicy {
    fn default() -> Self {
        Self {
            master_seed: default_master_seed(),
            label: None,
        }
    }
}

fn config_error(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message).with_context("stage", "generator-config")
}

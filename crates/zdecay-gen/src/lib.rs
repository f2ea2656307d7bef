#![deny(missing_docs)]

//! Seeded Monte Carlo generator for a resonance decaying into a lepton pair.

/// YAML configuration schema and defaults.
pub mod config;
/// Chunked, optionally parallel generation jobs.
pub mod generator;
/// Single-event decay kinematics.
pub mod kinematics;

pub use config::{GeneratorConfig, PhysicsParams, SeedPolicy};
pub use generator::{generate, EventGenerator, GenerationSummary};
pub use kinematics::{decay_event, rest_frame_pair, sample_resonance, smear, ResonanceState};

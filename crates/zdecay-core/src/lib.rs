#![deny(missing_docs)]
#![doc = "Core types, structured errors and deterministic sampling for the zdecay resonance generator and fit engine."]

pub mod errors;
pub mod event;
pub mod lorentz;
pub mod provenance;
pub mod rng;
pub mod sampling;
pub mod serde;

pub use errors::{ErrorInfo, FitFailure, ZdError};
pub use event::{Event, Observable};
pub use lorentz::{FourMomentum, ThreeVector};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
pub use sampling::Sampler;

//! Histogram accumulation for zdecay observables.
//!
//! [`Binning`] is the single value-to-bin mapping used by fills and by the
//! fit engine. Renderers receive finished histograms plus an optional
//! fitted [`Overlay`].

pub mod binning;
pub mod histogram;
pub mod render;

pub use binning::Binning;
pub use histogram::Histogram;
pub use render::{JsonRenderer, Overlay, Renderer};

//! Generated decay events and the observables derived from them.

use serde::{Deserialize, Serialize};

use crate::lorentz::FourMomentum;

/// One simulated resonance decay into a lepton pair.
///
/// The lepton four-momenta are lab-frame values after energy smearing, so
/// `lepton_a + lepton_b` only reproduces `resonance_mass` exactly when
/// smearing is disabled. A negative-mass tail sample yields a pair with
/// negative energy, and the reconstructed mass keeps that negative sign.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Invariant mass sampled for the parent resonance.
    pub resonance_mass: f64,
    /// Negatively charged lepton.
    pub lepton_a: FourMomentum,
    /// Positively charged lepton.
    pub lepton_b: FourMomentum,
    /// Transverse momentum of the parent resonance.
    pub transverse_momentum: f64,
}

impl Event {
    /// Four-momentum of the lepton pair.
    pub fn pair(&self) -> FourMomentum {
        self.lepton_a + self.lepton_b
    }

    /// Invariant mass reconstructed from the two leptons, negative when the
    /// pair energy is negative.
    pub fn dilepton_mass(&self) -> f64 {
        self.pair().mass()
    }
}

/// Scalar quantities the analyzer can histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Observable {
    /// Sampled resonance mass.
    ResonanceMass,
    /// Energy of `lepton_a`.
    LeptonEnergy,
    /// Transverse momentum of `lepton_a`.
    LeptonPt,
    /// Stored transverse momentum of the resonance.
    ResonancePt,
    /// Invariant mass of the reconstructed lepton pair.
    DileptonMass,
}

impl Observable {
    /// Extracts the observable from an event.
    pub fn value(&self, event: &Event) -> f64 {
        match self {
            Observable::ResonanceMass => event.resonance_mass,
            Observable::LeptonEnergy => event.lepton_a.e,
            Observable::LeptonPt => event.lepton_a.pt(),
            Observable::ResonancePt => event.transverse_momentum,
            Observable::DileptonMass => event.dilepton_mass(),
        }
    }
}

//! Kinematics of a single resonance decay, from the sampled lineshape to the
//! smeared lab-frame lepton pair.

use rand::Rng;
use zdecay_core::errors::{ErrorInfo, ZdError};
use zdecay_core::{Event, FourMomentum, Sampler, ThreeVector};

use crate::config::PhysicsParams;

/// Lab-frame state of the parent resonance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResonanceState {
    /// Sampled invariant mass.
    pub mass: f64,
    /// Lab-frame four-momentum.
    pub momentum: FourMomentum,
    /// Transverse momentum.
    pub pt: f64,
}

/// Samples the resonance mass, transverse momentum, azimuth and rapidity.
pub fn sample_resonance<R: Rng + ?Sized>(params: &PhysicsParams, rng: &mut R) -> ResonanceState {
    let mass = rng.breit_wigner(params.central_mass, params.natural_width);

    let pt = rng.exponential(params.pt_mean);
    let phi = rng.azimuth();
    let px = pt * phi.cos();
    let py = pt * phi.sin();

    let rapidity = rng.uniform(-params.rapidity_max, params.rapidity_max);
    let mt = (mass * mass + pt * pt).sqrt();
    let pz = mt * rapidity.sinh();
    let e = mt * rapidity.cosh();

    ResonanceState {
        mass,
        momentum: FourMomentum::new(e, px, py, pz),
        pt,
    }
}

/// Builds the back-to-back lepton pair in the resonance rest frame with an
/// isotropic decay direction.
///
/// Fails when the sampled mass is below the two-lepton threshold, since the
/// rest-frame momentum would be imaginary.
pub fn rest_frame_pair<R: Rng + ?Sized>(
    mass: f64,
    lepton_mass: f64,
    rng: &mut R,
) -> Result<(FourMomentum, FourMomentum), ZdError> {
    let e_rest = 0.5 * mass;
    let radicand = e_rest * e_rest - lepton_mass * lepton_mass;
    if radicand.is_nan() || radicand < 0.0 {
        return Err(ZdError::Config(
            ErrorInfo::new(
                "negative-radicand",
                "sampled resonance mass is below the two-lepton threshold",
            )
            .with_context("resonance_mass", mass)
            .with_context("lepton_mass", lepton_mass)
            .with_hint("reduce natural_width or lepton_mass"),
        ));
    }
    let p_rest = radicand.sqrt();

    let cos_theta = rng.uniform(-1.0, 1.0);
    let phi = rng.azimuth();
    let direction = ThreeVector::from_spherical(p_rest, cos_theta, phi);

    Ok((
        FourMomentum::from_parts(e_rest, direction),
        FourMomentum::from_parts(e_rest, -direction),
    ))
}

/// Replaces the energy with a Gaussian draw of relative width `fraction`.
///
/// The momentum is left untouched, so the smeared vector is off its mass
/// shell. This is the detector resolution model.
pub fn smear<R: Rng + ?Sized>(p: FourMomentum, fraction: f64, rng: &mut R) -> FourMomentum {
    let e = rng.gaussian(p.e, fraction * p.e);
    p.with_energy(e)
}

/// Generates one complete decay event.
pub fn decay_event<R: Rng + ?Sized>(params: &PhysicsParams, rng: &mut R) -> Result<Event, ZdError> {
    let resonance = sample_resonance(params, rng);
    let (lepton_a, lepton_b) = rest_frame_pair(resonance.mass, params.lepton_mass, rng)?;

    let beta = resonance.momentum.boost_vector();
    let lepton_a = lepton_a.boost(beta)?;
    let lepton_b = lepton_b.boost(beta)?;

    let lepton_a = smear(lepton_a, params.smearing_fraction, rng);
    let lepton_b = smear(lepton_b, params.smearing_fraction, rng);

    Ok(Event {
        resonance_mass: resonance.mass,
        lepton_a,
        lepton_b,
        transverse_momentum: resonance.pt,
    })
}

//! Three-vectors, four-momenta and pure Lorentz boosts.

use std::ops::{Add, Mul, Neg, Sub};

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, ZdError};

/// Cartesian three-vector used for momenta and boost velocities.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ThreeVector {
    /// x component.
    pub x: f64,
    /// y component.
    pub y: f64,
    /// z component.
    pub z: f64,
}

impl ThreeVector {
    /// Creates a vector from its components.
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Builds a vector of magnitude `r` along polar angle cosine `cos_theta`
    /// and azimuth `phi`.
    pub fn from_spherical(r: f64, cos_theta: f64, phi: f64) -> Self {
        let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
        Self::new(
            r * sin_theta * phi.cos(),
            r * sin_theta * phi.sin(),
            r * cos_theta,
        )
    }

    /// Dot product.
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Squared magnitude.
    pub fn mag2(&self) -> f64 {
        self.dot(self)
    }

    /// Magnitude.
    pub fn mag(&self) -> f64 {
        self.mag2().sqrt()
    }

    /// Magnitude of the transverse (x, y) projection.
    pub fn perp(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

impl Add for ThreeVector {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for ThreeVector {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Neg for ThreeVector {
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

impl Mul<f64> for ThreeVector {
    type Output = Self;

    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Lorentz vector `(E, px, py, pz)`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FourMomentum {
    /// Energy.
    pub e: f64,
    /// x momentum.
    pub px: f64,
    /// y momentum.
    pub py: f64,
    /// z momentum.
    pub pz: f64,
}

impl FourMomentum {
    /// Creates a four-momentum from energy and momentum components.
    pub const fn new(e: f64, px: f64, py: f64, pz: f64) -> Self {
        Self { e, px, py, pz }
    }

    /// Combines an energy with a three-momentum.
    pub fn from_parts(e: f64, p: ThreeVector) -> Self {
        Self::new(e, p.x, p.y, p.z)
    }

    /// Momentum part.
    pub fn momentum(&self) -> ThreeVector {
        ThreeVector::new(self.px, self.py, self.pz)
    }

    /// Invariant `E² − |p|²`.
    pub fn mass2(&self) -> f64 {
        self.e * self.e - self.momentum().mag2()
    }

    /// Invariant mass. Space-like vectors report `-sqrt(-m²)`.
    ///
    /// A time-like vector with negative energy reports `-sqrt(m²)`, so the
    /// pair built from a negative-mass resonance keeps its sign.
    pub fn mass(&self) -> f64 {
        let m2 = self.mass2();
        if m2 < 0.0 || self.e < 0.0 {
            -m2.abs().sqrt()
        } else {
            m2.sqrt()
        }
    }

    /// Transverse momentum.
    pub fn pt(&self) -> f64 {
        self.momentum().perp()
    }

    /// Velocity `p/E` of the frame in which this vector is at rest.
    pub fn boost_vector(&self) -> ThreeVector {
        self.momentum() * (1.0 / self.e)
    }

    /// Returns a copy with the energy replaced and the momentum untouched.
    pub fn with_energy(&self, e: f64) -> Self {
        Self { e, ..*self }
    }

    /// Applies the pure boost with velocity `beta` (in units of c).
    ///
    /// Fails when `|beta| >= 1` or any component is not finite.
    pub fn boost(&self, beta: ThreeVector) -> Result<Self, ZdError> {
        let b2 = beta.mag2();
        if b2.is_nan() || b2 >= 1.0 {
            return Err(ZdError::Config(
                ErrorInfo::new("superluminal-boost", "boost velocity must satisfy |beta| < 1")
                    .with_context("beta2", b2),
            ));
        }
        let gamma = 1.0 / (1.0 - b2).sqrt();
        let p = self.momentum();
        let bp = beta.dot(&p);
        let gamma2 = if b2 > 0.0 { (gamma - 1.0) / b2 } else { 0.0 };
        let boosted = p + beta * (gamma2 * bp + gamma * self.e);
        Ok(Self::from_parts(gamma * (self.e + bp), boosted))
    }
}

impl Add for FourMomentum {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(
            self.e + rhs.e,
            self.px + rhs.px,
            self.py + rhs.py,
            self.pz + rhs.pz,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_boost_is_identity() {
        let p = FourMomentum::new(45.0, 1.0, -2.0, 3.0);
        assert_eq!(p.boost(ThreeVector::default()).unwrap(), p);
    }

    #[test]
    fn boosting_rest_frame_gives_velocity() {
        let m = 91.1876;
        let at_rest = FourMomentum::new(m, 0.0, 0.0, 0.0);
        let beta = ThreeVector::new(0.3, -0.2, 0.5);
        let moving = at_rest.boost(beta).unwrap();
        let back = moving.boost_vector();
        assert!((back - beta).mag() < 1e-12);
        assert!((moving.mass() - m).abs() < 1e-9 * m);
    }

    #[test]
    fn rejects_superluminal_velocity() {
        let p = FourMomentum::new(1.0, 0.0, 0.0, 0.5);
        let err = p.boost(ThreeVector::new(0.0, 0.0, 1.0)).unwrap_err();
        assert_eq!(err.info().code, "superluminal-boost");
    }

    #[test]
    fn space_like_mass_is_negative() {
        let p = FourMomentum::new(1.0, 2.0, 0.0, 0.0);
        assert!(p.mass() < 0.0);
    }

    #[test]
    fn negative_energy_mass_keeps_sign_through_boost() {
        let at_rest = FourMomentum::new(-90.0, 0.0, 0.0, 0.0);
        let moving = at_rest.boost(ThreeVector::new(0.3, 0.0, 0.4)).unwrap();
        assert!(moving.e < 0.0);
        assert!((moving.mass() + 90.0).abs() < 1e-9 * 90.0);
    }
}

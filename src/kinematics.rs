// Relativistic kinematics primitives for decay sampling.

use nalgebra::{Matrix3, Vector3};
use rand::Rng;
use rand_distr::{Distribution, UnitSphere};
use serde::{Deserialize, Serialize};

/// Momentum 4-vector: total energy plus 3-momentum, E^2 = p^2 + m^2.
/// Units are whatever the caller carries (MeV in the rest-frame samplers,
/// GeV in the lab).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FourMomentum {
    pub e: f64,
    pub p: Vector3<f64>,
}

impl FourMomentum {
    pub fn new(e: f64, px: f64, py: f64, pz: f64) -> Self {
        Self {
            e,
            p: Vector3::new(px, py, pz),
        }
    }

    /// Build from 3-momentum and rest mass via the mass shell.
    pub fn from_momentum_and_mass(p: Vector3<f64>, mass: f64) -> Self {
        Self {
            e: (p.dot(&p) + mass * mass).sqrt(),
            p,
        }
    }

    /// Invariant mass squared E^2 - p^2. Slightly negative values from
    /// roundoff are possible for massless particles.
    pub fn mass_squared(&self) -> f64 {
        self.e * self.e - self.p.dot(&self.p)
    }

    pub fn momentum_magnitude(&self) -> f64 {
        self.p.norm()
    }

    /// Velocity beta = |p| / E.
    pub fn beta(&self) -> f64 {
        self.p.norm() / self.e
    }
}

impl std::ops::Add for FourMomentum {
    type Output = FourMomentum;

    fn add(self, rhs: FourMomentum) -> FourMomentum {
        FourMomentum {
            e: self.e + rhs.e,
            p: self.p + rhs.p,
        }
    }
}

/// Sample an isotropic unit vector.
pub fn sample_isotropic_direction<R: Rng + ?Sized>(rng: &mut R) -> Vector3<f64> {
    let v: [f64; 3] = UnitSphere.sample(rng);
    Vector3::new(v[0], v[1], v[2])
}

/// Euler rotation Rz(alpha) * Ry(beta) * Rz(gamma) given cos(beta).
/// With alpha, gamma uniform on [0, 2 pi) and cos(beta) uniform on
/// [-1, 1] this carries a z-aligned rest-frame configuration to an
/// isotropic orientation.
pub fn euler_rotation(alpha: f64, cos_beta: f64, gamma: f64) -> Matrix3<f64> {
    let (sa, ca) = alpha.sin_cos();
    let sb = (1.0 - cos_beta * cos_beta).max(0.0).sqrt();
    let cb = cos_beta;
    let (sg, cg) = gamma.sin_cos();

    let ra = Matrix3::new(ca, -sa, 0.0, sa, ca, 0.0, 0.0, 0.0, 1.0);
    let rb = Matrix3::new(cb, 0.0, -sb, 0.0, 1.0, 0.0, sb, 0.0, cb);
    let rc = Matrix3::new(cg, -sg, 0.0, sg, cg, 0.0, 0.0, 0.0, 1.0);

    ra * rb * rc
}

/// Lorentz boost along +z with the given gamma and beta:
/// E' = gamma (E + beta pz), pz' = gamma (pz + beta E).
pub fn boost_z(p4: &FourMomentum, gamma: f64, beta: f64) -> FourMomentum {
    let e = gamma * (p4.e + beta * p4.p.z);
    let pz = gamma * (p4.p.z + beta * p4.e);
    FourMomentum::new(e, p4.p.x, p4.p.y, pz)
}

/// Rotate into a frame whose z axis is the parent direction, boost along
/// z, rotate back. `r` carries lab coordinates to the boost frame and
/// `r_inv` is its inverse.
pub fn rotate_and_boost(
    p4: &FourMomentum,
    r: &Matrix3<f64>,
    r_inv: &Matrix3<f64>,
    gamma: f64,
    beta: f64,
) -> FourMomentum {
    let rotated = FourMomentum {
        e: p4.e,
        p: r * p4.p,
    };
    let boosted = boost_z(&rotated, gamma, beta);
    FourMomentum {
        e: boosted.e,
        p: r_inv * boosted.p,
    }
}

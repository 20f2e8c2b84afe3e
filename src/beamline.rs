// Storage-ring beamline parameters and beam-optics sampling.
//
// First-order optics: inside the production straight s = z, transverse
// phase space is parabolic in (x, y, x', y') for representative
// emittance/beta with alpha = 0, and the momentum spread is parabolic
// within the ring acceptance.

use crate::error::{BeamError, Result};
use nalgebra::Matrix3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Ring and production-straight parameters consumed by the samplers.
/// Lengths in metres, emittance in pi mm rad, beta in mm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Beamline {
    pub circumference: f64,
    pub straight_length: f64,
    /// Fractional full-width momentum acceptance (0.16 = +-8%).
    pub momentum_acceptance: f64,
    pub epsilon: f64,
    pub beta: f64,
}

impl Default for Beamline {
    fn default() -> Self {
        Self {
            circumference: 616.0,
            straight_length: 180.0,
            momentum_acceptance: 0.16,
            epsilon: 0.021,
            beta: 742.0,
        }
    }
}

/// Beam position and frame rotation at path length `s` around the ring.
/// `r` carries lab coordinates into the frame whose z axis follows the
/// beam; `r_inv` is its inverse.
#[derive(Debug, Clone)]
pub struct BeamDirection {
    pub r: Matrix3<f64>,
    pub r_inv: Matrix3<f64>,
    pub position: [f64; 3],
    /// Bend angle with respect to the production-straight axis (rad).
    pub theta: f64,
}

impl Beamline {
    /// Load parameters from a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| BeamError::StorageIo {
            run: -1,
            event: -1,
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| BeamError::MalformedRecord(e.to_string()))
    }

    /// Arc length of each of the two 180-degree bends.
    pub fn arc_length(&self) -> f64 {
        (self.circumference - 2.0 * self.straight_length) / 2.0
    }

    pub fn arc_radius(&self) -> f64 {
        self.arc_length() / std::f64::consts::PI
    }

    /// Momentum centred on `p0` with a parabolic spread across the
    /// acceptance.
    pub fn generate_momentum<R: Rng + ?Sized>(&self, p0: f64, rng: &mut R) -> f64 {
        let dp = p0 * self.momentum_acceptance / 2.0;
        p0 + sample_parabolic(dp, rng)
    }

    /// Transverse phase space (x, y, x', y') at path length `s`;
    /// positions in metres, divergences dimensionless.
    pub fn generate_transverse<R: Rng + ?Sized>(&self, _s: f64, rng: &mut R) -> (f64, f64, f64, f64) {
        let r_amp = (self.epsilon * self.beta).sqrt() / 1000.0;
        let rp_amp = (self.epsilon / self.beta).sqrt();
        let x = sample_parabolic(r_amp, rng);
        let y = sample_parabolic(r_amp, rng);
        let xp = sample_parabolic(rp_amp, rng);
        let yp = sample_parabolic(rp_amp, rng);
        (x, y, xp, yp)
    }

    /// Beam position and rotation at path length `s`, covering the four
    /// ring sections: production straight, first arc, return straight,
    /// return arc. `s` wraps at the circumference.
    pub fn beam_dir(&self, s: f64) -> BeamDirection {
        let straight = self.straight_length;
        let arc = self.arc_length();
        let r = self.arc_radius();
        let along = s.rem_euclid(self.circumference);

        if along <= straight {
            BeamDirection {
                r: Matrix3::identity(),
                r_inv: Matrix3::identity(),
                position: [0.0, 0.0, along],
                theta: 0.0,
            }
        } else if along <= straight + arc {
            let covered = along - straight;
            let theta = std::f64::consts::PI * covered / arc;
            let (rot, rot_inv) = bend_rotation(theta);
            BeamDirection {
                r: rot,
                r_inv: rot_inv,
                position: [
                    r - r * theta.cos(),
                    0.0,
                    straight + r * theta.sin(),
                ],
                theta,
            }
        } else if along <= 2.0 * straight + arc {
            let theta = std::f64::consts::PI;
            let (rot, rot_inv) = bend_rotation(theta);
            BeamDirection {
                r: rot,
                r_inv: rot_inv,
                position: [2.0 * r, 0.0, straight - (along - arc - straight)],
                theta,
            }
        } else {
            let covered = along - 2.0 * straight - arc;
            let theta = std::f64::consts::PI + std::f64::consts::PI * covered / arc;
            let (rot, rot_inv) = bend_rotation(theta);
            BeamDirection {
                r: rot,
                r_inv: rot_inv,
                position: [r - r * theta.cos(), 0.0, r * theta.sin()],
                theta,
            }
        }
    }
}

// Rotation about y through -theta (the ring bends with X -> -X, so the
// frame angle is the negative of the bend angle).
fn bend_rotation(theta: f64) -> (Matrix3<f64>, Matrix3<f64>) {
    let t = -theta;
    let (st, ct) = t.sin_cos();
    let rot = Matrix3::new(ct, 0.0, st, 0.0, 1.0, 0.0, -st, 0.0, ct);
    let rot_inv = Matrix3::new(ct, 0.0, -st, 0.0, 1.0, 0.0, st, 0.0, ct);
    (rot, rot_inv)
}

/// Sample from the parabolic density p(x) ~ (p1^2 - x^2) on [-p1, p1]
/// by inverting the cubic CDF analytically (trigonometric root of
/// x^3 - 3 p1^2 x + 2 p1^3 (2u - 1) = 0 lying inside the interval).
pub fn sample_parabolic<R: Rng + ?Sized>(p1: f64, rng: &mut R) -> f64 {
    if p1 == 0.0 {
        return 0.0;
    }
    let u: f64 = rng.gen();
    let psi = (1.0 - 2.0 * u).clamp(-1.0, 1.0).acos() / 3.0;
    2.0 * p1 * (psi - 2.0 * std::f64::consts::FRAC_PI_3).cos()
}

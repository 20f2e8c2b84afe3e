// Two-body pion decay, pi -> mu + nu_mu, sampled in the pion rest frame.

use crate::constants::{pion_decay_cm_momentum_mev, MUON_MASS_MEV, PION_LIFETIME};
use crate::kinematics::{sample_isotropic_direction, FourMomentum};
use rand::Rng;

/// One sampled pion decay in the rest frame. Momenta in MeV; the decay is
/// unweighted (the two-body momentum magnitude is fixed, the direction
/// isotropic).
#[derive(Debug, Clone)]
pub struct PionDecay {
    /// Proper time to decay (s), drawn from a truncated exponential.
    pub lifetime: f64,
    /// Muon 4-momentum in the pion rest frame (MeV).
    pub v_mu: FourMomentum,
    /// Muon-neutrino 4-momentum in the pion rest frame (MeV).
    pub v_numu: FourMomentum,
    /// Cosine of the muon polar angle in the rest frame.
    pub cos_theta: f64,
    /// Muon azimuth in the rest frame (rad).
    pub phi: f64,
}

impl PionDecay {
    /// Sample a decay with the proper time cut off at `t_max` seconds
    /// (`f64::INFINITY` for no truncation).
    pub fn generate<R: Rng + ?Sized>(t_max: f64, rng: &mut R) -> Self {
        let lifetime = sample_decay_time(PION_LIFETIME, t_max, rng);

        let p_star = pion_decay_cm_momentum_mev();
        let dir = sample_isotropic_direction(rng);

        let p_mu = p_star * dir;
        let e_mu = (MUON_MASS_MEV * MUON_MASS_MEV + p_star * p_star).sqrt();
        let v_mu = FourMomentum { e: e_mu, p: p_mu };
        // Neutrino back to back, massless.
        let v_numu = FourMomentum {
            e: p_star,
            p: -p_mu,
        };

        let cos_theta = dir.z;
        let phi = dir.y.atan2(dir.x);

        Self {
            lifetime,
            v_mu,
            v_numu,
            cos_theta,
            phi,
        }
    }
}

/// Exponential proper decay time with mean `tau`, truncated at `t_max`:
/// t = -tau ln(1 - u (1 - exp(-t_max / tau))).
pub fn sample_decay_time<R: Rng + ?Sized>(tau: f64, t_max: f64, rng: &mut R) -> f64 {
    let g_max = 1.0 - (-t_max / tau).exp();
    let u = rng.gen::<f64>() * g_max;
    -(1.0 - u).ln() * tau
}

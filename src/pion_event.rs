// Assembles one pion decay along the production straight: samples the
// pion momentum and decay point, decays it in the rest frame, and boosts
// the muon and flash neutrino into the lab.

use crate::beamline::Beamline;
use crate::constants::{PION_MASS_GEV, SPEED_OF_LIGHT};
use crate::error::{BeamError, Result};
use crate::kinematics::{rotate_and_boost, FourMomentum};
use crate::pion_decay::PionDecay;
use crate::species::Species;
use crate::trace_space::TraceSpace;
use nalgebra::Matrix3;
use rand::Rng;

/// One full pion-decay event: decay vertex in trace space plus lab-frame
/// muon and flash-neutrino 4-momenta (GeV). Accessors return owned
/// copies; nothing aliases sampler internals.
#[derive(Debug, Clone)]
pub struct PionEventInstance {
    p_pi_nominal: f64,
    p_pi_gen: f64,
    trace: TraceSpace,
    p_mu: FourMomentum,
    p_numu: FourMomentum,
    cos_theta: f64,
    phi: f64,
    lifetime: f64,
}

impl PionEventInstance {
    /// Generate a pion decay inside the production straight for a beam
    /// of nominal momentum `p_pi` (GeV).
    pub fn generate<R: Rng + ?Sized>(
        p_pi: f64,
        beamline: &Beamline,
        rng: &mut R,
    ) -> Result<Self> {
        if !p_pi.is_finite() || p_pi <= 0.0 {
            return Err(BeamError::InvalidKinematics {
                species: Species::PiPlus,
                energy: (p_pi * p_pi + PION_MASS_GEV * PION_MASS_GEV).sqrt(),
                mass: PION_MASS_GEV,
            });
        }

        let straight = beamline.straight_length;
        loop {
            let p = beamline.generate_momentum(p_pi, rng);
            let e = (p * p + PION_MASS_GEV * PION_MASS_GEV).sqrt();
            let beta = p / e;
            let gamma = e / PION_MASS_GEV;
            let v = beta * SPEED_OF_LIGHT;

            // Truncate the proper time so the decay cannot overshoot the
            // straight.
            let t_max = straight / (gamma * v);
            let dcy = PionDecay::generate(t_max, rng);

            // s = beta gamma c t = p c t / m.
            let s = p * SPEED_OF_LIGHT * dcy.lifetime / PION_MASS_GEV;
            if s > straight {
                continue;
            }

            let (x, y, xp, yp) = beamline.generate_transverse(s, rng);
            // First-order optics: z = s inside the straight.
            let trace = TraceSpace::new(s, x, y, s, xp, yp);

            // Boost along the straight (beam axis is z here).
            let id = Matrix3::identity();
            let p_mu = rotate_and_boost(&scale_to_gev(&dcy.v_mu), &id, &id, gamma, beta);
            let p_numu = rotate_and_boost(&scale_to_gev(&dcy.v_numu), &id, &id, gamma, beta);

            return Ok(Self {
                p_pi_nominal: p_pi,
                p_pi_gen: p,
                trace,
                p_mu,
                p_numu,
                cos_theta: dcy.cos_theta,
                phi: dcy.phi,
                lifetime: dcy.lifetime,
            });
        }
    }

    pub fn p_pi(&self) -> f64 {
        self.p_pi_nominal
    }

    /// Generated pion momentum after the acceptance spread (GeV).
    pub fn p_pi_gen(&self) -> f64 {
        self.p_pi_gen
    }

    pub fn trace_space(&self) -> TraceSpace {
        self.trace
    }

    /// Lab-frame muon 4-momentum (GeV).
    pub fn mu4mmtm(&self) -> FourMomentum {
        self.p_mu
    }

    /// Lab-frame flash-neutrino 4-momentum (GeV).
    pub fn numu4mmtm(&self) -> FourMomentum {
        self.p_numu
    }

    pub fn cos_theta(&self) -> f64 {
        self.cos_theta
    }

    pub fn phi(&self) -> f64 {
        self.phi
    }

    /// Proper decay time (s).
    pub fn lifetime(&self) -> f64 {
        self.lifetime
    }
}

fn scale_to_gev(p4: &FourMomentum) -> FourMomentum {
    FourMomentum {
        e: p4.e / 1000.0,
        p: p4.p / 1000.0,
    }
}

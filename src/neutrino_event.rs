// Assembles one muon decay on the ring: samples the muon momentum and
// decay point (the muon may circulate through the arcs and return
// straight), decays it in the rest frame, and rotate-boosts the electron
// and both neutrinos into the lab.

use crate::beamline::Beamline;
use crate::constants::{MUON_MASS_GEV, SPEED_OF_LIGHT};
use crate::error::{BeamError, Result};
use crate::kinematics::{rotate_and_boost, FourMomentum};
use crate::muon_decay::MuonDecay;
use crate::species::Species;
use crate::trace_space::TraceSpace;
use rand::Rng;

/// One full muon-decay event: decay vertex in trace space plus lab-frame
/// electron, nu_e and nu_mu 4-momenta (GeV) and the shared event weight.
#[derive(Debug, Clone)]
pub struct NeutrinoEventInstance {
    p_mu_nominal: f64,
    p_mu_gen: f64,
    trace: TraceSpace,
    p_e: FourMomentum,
    p_nue: FourMomentum,
    p_numu: FourMomentum,
    weight: f64,
    lifetime: f64,
    /// Zero-weight draws discarded while sampling this event.
    zero_weight_draws: u64,
}

impl NeutrinoEventInstance {
    /// Generate a muon decay reachable from the production straight for
    /// a beam of nominal momentum `p_mu` (GeV). `forward_bias` is the
    /// orientation importance-sampling tilt passed to the decay sampler.
    pub fn generate<R: Rng + ?Sized>(
        p_mu: f64,
        beamline: &Beamline,
        forward_bias: f64,
        rng: &mut R,
    ) -> Result<Self> {
        if !p_mu.is_finite() || p_mu <= 0.0 {
            return Err(BeamError::InvalidKinematics {
                species: Species::MuPlus,
                energy: (p_mu * p_mu + MUON_MASS_GEV * MUON_MASS_GEV).sqrt(),
                mass: MUON_MASS_GEV,
            });
        }

        // Accept decays up to just beyond the first arc mid-height; the
        // far detector only sees the straight and the entrance of the
        // bend.
        let z_limit = beamline.straight_length + beamline.arc_radius() + 1.0;
        let mut zero_weight_draws = 0u64;

        loop {
            let p = beamline.generate_momentum(p_mu, rng);
            let e = (p * p + MUON_MASS_GEV * MUON_MASS_GEV).sqrt();
            let beta = p / e;
            let gamma = e / MUON_MASS_GEV;
            let v = beta * SPEED_OF_LIGHT;

            // The muon circulates; allow up to ten turns of proper time.
            let t_max = 10.0 * beamline.circumference / (gamma * v);
            let dcy = MuonDecay::generate(t_max, forward_bias, rng);
            if dcy.weight == 0.0 {
                zero_weight_draws += 1;
                continue;
            }

            let s = v * gamma * dcy.lifetime;
            let dir = beamline.beam_dir(s);
            let theta = dir.theta;

            let (xt, yt, xp, yp) = beamline.generate_transverse(s, rng);
            let x = xt * theta.cos() + dir.position[0];
            let y = yt + dir.position[1];
            let z = -xt * theta.sin() + dir.position[2];
            if z > z_limit {
                continue;
            }
            let trace = TraceSpace::new(s, x, y, z, xp, yp);

            let p_e = rotate_and_boost(&scale_to_gev(&dcy.v_e), &dir.r, &dir.r_inv, gamma, beta);
            let p_nue =
                rotate_and_boost(&scale_to_gev(&dcy.v_nue), &dir.r, &dir.r_inv, gamma, beta);
            let p_numu =
                rotate_and_boost(&scale_to_gev(&dcy.v_numu), &dir.r, &dir.r_inv, gamma, beta);

            return Ok(Self {
                p_mu_nominal: p_mu,
                p_mu_gen: p,
                trace,
                p_e,
                p_nue,
                p_numu,
                weight: dcy.weight,
                lifetime: dcy.lifetime,
                zero_weight_draws,
            });
        }
    }

    pub fn p_mu(&self) -> f64 {
        self.p_mu_nominal
    }

    /// Generated muon momentum after the acceptance spread (GeV).
    pub fn p_mu_gen(&self) -> f64 {
        self.p_mu_gen
    }

    pub fn trace_space(&self) -> TraceSpace {
        self.trace
    }

    /// Lab-frame electron 4-momentum (GeV).
    pub fn e4mmtm(&self) -> FourMomentum {
        self.p_e
    }

    /// Lab-frame electron-neutrino 4-momentum (GeV).
    pub fn nue4mmtm(&self) -> FourMomentum {
        self.p_nue
    }

    /// Lab-frame muon-neutrino 4-momentum (GeV).
    pub fn numu4mmtm(&self) -> FourMomentum {
        self.p_numu
    }

    /// Shared event weight; every record derived from this decay carries
    /// it unmodified.
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// Proper decay time (s).
    pub fn lifetime(&self) -> f64 {
        self.lifetime
    }

    pub fn zero_weight_draws(&self) -> u64 {
        self.zero_weight_draws
    }
}

fn scale_to_gev(p4: &FourMomentum) -> FourMomentum {
    FourMomentum {
        e: p4.e / 1000.0,
        p: p4.p / 1000.0,
    }
}

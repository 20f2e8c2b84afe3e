// Detector plane downstream of the production straight and the
// straight-line projection of neutrino trajectories onto it.

use crate::error::{BeamError, Result};
use crate::kinematics::FourMomentum;
use crate::neutrino_event::NeutrinoEventInstance;
use crate::pion_event::PionEventInstance;
use crate::trace_space::TraceSpace;

/// Trajectories with |pz| at or below this are parallel to the plane.
const PZ_EPSILON: f64 = 1e-12;

/// A transverse detector plane at fixed lab z; stateless beyond its
/// position.
#[derive(Debug, Clone, Copy)]
pub struct Plane {
    pub z_pos: f64,
}

/// Straight-line intersection of one neutrino with a plane. Momentum and
/// energy are carried through unchanged from the input; the weight is the
/// event weight propagated to the hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaneHit {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Transverse radius sqrt(x^2 + y^2).
    pub r: f64,
    /// Azimuth atan2(y, x).
    pub phi: f64,
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    pub energy: f64,
    pub weight: f64,
}

impl Plane {
    pub fn new(z_pos: f64) -> Self {
        Self { z_pos }
    }

    /// Project a straight-line trajectory from the decay vertex onto the
    /// plane. Fails with DegenerateTrajectory instead of dividing by a
    /// vanishing pz.
    pub fn project(&self, vertex: &TraceSpace, p4: &FourMomentum, weight: f64) -> Result<PlaneHit> {
        if p4.p.z.abs() <= PZ_EPSILON {
            return Err(BeamError::DegenerateTrajectory { pz: p4.p.z });
        }
        let delta_z = self.z_pos - vertex.z;
        let x = vertex.x + p4.p.x * delta_z / p4.p.z;
        let y = vertex.y + p4.p.y * delta_z / p4.p.z;
        Ok(PlaneHit {
            x,
            y,
            z: self.z_pos,
            r: (x * x + y * y).sqrt(),
            phi: y.atan2(x),
            px: p4.p.x,
            py: p4.p.y,
            pz: p4.p.z,
            energy: p4.e,
            weight,
        })
    }

    /// Hits for both neutrinos of a muon-decay event: (nu_e, nu_mu).
    pub fn find_hit_mu_event(&self, evt: &NeutrinoEventInstance) -> Result<(PlaneHit, PlaneHit)> {
        let vertex = evt.trace_space();
        let hit_e = self.project(&vertex, &evt.nue4mmtm(), evt.weight())?;
        let hit_mu = self.project(&vertex, &evt.numu4mmtm(), evt.weight())?;
        Ok((hit_e, hit_mu))
    }

    /// Hit for the single flash neutrino of a pion-decay event.
    pub fn find_hit_pi_flash(&self, evt: &PionEventInstance) -> Result<PlaneHit> {
        self.project(&evt.trace_space(), &evt.numu4mmtm(), 1.0)
    }
}

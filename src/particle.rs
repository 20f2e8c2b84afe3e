use crate::kinematics::FourMomentum;
use crate::species::Species;
use crate::trace_space::TraceSpace;
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Immutable snapshot of a particle's state at one beamline location.
///
/// Equality is field-wise across every attribute; the storage round-trip
/// contract relies on it. A new record is produced for each derived
/// state, nothing is mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    pub run_number: i32,
    pub event_number: i32,
    pub trace: TraceSpace,
    /// Lab momentum components (GeV).
    pub px: f64,
    pub py: f64,
    pub pz: f64,
    /// Time (ns).
    pub t: f64,
    /// Per-event statistical weight.
    pub weight: f64,
    pub species: Species,
}

impl ParticleRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        run_number: i32,
        event_number: i32,
        s: f64,
        x: f64,
        y: f64,
        z: f64,
        px: f64,
        py: f64,
        pz: f64,
        t: f64,
        weight: f64,
        species: Species,
    ) -> Self {
        let (xp, yp) = if pz != 0.0 {
            (px / pz, py / pz)
        } else {
            (0.0, 0.0)
        };
        Self {
            run_number,
            event_number,
            trace: TraceSpace::new(s, x, y, z, xp, yp),
            px,
            py,
            pz,
            t,
            weight,
            species,
        }
    }

    /// Placeholder record for locations an event never reaches.
    pub fn placeholder(run_number: i32, event_number: i32) -> Self {
        // pz = 0.01 keeps the divergences finite, as in persisted rows
        // for lost decays.
        Self::new(
            run_number,
            event_number,
            0.0,
            0.0,
            0.0,
            0.0,
            0.0,
            0.0,
            0.01,
            0.0,
            0.0,
            Species::None,
        )
    }

    pub fn mass(&self) -> f64 {
        self.species.mass_gev()
    }

    /// Total energy from the mass shell (GeV).
    pub fn energy(&self) -> f64 {
        let m = self.mass();
        (self.px * self.px + self.py * self.py + self.pz * self.pz + m * m).sqrt()
    }

    pub fn momentum(&self) -> Vector3<f64> {
        Vector3::new(self.px, self.py, self.pz)
    }

    pub fn four_momentum(&self) -> FourMomentum {
        FourMomentum::from_momentum_and_mass(self.momentum(), self.mass())
    }
}

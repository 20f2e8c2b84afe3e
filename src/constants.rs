// src/constants.rs
// Physical constants for the beamline decay chain. Values follow the PDG
// (P.A. Zyla et al., Prog. Theor. Exp. Phys. 2020, 083C01).

use crate::species::Species;
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Speed of light (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Muon mass (MeV).
pub const MUON_MASS_MEV: f64 = 105.658_374_5;

/// Charged-pion mass (MeV).
pub const PION_MASS_MEV: f64 = 139.570_61;

/// Muon mean lifetime (s).
pub const MUON_LIFETIME: f64 = 2.196_981_1e-6;

/// Charged-pion mean lifetime (s).
pub const PION_LIFETIME: f64 = 2.603_3e-8;

/// Muon mass (GeV); lab-frame momenta are carried in GeV throughout.
pub const MUON_MASS_GEV: f64 = MUON_MASS_MEV / 1000.0;

/// Charged-pion mass (GeV).
pub const PION_MASS_GEV: f64 = PION_MASS_MEV / 1000.0;

/// Electron mass (GeV). The decay kinematics treat the electron as
/// massless (m_e << m_mu/2) but the persisted records carry the true mass.
pub const ELECTRON_MASS_GEV: f64 = 0.000_510_998_95;

/// Two-body CM momentum for pi -> mu nu (MeV): (m_pi^2 - m_mu^2) / 2 m_pi.
pub fn pion_decay_cm_momentum_mev() -> f64 {
    (PION_MASS_MEV * PION_MASS_MEV - MUON_MASS_MEV * MUON_MASS_MEV) / (2.0 * PION_MASS_MEV)
}

/// Rest mass (GeV) by species.
pub static SPECIES_MASS_GEV: Lazy<HashMap<Species, f64>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert(Species::PiPlus, PION_MASS_GEV);
    m.insert(Species::PiMinus, PION_MASS_GEV);
    m.insert(Species::MuPlus, MUON_MASS_GEV);
    m.insert(Species::MuMinus, MUON_MASS_GEV);
    m.insert(Species::EPlus, ELECTRON_MASS_GEV);
    m.insert(Species::EMinus, ELECTRON_MASS_GEV);
    m.insert(Species::NuE, 0.0);
    m.insert(Species::NuEBar, 0.0);
    m.insert(Species::NuMu, 0.0);
    m.insert(Species::NuMuBar, 0.0);
    m.insert(Species::None, 0.0);
    m
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_body_cm_momentum() {
        // The canonical pi -> mu nu CM momentum is 29.79 MeV.
        let p_star = pion_decay_cm_momentum_mev();
        assert!((p_star - 29.79).abs() < 0.01, "p* = {}", p_star);
    }

    #[test]
    fn test_species_mass_table_complete() {
        for s in Species::ALL {
            assert!(SPECIES_MASS_GEV.contains_key(&s), "missing mass for {:?}", s);
        }
    }

    #[test]
    fn test_mass_ordering() {
        assert!(PION_MASS_GEV > MUON_MASS_GEV);
        assert!(MUON_MASS_GEV > ELECTRON_MASS_GEV);
    }
}

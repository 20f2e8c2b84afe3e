use serde::{Deserialize, Serialize};

/// Particle species appearing in the pion/muon decay chain.
///
/// `None` is the placeholder written for locations that are never reached
/// in an event (lost decays, soft-mode ledger defaults).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Species {
    PiPlus,
    PiMinus,
    MuPlus,
    MuMinus,
    EPlus,
    EMinus,
    NuE,
    NuEBar,
    NuMu,
    NuMuBar,
    None,
}

impl Species {
    pub const ALL: [Species; 11] = [
        Species::PiPlus,
        Species::PiMinus,
        Species::MuPlus,
        Species::MuMinus,
        Species::EPlus,
        Species::EMinus,
        Species::NuE,
        Species::NuEBar,
        Species::NuMu,
        Species::NuMuBar,
        Species::None,
    ];

    /// Signed PDG Monte Carlo code. Zero for the placeholder species.
    pub fn pdg_code(&self) -> i32 {
        match self {
            Species::PiPlus => 211,
            Species::PiMinus => -211,
            Species::MuPlus => -13,
            Species::MuMinus => 13,
            Species::EPlus => -11,
            Species::EMinus => 11,
            Species::NuE => 12,
            Species::NuEBar => -12,
            Species::NuMu => 14,
            Species::NuMuBar => -14,
            Species::None => 0,
        }
    }

    pub fn from_pdg_code(code: i32) -> Option<Species> {
        Species::ALL.iter().copied().find(|s| s.pdg_code() == code)
    }

    /// Rest mass (GeV).
    pub fn mass_gev(&self) -> f64 {
        crate::constants::SPECIES_MASS_GEV[self]
    }

    /// Ledger/storage name, matching the categorical particle-type field.
    pub fn name(&self) -> &'static str {
        match self {
            Species::PiPlus => "pi+",
            Species::PiMinus => "pi-",
            Species::MuPlus => "mu+",
            Species::MuMinus => "mu-",
            Species::EPlus => "e+",
            Species::EMinus => "e-",
            Species::NuE => "nue",
            Species::NuEBar => "nueBar",
            Species::NuMu => "numu",
            Species::NuMuBar => "numuBar",
            Species::None => "none",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdg_codes_round_trip() {
        for s in Species::ALL {
            assert_eq!(Species::from_pdg_code(s.pdg_code()), Some(s));
        }
    }

    #[test]
    fn test_antiparticle_codes_are_negated() {
        assert_eq!(Species::PiPlus.pdg_code(), -Species::PiMinus.pdg_code());
        assert_eq!(Species::NuMu.pdg_code(), -Species::NuMuBar.pdg_code());
        assert_eq!(Species::EPlus.pdg_code(), -Species::EMinus.pdg_code());
    }

    #[test]
    fn test_neutrino_masses_are_zero() {
        for s in [Species::NuE, Species::NuEBar, Species::NuMu, Species::NuMuBar] {
            assert_eq!(s.mass_gev(), 0.0);
        }
    }

    #[test]
    fn test_serde_round_trip() {
        for s in Species::ALL {
            let json = serde_json::to_string(&s).unwrap();
            let back: Species = serde_json::from_str(&json).unwrap();
            assert_eq!(back, s);
        }
    }
}

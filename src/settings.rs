// Run configuration: event counts, seeds, beam momenta, stored-beam
// polarity and the detector planes, loadable from a JSON file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BeamError, Result};
use crate::history::CommitMode;
use crate::species::Species;

/// Charge of the stored beam. Positive stores pi+ -> mu+ nu_mu with
/// mu+ -> e+ nu_e nu_mu_bar; negative is the charge conjugate chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    pub fn pion(&self) -> Species {
        match self {
            Polarity::Positive => Species::PiPlus,
            Polarity::Negative => Species::PiMinus,
        }
    }

    pub fn muon(&self) -> Species {
        match self {
            Polarity::Positive => Species::MuPlus,
            Polarity::Negative => Species::MuMinus,
        }
    }

    /// Neutrino from the pion decay flash.
    pub fn flash_neutrino(&self) -> Species {
        match self {
            Polarity::Positive => Species::NuMu,
            Polarity::Negative => Species::NuMuBar,
        }
    }

    pub fn electron(&self) -> Species {
        match self {
            Polarity::Positive => Species::EPlus,
            Polarity::Negative => Species::EMinus,
        }
    }

    /// Electron-flavour neutrino from the muon decay.
    pub fn decay_nue(&self) -> Species {
        match self {
            Polarity::Positive => Species::NuE,
            Polarity::Negative => Species::NuEBar,
        }
    }

    /// Muon-flavour neutrino from the muon decay.
    pub fn decay_numu(&self) -> Species {
        match self {
            Polarity::Positive => Species::NuMuBar,
            Polarity::Negative => Species::NuMu,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Number of events to generate.
    pub events: usize,
    pub seed: u64,
    pub run_number: i32,
    /// Nominal pion momentum at injection (GeV).
    pub pion_momentum: f64,
    /// Nominal stored-muon momentum (GeV).
    pub muon_momentum: f64,
    pub polarity: Polarity,
    /// Forward-bias parameter for muon-decay orientation sampling;
    /// 0 restores uniform sampling with unit weights.
    pub forward_bias: f64,
    pub commit_mode: CommitMode,
    /// Detector plane position along the lab z axis (m).
    pub detector_z: f64,
    /// Transverse half-aperture of the detector (m); hits outside keep
    /// their record but carry zero weight.
    pub detector_half_aperture: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            events: 1000,
            seed: 42,
            run_number: 1,
            pion_momentum: 8.0,
            muon_momentum: 6.0,
            polarity: Polarity::Positive,
            forward_bias: 0.0,
            commit_mode: CommitMode::Soft,
            detector_z: 230.0,
            detector_half_aperture: 2.5,
        }
    }
}

impl Settings {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| BeamError::StorageIo {
            run: -1,
            event: -1,
            source,
        })?;
        serde_json::from_str(&text).map_err(|e| BeamError::MalformedRecord(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positive_polarity_species() {
        let p = Polarity::Positive;
        assert_eq!(p.pion(), Species::PiPlus);
        assert_eq!(p.muon(), Species::MuPlus);
        assert_eq!(p.flash_neutrino(), Species::NuMu);
        assert_eq!(p.electron(), Species::EPlus);
        assert_eq!(p.decay_nue(), Species::NuE);
        assert_eq!(p.decay_numu(), Species::NuMuBar);
    }

    #[test]
    fn test_negative_polarity_is_charge_conjugate() {
        let p = Polarity::Negative;
        assert_eq!(p.pion(), Species::PiMinus);
        assert_eq!(p.muon(), Species::MuMinus);
        assert_eq!(p.flash_neutrino(), Species::NuMuBar);
        assert_eq!(p.electron(), Species::EMinus);
        assert_eq!(p.decay_nue(), Species::NuEBar);
        assert_eq!(p.decay_numu(), Species::NuMu);
    }

    #[test]
    fn test_settings_parse_from_json() {
        let json = r#"{
            "events": 50,
            "seed": 7,
            "run_number": 3,
            "pion_momentum": 8.0,
            "muon_momentum": 6.0,
            "polarity": "Negative",
            "forward_bias": 0.2,
            "commit_mode": "Strict",
            "detector_z": 250.0,
            "detector_half_aperture": 2.0
        }"#;
        let s: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(s.events, 50);
        assert_eq!(s.polarity, Polarity::Negative);
        assert_eq!(s.commit_mode, CommitMode::Strict);
        assert_eq!(s.detector_z, 250.0);
    }
}

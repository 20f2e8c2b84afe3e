mod beamline;
mod constants;
mod error;
mod histogram;
mod history;
mod kinematics;
mod muon_decay;
mod neutrino_event;
mod particle;
mod pion_decay;
mod pion_event;
mod plane;
mod runner;
mod settings;
mod species;
mod storage;
mod trace_space;

pub use beamline::{Beamline, BeamDirection};
pub use constants::{
    MUON_LIFETIME, MUON_MASS_GEV, MUON_MASS_MEV, PION_LIFETIME, PION_MASS_GEV, PION_MASS_MEV,
    SPEED_OF_LIGHT,
};
pub use error::{BeamError, Result};
pub use histogram::{Histogram, Histogram2D, HistogramSet};
pub use history::{CommitMode, EventHistory, Location};
pub use kinematics::FourMomentum;
pub use muon_decay::MuonDecay;
pub use neutrino_event::NeutrinoEventInstance;
pub use particle::ParticleRecord;
pub use pion_decay::PionDecay;
pub use pion_event::PionEventInstance;
pub use plane::{Plane, PlaneHit};
pub use runner::{RunSummary, Runner};
pub use settings::{Polarity, Settings};
pub use species::Species;
pub use storage::{HistoryReader, HistoryWriter, JsonHistoryReader, JsonHistoryWriter};
pub use trace_space::TraceSpace;

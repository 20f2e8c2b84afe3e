//! Error types for the decay-chain simulation.

use crate::history::Location;
use crate::species::Species;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeamError {
    /// Input or sampled 4-momentum violates a mass-shell or threshold
    /// constraint. Aborts the current event only; the run continues.
    #[error("invalid kinematics for {species:?}: E = {energy} GeV < m = {mass} GeV")]
    InvalidKinematics {
        species: Species,
        energy: f64,
        mass: f64,
    },

    /// Ledger query or strict-mode commit against a location that was
    /// never populated this event.
    #[error("no particle recorded at location {0:?}")]
    MissingLocation(Location),

    /// Neutrino trajectory parallel to the detector plane; checked before
    /// the pz divide instead of letting the arithmetic fault through.
    #[error("trajectory parallel to detector plane (pz = {pz})")]
    DegenerateTrajectory { pz: f64 },

    /// Failure in the external storage collaborator, with event context.
    #[error("storage I/O failure at run {run}, event {event}: {source}")]
    StorageIo {
        run: i32,
        event: i32,
        #[source]
        source: std::io::Error,
    },

    /// A persisted row carried a location or species the schema does not
    /// define.
    #[error("malformed history row: {0}")]
    MalformedRecord(String),
}

pub type Result<T> = std::result::Result<T, BeamError>;

// Per-event ledger of particle records keyed by beamline location.
// Exactly one record per location; an event is committed as a unit.

use serde::{Deserialize, Serialize};

use crate::error::{BeamError, Result};
use crate::particle::ParticleRecord;
use crate::storage::HistoryWriter;

/// The beamline locations an event history covers, in commit order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    Target,
    ProductionStraight,
    PionDecay,
    MuonProduction,
    PiFlashNu,
    MuonDecay,
    EProduction,
    NumuProduction,
    NueProduction,
    NumuDetector,
    NueDetector,
}

impl Location {
    pub const ALL: [Location; 11] = [
        Location::Target,
        Location::ProductionStraight,
        Location::PionDecay,
        Location::MuonProduction,
        Location::PiFlashNu,
        Location::MuonDecay,
        Location::EProduction,
        Location::NumuProduction,
        Location::NueProduction,
        Location::NumuDetector,
        Location::NueDetector,
    ];

    /// Stable key used in persisted rows.
    pub fn key(&self) -> &'static str {
        match self {
            Location::Target => "target",
            Location::ProductionStraight => "productionStraight",
            Location::PionDecay => "pionDecay",
            Location::MuonProduction => "muonProduction",
            Location::PiFlashNu => "piFlashNu",
            Location::MuonDecay => "muonDecay",
            Location::EProduction => "eProduction",
            Location::NumuProduction => "numuProduction",
            Location::NueProduction => "nueProduction",
            Location::NumuDetector => "numuDetector",
            Location::NueDetector => "nueDetector",
        }
    }

    pub fn from_key(key: &str) -> Option<Location> {
        Location::ALL.iter().copied().find(|l| l.key() == key)
    }

    fn index(&self) -> usize {
        Location::ALL.iter().position(|l| l == self).unwrap_or(0)
    }
}

/// What a lookup or commit does about an unfilled location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CommitMode {
    /// Missing locations are errors.
    Strict,
    /// Missing locations yield placeholder records with zero weight.
    Soft,
}

/// One event's worth of particle records. Fill it location by location,
/// then commit it to a writer; committing resets the ledger for the next
/// event.
#[derive(Debug, Clone)]
pub struct EventHistory {
    mode: CommitMode,
    run_number: i32,
    event_number: i32,
    slots: [Option<ParticleRecord>; 11],
}

impl EventHistory {
    pub fn new(mode: CommitMode, run_number: i32) -> Self {
        Self {
            mode,
            run_number,
            event_number: 0,
            slots: Default::default(),
        }
    }

    pub fn run_number(&self) -> i32 {
        self.run_number
    }

    pub fn event_number(&self) -> i32 {
        self.event_number
    }

    pub fn set_event_number(&mut self, event_number: i32) {
        self.event_number = event_number;
    }

    /// Records a particle at a location, replacing any previous record
    /// there. Locations can be filled in any order.
    pub fn add_particle(&mut self, location: Location, record: ParticleRecord) {
        self.slots[location.index()] = Some(record);
    }

    /// Looks up the record at a location. In soft mode an unfilled
    /// location yields a zero-weight placeholder instead of an error.
    pub fn find_particle(&self, location: Location) -> Result<ParticleRecord> {
        match (&self.slots[location.index()], self.mode) {
            (Some(record), _) => Ok(record.clone()),
            (None, CommitMode::Soft) => Ok(ParticleRecord::placeholder(
                self.run_number,
                self.event_number,
            )),
            (None, CommitMode::Strict) => Err(BeamError::MissingLocation(location)),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.slots.iter().all(|s| s.is_some())
    }

    /// Commits the event to the writer, one record per location in
    /// canonical order, then clears all slots. The writer sees the whole
    /// event or none of it.
    pub fn fill<W: HistoryWriter + ?Sized>(&mut self, writer: &mut W) -> Result<()> {
        // Resolve every location before touching the writer so a missing
        // record cannot leave a half-appended event behind.
        let mut records = Vec::with_capacity(Location::ALL.len());
        for location in Location::ALL {
            records.push((location, self.find_particle(location)?));
        }
        for (location, record) in &records {
            writer.append(*location, record)?;
        }
        writer.commit_event()?;
        self.slots = Default::default();
        Ok(())
    }

    /// Discards all records without committing, e.g. after a failed
    /// decay chain.
    pub fn clear(&mut self) {
        self.slots = Default::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::species::Species;
    use crate::storage::HistoryWriter;

    struct CollectingWriter {
        rows: Vec<(Location, ParticleRecord)>,
        commits: usize,
    }

    impl HistoryWriter for CollectingWriter {
        fn append(&mut self, location: Location, record: &ParticleRecord) -> Result<()> {
            self.rows.push((location, record.clone()));
            Ok(())
        }

        fn commit_event(&mut self) -> Result<()> {
            self.commits += 1;
            Ok(())
        }
    }

    fn sample_record(event: i32, species: Species) -> ParticleRecord {
        ParticleRecord::new(
            1, event, 10.0, 0.0, 0.0, 10.0, 0.0, 0.0, 5.0, 30.0, 1.0, species,
        )
    }

    #[test]
    fn test_location_keys_round_trip() {
        for location in Location::ALL {
            assert_eq!(Location::from_key(location.key()), Some(location));
        }
        assert_eq!(Location::from_key("elsewhere"), None);
    }

    #[test]
    fn test_find_particle_returns_what_was_added() {
        let mut history = EventHistory::new(CommitMode::Strict, 1);
        let record = sample_record(1, Species::MuPlus);
        history.add_particle(Location::MuonProduction, record.clone());
        assert_eq!(
            history.find_particle(Location::MuonProduction).unwrap(),
            record
        );
    }

    #[test]
    fn test_strict_mode_rejects_missing_location() {
        let history = EventHistory::new(CommitMode::Strict, 1);
        let err = history.find_particle(Location::NueDetector).unwrap_err();
        assert!(matches!(
            err,
            BeamError::MissingLocation(Location::NueDetector)
        ));
    }

    #[test]
    fn test_soft_mode_substitutes_placeholder() {
        let mut history = EventHistory::new(CommitMode::Soft, 7);
        history.set_event_number(42);
        let record = history.find_particle(Location::PiFlashNu).unwrap();
        assert_eq!(record.species, Species::None);
        assert_eq!(record.weight, 0.0);
        assert_eq!(record.run_number, 7);
        assert_eq!(record.event_number, 42);
    }

    #[test]
    fn test_re_adding_replaces_the_record() {
        let mut history = EventHistory::new(CommitMode::Strict, 1);
        history.add_particle(Location::Target, sample_record(1, Species::PiPlus));
        let replacement = sample_record(1, Species::PiMinus);
        history.add_particle(Location::Target, replacement.clone());
        assert_eq!(history.find_particle(Location::Target).unwrap(), replacement);
    }

    #[test]
    fn test_fill_emits_all_locations_in_order_and_resets() {
        let mut history = EventHistory::new(CommitMode::Soft, 1);
        history.add_particle(Location::Target, sample_record(1, Species::PiPlus));
        let mut writer = CollectingWriter {
            rows: Vec::new(),
            commits: 0,
        };
        history.fill(&mut writer).unwrap();
        assert_eq!(writer.rows.len(), 11);
        assert_eq!(writer.commits, 1);
        let order: Vec<Location> = writer.rows.iter().map(|(l, _)| *l).collect();
        assert_eq!(order, Location::ALL.to_vec());
        // Slots are cleared after the commit.
        assert!(!history.is_complete());
        assert_eq!(
            history.find_particle(Location::Target).unwrap().species,
            Species::None
        );
    }

    #[test]
    fn test_strict_fill_fails_on_incomplete_event() {
        let mut history = EventHistory::new(CommitMode::Strict, 1);
        history.add_particle(Location::Target, sample_record(1, Species::PiPlus));
        let mut writer = CollectingWriter {
            rows: Vec::new(),
            commits: 0,
        };
        assert!(history.fill(&mut writer).is_err());
        assert_eq!(writer.commits, 0);
    }
}

// Persistence of event histories as JSON lines, one event per line.
// serde_json writes f64 values with shortest-round-trip precision, so a
// reread record compares equal field by field to the one written.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BeamError, Result};
use crate::history::{CommitMode, EventHistory, Location};
use crate::particle::ParticleRecord;

/// Sink for committed event histories. The ledger appends one record per
/// location, then commits the event as a unit.
pub trait HistoryWriter {
    fn append(&mut self, location: Location, record: &ParticleRecord) -> Result<()>;
    fn commit_event(&mut self) -> Result<()>;
}

/// Source of previously committed event histories.
pub trait HistoryReader {
    /// Next event in file order, or None at end of input.
    fn read_next_event(&mut self) -> Result<Option<EventHistory>>;
    /// Particle records read so far.
    fn record_count(&self) -> usize;
}

/// One persisted particle row. The species travels as its PDG code.
#[derive(Debug, Serialize, Deserialize)]
struct HistoryRow {
    run: i32,
    event: i32,
    pdg: i32,
    s: f64,
    x: f64,
    y: f64,
    z: f64,
    px: f64,
    py: f64,
    pz: f64,
    t: f64,
    weight: f64,
}

impl HistoryRow {
    fn from_record(record: &ParticleRecord) -> Self {
        Self {
            run: record.run_number,
            event: record.event_number,
            pdg: record.species.pdg_code(),
            s: record.trace.s,
            x: record.trace.x,
            y: record.trace.y,
            z: record.trace.z,
            px: record.px,
            py: record.py,
            pz: record.pz,
            t: record.t,
            weight: record.weight,
        }
    }

    fn to_record(&self) -> Result<ParticleRecord> {
        let species = crate::species::Species::from_pdg_code(self.pdg)
            .ok_or_else(|| BeamError::MalformedRecord(format!("unknown PDG code {}", self.pdg)))?;
        Ok(ParticleRecord::new(
            self.run,
            self.event,
            self.s,
            self.x,
            self.y,
            self.z,
            self.px,
            self.py,
            self.pz,
            self.t,
            self.weight,
            species,
        ))
    }
}

fn io_error(run: i32, event: i32, source: std::io::Error) -> BeamError {
    BeamError::StorageIo { run, event, source }
}

/// Writes event histories to a JSON-lines file. Rows accumulate in memory
/// until `commit_event` serializes the whole event as one line, so a
/// failed event never leaves a partial line behind.
pub struct JsonHistoryWriter {
    writer: BufWriter<File>,
    pending: BTreeMap<String, HistoryRow>,
    run: i32,
    event: i32,
}

impl JsonHistoryWriter {
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path).map_err(|e| io_error(0, 0, e))?;
        Ok(Self {
            writer: BufWriter::new(file),
            pending: BTreeMap::new(),
            run: 0,
            event: 0,
        })
    }

    /// Flushes buffered lines to the file.
    pub fn flush(&mut self) -> Result<()> {
        self.writer
            .flush()
            .map_err(|e| io_error(self.run, self.event, e))
    }
}

impl HistoryWriter for JsonHistoryWriter {
    fn append(&mut self, location: Location, record: &ParticleRecord) -> Result<()> {
        self.run = record.run_number;
        self.event = record.event_number;
        self.pending
            .insert(location.key().to_owned(), HistoryRow::from_record(record));
        Ok(())
    }

    fn commit_event(&mut self) -> Result<()> {
        let line = serde_json::to_string(&self.pending)
            .map_err(|e| BeamError::MalformedRecord(e.to_string()))?;
        self.pending.clear();
        writeln!(self.writer, "{line}").map_err(|e| io_error(self.run, self.event, e))
    }
}

/// Reads event histories back from a JSON-lines file. Returned histories
/// are soft-mode so analysis code can query locations freely.
#[derive(Debug)]
pub struct JsonHistoryReader {
    reader: BufReader<File>,
    records_read: usize,
    events_read: i32,
}

impl JsonHistoryReader {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path).map_err(|e| io_error(0, 0, e))?;
        Ok(Self {
            reader: BufReader::new(file),
            records_read: 0,
            events_read: 0,
        })
    }
}

impl HistoryReader for JsonHistoryReader {
    fn read_next_event(&mut self) -> Result<Option<EventHistory>> {
        let mut line = String::new();
        let n = self
            .reader
            .read_line(&mut line)
            .map_err(|e| io_error(0, self.events_read, e))?;
        if n == 0 {
            return Ok(None);
        }
        let rows: BTreeMap<String, HistoryRow> = serde_json::from_str(line.trim_end())
            .map_err(|e| BeamError::MalformedRecord(e.to_string()))?;

        let mut run = 0;
        let mut event = 0;
        let mut parsed = Vec::with_capacity(rows.len());
        for (key, row) in &rows {
            let location = Location::from_key(key)
                .ok_or_else(|| BeamError::MalformedRecord(format!("unknown location {key:?}")))?;
            let record = row.to_record()?;
            run = record.run_number;
            event = record.event_number;
            parsed.push((location, record));
        }

        let mut history = EventHistory::new(CommitMode::Soft, run);
        history.set_event_number(event);
        for (location, record) in parsed {
            history.add_particle(location, record);
            self.records_read += 1;
        }
        self.events_read += 1;
        Ok(Some(history))
    }

    fn record_count(&self) -> usize {
        self.records_read
    }
}

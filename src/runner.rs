// Sequential event loop: one seeded RNG drives the whole run, each
// event walks the pion -> muon -> neutrino chain, fills the history
// ledger and commits it as a unit.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::beamline::Beamline;
use crate::constants::{MUON_MASS_GEV, PION_MASS_GEV, SPEED_OF_LIGHT};
use crate::error::{BeamError, Result};
use crate::histogram::HistogramSet;
use crate::history::{EventHistory, Location};
use crate::neutrino_event::NeutrinoEventInstance;
use crate::particle::ParticleRecord;
use crate::pion_event::PionEventInstance;
use crate::plane::{Plane, PlaneHit};
use crate::settings::Settings;
use crate::storage::HistoryWriter;

/// Counters accumulated over a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub events_requested: usize,
    pub events_committed: usize,
    /// Forbidden orientation draws discarded during muon-decay sampling.
    pub zero_weight_draws: u64,
    pub invalid_kinematics: usize,
    pub degenerate_trajectories: usize,
    /// Detector hits outside the aperture, recorded with zero weight.
    pub off_aperture_hits: usize,
}

/// Owns the configuration of a run; `run` drives the chain event by
/// event against a caller-supplied writer and histogram set.
pub struct Runner {
    settings: Settings,
    beamline: Beamline,
}

struct BookedHistograms {
    nue_energy: usize,
    numu_energy: usize,
    flash_energy: usize,
    nue_radius: usize,
    numu_radius: usize,
    nue_plane_xy: usize,
    numu_plane_xy: usize,
}

impl Runner {
    pub fn new(settings: Settings, beamline: Beamline) -> Self {
        Self { settings, beamline }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Runs the configured number of events. Deterministic for a fixed
    /// seed: the single RNG is consumed in a fixed order, so two runs
    /// with the same settings produce bitwise-identical records.
    pub fn run<W: HistoryWriter>(
        &self,
        writer: &mut W,
        histograms: &mut HistogramSet,
    ) -> Result<RunSummary> {
        let mut rng = StdRng::seed_from_u64(self.settings.seed);
        self.run_with_rng(&mut rng, writer, histograms)
    }

    pub fn run_with_rng<R: Rng + ?Sized, W: HistoryWriter>(
        &self,
        rng: &mut R,
        writer: &mut W,
        histograms: &mut HistogramSet,
    ) -> Result<RunSummary> {
        let s = &self.settings;
        info!(
            "run {}: {} events, {:?} beam at {} GeV (muons {} GeV), seed {}",
            s.run_number, s.events, s.polarity, s.pion_momentum, s.muon_momentum, s.seed
        );

        let e_span = 1.2 * s.pion_momentum;
        let booked = BookedHistograms {
            nue_energy: histograms.book("nu_e energy at detector (GeV)", 100, 0.0, e_span),
            numu_energy: histograms.book("nu_mu energy at detector (GeV)", 100, 0.0, e_span),
            flash_energy: histograms.book("flash nu_mu energy (GeV)", 100, 0.0, e_span),
            nue_radius: histograms.book("nu_e radius at detector (m)", 100, 0.0, 10.0),
            numu_radius: histograms.book("nu_mu radius at detector (m)", 100, 0.0, 10.0),
            nue_plane_xy: histograms.book_2d(
                "nu_e x-y at detector (m)", 50, -5.0, 5.0, 50, -5.0, 5.0,
            ),
            numu_plane_xy: histograms.book_2d(
                "nu_mu x-y at detector (m)", 50, -5.0, 5.0, 50, -5.0, 5.0,
            ),
        };

        let plane = Plane::new(s.detector_z);
        let mut history = EventHistory::new(s.commit_mode, s.run_number);
        let mut summary = RunSummary {
            events_requested: s.events,
            ..RunSummary::default()
        };

        // One bounded pass over the requested events; an aborted event
        // is counted and skipped, never retried.
        for event in 1..=s.events as i32 {
            history.set_event_number(event);
            match self.generate_event(event, &plane, rng, &mut history, histograms, &booked) {
                Ok(stats) => {
                    summary.zero_weight_draws += stats.zero_weight_draws;
                    summary.off_aperture_hits += stats.off_aperture_hits;
                    history.fill(writer)?;
                    summary.events_committed += 1;
                }
                Err(BeamError::InvalidKinematics { species, energy, mass }) => {
                    debug!(
                        "event {event}: invalid kinematics for {species:?} (E = {energy}, m = {mass})"
                    );
                    summary.invalid_kinematics += 1;
                    history.clear();
                }
                Err(BeamError::DegenerateTrajectory { pz }) => {
                    debug!("event {event}: trajectory parallel to detector plane (pz = {pz})");
                    summary.degenerate_trajectories += 1;
                    history.clear();
                }
                Err(other) => return Err(other),
            }
        }

        info!(
            "run {} complete: {} committed, {} zero-weight draws, {} invalid, {} degenerate, {} off-aperture",
            s.run_number,
            summary.events_committed,
            summary.zero_weight_draws,
            summary.invalid_kinematics,
            summary.degenerate_trajectories,
            summary.off_aperture_hits
        );
        Ok(summary)
    }

    fn generate_event<R: Rng + ?Sized>(
        &self,
        event: i32,
        plane: &Plane,
        rng: &mut R,
        history: &mut EventHistory,
        histograms: &mut HistogramSet,
        booked: &BookedHistograms,
    ) -> Result<EventStats> {
        let s = &self.settings;
        let run = s.run_number;
        let mut stats = EventStats::default();

        // Pion leg. The beam axis is z through the production straight.
        let pi_evt = PionEventInstance::generate(s.pion_momentum, &self.beamline, rng)?;
        history.add_particle(
            Location::Target,
            ParticleRecord::new(
                run, event, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, s.pion_momentum, 0.0, 1.0,
                s.polarity.pion(),
            ),
        );
        history.add_particle(
            Location::ProductionStraight,
            ParticleRecord::new(
                run, event, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, pi_evt.p_pi_gen(), 0.0, 1.0,
                s.polarity.pion(),
            ),
        );

        let pi_trace = pi_evt.trace_space();
        let e_pi = (pi_evt.p_pi_gen().powi(2) + PION_MASS_GEV * PION_MASS_GEV).sqrt();
        let t_pi = e_pi / PION_MASS_GEV * pi_evt.lifetime() * 1e9;
        history.add_particle(
            Location::PionDecay,
            ParticleRecord::new(
                run,
                event,
                pi_trace.s,
                pi_trace.x,
                pi_trace.y,
                pi_trace.z,
                0.0,
                0.0,
                pi_evt.p_pi_gen(),
                t_pi,
                1.0,
                s.polarity.pion(),
            ),
        );

        let mu4 = pi_evt.mu4mmtm();
        history.add_particle(
            Location::MuonProduction,
            ParticleRecord::new(
                run, event, pi_trace.s, pi_trace.x, pi_trace.y, pi_trace.z, mu4.p.x, mu4.p.y,
                mu4.p.z, t_pi, 1.0, s.polarity.muon(),
            ),
        );

        let flash4 = pi_evt.numu4mmtm();
        history.add_particle(
            Location::PiFlashNu,
            ParticleRecord::new(
                run, event, pi_trace.s, pi_trace.x, pi_trace.y, pi_trace.z, flash4.p.x,
                flash4.p.y, flash4.p.z, t_pi, 1.0, s.polarity.flash_neutrino(),
            ),
        );
        let flash_hit = plane.find_hit_pi_flash(&pi_evt)?;
        histograms.fill(booked.flash_energy, flash_hit.energy, flash_hit.weight);

        // Muon leg on the ring.
        let nu_evt =
            NeutrinoEventInstance::generate(s.muon_momentum, &self.beamline, s.forward_bias, rng)?;
        stats.zero_weight_draws = nu_evt.zero_weight_draws();
        let weight = nu_evt.weight();
        let mu_trace = nu_evt.trace_space();

        let e_mu = (nu_evt.p_mu_gen().powi(2) + MUON_MASS_GEV * MUON_MASS_GEV).sqrt();
        let t_mu = e_mu / MUON_MASS_GEV * nu_evt.lifetime() * 1e9;
        // Stored-muon momentum points along the local beam axis.
        let dir = self.beamline.beam_dir(mu_trace.s);
        let p_mu_lab = dir.r_inv * nalgebra::Vector3::new(0.0, 0.0, nu_evt.p_mu_gen());
        history.add_particle(
            Location::MuonDecay,
            ParticleRecord::new(
                run, event, mu_trace.s, mu_trace.x, mu_trace.y, mu_trace.z, p_mu_lab.x,
                p_mu_lab.y, p_mu_lab.z, t_mu, weight, s.polarity.muon(),
            ),
        );

        let e4 = nu_evt.e4mmtm();
        history.add_particle(
            Location::EProduction,
            ParticleRecord::new(
                run, event, mu_trace.s, mu_trace.x, mu_trace.y, mu_trace.z, e4.p.x, e4.p.y,
                e4.p.z, t_mu, weight, s.polarity.electron(),
            ),
        );
        let numu4 = nu_evt.numu4mmtm();
        history.add_particle(
            Location::NumuProduction,
            ParticleRecord::new(
                run, event, mu_trace.s, mu_trace.x, mu_trace.y, mu_trace.z, numu4.p.x,
                numu4.p.y, numu4.p.z, t_mu, weight, s.polarity.decay_numu(),
            ),
        );
        let nue4 = nu_evt.nue4mmtm();
        history.add_particle(
            Location::NueProduction,
            ParticleRecord::new(
                run, event, mu_trace.s, mu_trace.x, mu_trace.y, mu_trace.z, nue4.p.x, nue4.p.y,
                nue4.p.z, t_mu, weight, s.polarity.decay_nue(),
            ),
        );

        // Detector hits, weight zeroed outside the aperture.
        let (hit_e, hit_mu) = plane.find_hit_mu_event(&nu_evt)?;
        let rec_e = self.detector_record(
            event, &mu_trace, t_mu, &hit_e, s.polarity.decay_nue(), &mut stats,
        );
        histograms.fill(booked.nue_energy, hit_e.energy, rec_e.weight);
        histograms.fill(booked.nue_radius, hit_e.r, rec_e.weight);
        histograms.fill_2d(booked.nue_plane_xy, hit_e.x, hit_e.y, rec_e.weight);
        history.add_particle(Location::NueDetector, rec_e);

        let rec_mu = self.detector_record(
            event, &mu_trace, t_mu, &hit_mu, s.polarity.decay_numu(), &mut stats,
        );
        histograms.fill(booked.numu_energy, hit_mu.energy, rec_mu.weight);
        histograms.fill(booked.numu_radius, hit_mu.r, rec_mu.weight);
        histograms.fill_2d(booked.numu_plane_xy, hit_mu.x, hit_mu.y, rec_mu.weight);
        history.add_particle(Location::NumuDetector, rec_mu);

        Ok(stats)
    }

    /// Record for a neutrino at the detector plane: path length and time
    /// extended from the decay vertex along the straight line.
    fn detector_record(
        &self,
        event: i32,
        vertex: &crate::trace_space::TraceSpace,
        t_decay: f64,
        hit: &PlaneHit,
        species: crate::species::Species,
        stats: &mut EventStats,
    ) -> ParticleRecord {
        let dx = hit.x - vertex.x;
        let dy = hit.y - vertex.y;
        let dz = hit.z - vertex.z;
        let flight = (dx * dx + dy * dy + dz * dz).sqrt();
        let weight = if hit.r > self.settings.detector_half_aperture {
            stats.off_aperture_hits += 1;
            0.0
        } else {
            hit.weight
        };
        ParticleRecord::new(
            self.settings.run_number,
            event,
            vertex.s + flight,
            hit.x,
            hit.y,
            hit.z,
            hit.px,
            hit.py,
            hit.pz,
            t_decay + flight / SPEED_OF_LIGHT * 1e9,
            weight,
            species,
        )
    }
}

#[derive(Default)]
struct EventStats {
    zero_weight_draws: u64,
    off_aperture_hits: usize,
}

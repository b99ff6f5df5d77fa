//! νμ energy spectrum before and after oscillation.
//!
//! Only νμ/ν̄μ events with positive energy contribute. Each fills the
//! unoscillated spectrum with its cross-section weight `w`, and the
//! oscillated spectra with `w · P(νμ→νμ)` in the vacuum and matter
//! approximations.

use nu_core::{EventRecord, EventSource, Result};
use nu_hist::BinnedSeries;
use nu_physics::oscillation::OscillationPoint;
use nu_physics::{OscillationEngine, Skip};
use serde::Serialize;

use crate::config::{AnalysisConfig, OscillationConfig};
use crate::pass::{Accumulator, SkipCounts, run_pass};

/// Schema tag of [`OscillationReport`].
pub const OSCILLATION_SCHEMA: &str = "nusight_oscillation_v0";

/// Oscillation weighting output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OscillationReport {
    /// Always [`OSCILLATION_SCHEMA`].
    pub schema_version: String,
    /// Engine the weights came from.
    pub engine: OscillationEngine,
    /// Events read.
    pub events: u64,
    /// Events that contributed.
    pub selected: u64,
    /// Unoscillated spectrum.
    pub unoscillated: BinnedSeries,
    /// Weighted by vacuum survival probability.
    pub vacuum: BinnedSeries,
    /// Weighted by matter-approximated survival probability.
    pub matter: BinnedSeries,
    /// Both probabilities at the bin centers.
    pub probabilities: Vec<OscillationPoint>,
    /// Rejected events by reason.
    pub skips: SkipCounts,
}

/// Accumulator behind [`run_oscillation`].
#[derive(Debug, Clone)]
pub struct OscillationAccumulator {
    engine: OscillationEngine,
    events: u64,
    selected: u64,
    unoscillated: BinnedSeries,
    vacuum: BinnedSeries,
    matter: BinnedSeries,
    skips: SkipCounts,
}

impl OscillationAccumulator {
    /// Empty spectra with the configured binning.
    pub fn new(config: &OscillationConfig) -> Self {
        let b = config.binning;
        Self {
            engine: config.engine,
            events: 0,
            selected: 0,
            unoscillated: BinnedSeries::new("unoscillated", b)
                .with_title("Unoscillated;E_nu [GeV];Arb"),
            vacuum: BinnedSeries::new("vacuum", b)
                .with_title("Oscillated (vacuum approx);E_nu [GeV];Arb"),
            matter: BinnedSeries::new("matter", b)
                .with_title("Oscillated (matter approx);E_nu [GeV];Arb"),
            skips: SkipCounts::default(),
        }
    }

    /// Final report; `normalize` scales each spectrum to unit area.
    pub fn finish(mut self, normalize: bool) -> OscillationReport {
        if normalize {
            self.unoscillated.normalize();
            self.vacuum.normalize();
            self.matter.normalize();
        }
        let probabilities = self.engine.scan(self.unoscillated.bin_centers());
        OscillationReport {
            schema_version: OSCILLATION_SCHEMA.to_string(),
            engine: self.engine,
            events: self.events,
            selected: self.selected,
            unoscillated: self.unoscillated,
            vacuum: self.vacuum,
            matter: self.matter,
            probabilities,
            skips: self.skips,
        }
    }
}

impl Accumulator for OscillationAccumulator {
    fn observe(&mut self, event: &EventRecord) {
        self.events += 1;
        let nu = event.neutrino();
        if !nu.is_muon_flavor() {
            self.skips.record(event.entry(), Skip::NotMuonNeutrino);
            return;
        }
        if nu.energy.is_nan() || nu.energy <= 0.0 {
            self.skips.record(event.entry(), Skip::NonPositiveEnergy);
            return;
        }
        self.selected += 1;

        let w = event.cross_section_weight();
        self.unoscillated.fill(nu.energy, w);
        self.vacuum.fill(nu.energy, w * self.engine.vacuum(nu.energy).survival);
        self.matter.fill(nu.energy, w * self.engine.matter(nu.energy).survival);
    }

    fn merge(&mut self, other: Self) -> Result<()> {
        self.events += other.events;
        self.selected += other.selected;
        self.skips.merge(&other.skips);
        self.unoscillated.merge(&other.unoscillated)?;
        self.vacuum.merge(&other.vacuum)?;
        self.matter.merge(&other.matter)
    }
}

/// Oscillate the νμ spectrum of `source`.
pub fn run_oscillation<S: EventSource + ?Sized>(
    source: &S,
    config: &AnalysisConfig,
) -> Result<OscillationReport> {
    let engine = &config.oscillation.engine;
    tracing::info!(
        events = source.count(),
        baseline_km = engine.baseline_km,
        density = engine.medium.density,
        "oscillation weighting"
    );
    let acc = run_pass(source, config, || OscillationAccumulator::new(&config.oscillation))?;
    let report = acc.finish(config.normalize);
    tracing::debug!(selected = report.selected, skipped = report.skips.total(), "oscillation done");
    Ok(report)
}

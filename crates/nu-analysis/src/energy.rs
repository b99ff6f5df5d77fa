//! True, calorimetric and quasi-elastic energy spectra of CC events, plus
//! the true-vs-calorimetric response.
//!
//! Every fill carries the event's cross-section weight.

use nu_core::{EventRecord, EventSource, Result};
use nu_hist::{BinnedSeries, BinnedSeries2D};
use nu_physics::EnergyReconstructor;
use serde::Serialize;

use crate::config::{AnalysisConfig, EnergyConfig};
use crate::pass::{Accumulator, SkipCounts, run_pass};

/// Schema tag of [`EnergyReport`].
pub const ENERGY_SCHEMA: &str = "nusight_energy_reco_v0";

/// Energy reconstruction output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnergyReport {
    /// Always [`ENERGY_SCHEMA`].
    pub schema_version: String,
    /// Events read.
    pub events: u64,
    /// CC events used.
    pub cc_events: u64,
    /// True neutrino energy.
    pub true_energy: BinnedSeries,
    /// Calorimetric estimate.
    pub calorimetric: BinnedSeries,
    /// Quasi-elastic estimate, where defined.
    pub kinematic: BinnedSeries,
    /// x: true energy, y: calorimetric estimate.
    pub response: BinnedSeries2D,
    /// Skipped events and undefined estimates.
    pub skips: SkipCounts,
}

/// Accumulator behind [`run_energy`].
#[derive(Debug, Clone)]
pub struct EnergyAccumulator {
    reconstructor: EnergyReconstructor,
    report: EnergyReport,
}

impl EnergyAccumulator {
    /// Empty spectra with the configured binning.
    pub fn new(config: &EnergyConfig) -> Self {
        let b = config.binning;
        let report = EnergyReport {
            schema_version: ENERGY_SCHEMA.to_string(),
            events: 0,
            cc_events: 0,
            true_energy: BinnedSeries::new("e_true", b)
                .with_title("True neutrino energy;E_true [GeV];Events"),
            calorimetric: BinnedSeries::new("e_cal", b)
                .with_title("Calorimetric reconstructed energy;E_cal [GeV];Events"),
            kinematic: BinnedSeries::new("e_qe", b)
                .with_title("Kinematic reconstructed energy;E_QE [GeV];Events"),
            response: BinnedSeries2D::new("response", b, b)
                .with_title("Response matrix;E_true [GeV];E_cal [GeV]"),
            skips: SkipCounts::default(),
        };
        Self { reconstructor: config.reconstructor, report }
    }

    /// Final report. `normalize` scales the spectra to unit area;
    /// `normalize_response` scales each true-energy column to unit sum.
    pub fn finish(mut self, normalize: bool, normalize_response: bool) -> EnergyReport {
        let r = &mut self.report;
        if normalize {
            r.true_energy.normalize();
            r.calorimetric.normalize();
            r.kinematic.normalize();
        }
        if normalize_response {
            r.response.normalize_columns();
        }
        self.report
    }
}

impl Accumulator for EnergyAccumulator {
    fn observe(&mut self, event: &EventRecord) {
        let r = &mut self.report;
        r.events += 1;
        let est = match self.reconstructor.reconstruct(event) {
            Ok(est) => est,
            Err(skip) => {
                r.skips.record(event.entry(), skip);
                return;
            }
        };
        r.cc_events += 1;

        let w = event.cross_section_weight();
        r.true_energy.fill(est.true_energy, w);
        r.calorimetric.fill(est.calorimetric, w);
        r.response.fill(est.true_energy, est.calorimetric, w);
        match est.kinematic {
            Ok(e_qe) => {
                r.kinematic.fill(e_qe, w);
            }
            Err(skip) => r.skips.record(event.entry(), skip),
        }
    }

    fn merge(&mut self, other: Self) -> Result<()> {
        let r = &mut self.report;
        let o = other.report;
        r.events += o.events;
        r.cc_events += o.cc_events;
        r.skips.merge(&o.skips);
        r.true_energy.merge(&o.true_energy)?;
        r.calorimetric.merge(&o.calorimetric)?;
        r.kinematic.merge(&o.kinematic)?;
        r.response.merge(&o.response)
    }
}

/// Reconstruct the energy of every CC event of `source`.
pub fn run_energy<S: EventSource + ?Sized>(
    source: &S,
    config: &AnalysisConfig,
) -> Result<EnergyReport> {
    tracing::info!(events = source.count(), "energy reconstruction");
    let acc = run_pass(source, config, || EnergyAccumulator::new(&config.energy))?;
    let report = acc.finish(config.normalize, config.energy.normalize_response);
    tracing::debug!(
        cc_events = report.cc_events,
        no_qe_solution = report.skips.undefined_kinematic_energy + report.skips.no_muon,
        "energy reconstruction done"
    );
    Ok(report)
}

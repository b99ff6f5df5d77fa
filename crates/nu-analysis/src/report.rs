//! All three event analyses in one pass, and report output.

use std::path::Path;

use nu_core::{EventRecord, EventSource, Result};
use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::energy::{EnergyAccumulator, EnergyReport};
use crate::kinematics::{KinematicsAccumulator, KinematicsReport};
use crate::oscillation::{OscillationAccumulator, OscillationReport};
use crate::pass::{Accumulator, run_pass};

/// Schema tag of [`EventReport`].
pub const EVENT_REPORT_SCHEMA: &str = "nusight_event_report_v0";

/// Kinematics, energy and oscillation output of one pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventReport {
    /// Always [`EVENT_REPORT_SCHEMA`].
    pub schema_version: String,
    /// Configuration the pass ran with.
    pub config: AnalysisConfig,
    /// Kinematics histograms.
    pub kinematics: KinematicsReport,
    /// Energy reconstruction.
    pub energy: EnergyReport,
    /// Oscillation weighting.
    pub oscillation: OscillationReport,
}

struct Combined {
    kinematics: KinematicsAccumulator,
    energy: EnergyAccumulator,
    oscillation: OscillationAccumulator,
}

impl Accumulator for Combined {
    fn observe(&mut self, event: &EventRecord) {
        self.kinematics.observe(event);
        self.energy.observe(event);
        self.oscillation.observe(event);
    }

    fn merge(&mut self, other: Self) -> Result<()> {
        self.kinematics.merge(other.kinematics)?;
        self.energy.merge(other.energy)?;
        self.oscillation.merge(other.oscillation)
    }
}

/// Run every event analysis over `source`, reading each event once.
pub fn run_all<S: EventSource + ?Sized>(
    source: &S,
    config: &AnalysisConfig,
) -> Result<EventReport> {
    tracing::info!(events = source.count(), threads = config.threads, "event analyses");
    let acc = run_pass(source, config, || Combined {
        kinematics: KinematicsAccumulator::new(&config.kinematics),
        energy: EnergyAccumulator::new(&config.energy),
        oscillation: OscillationAccumulator::new(&config.oscillation),
    })?;
    Ok(EventReport {
        schema_version: EVENT_REPORT_SCHEMA.to_string(),
        config: *config,
        kinematics: acc.kinematics.finish(config.normalize),
        energy: acc.energy.finish(config.normalize, config.energy.normalize_response),
        oscillation: acc.oscillation.finish(config.normalize),
    })
}

/// Write `report` as pretty-printed JSON.
pub fn write_json<T: Serialize + ?Sized>(report: &T, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let text = serde_json::to_string_pretty(report)?;
    std::fs::write(path, text)?;
    tracing::info!(path = %path.display(), "report written");
    Ok(())
}

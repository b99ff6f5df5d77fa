//! Neutrino energy by channel and lepton-side kinematic distributions.

use nu_core::{Channel, EventRecord, EventSource, Result};
use nu_hist::BinnedSeries;
use nu_physics::kinematics::event_kinematics;
use serde::Serialize;

use crate::config::{AnalysisConfig, KinematicsConfig};
use crate::pass::{Accumulator, SkipCounts, run_pass};

/// Schema tag of [`KinematicsReport`].
pub const KINEMATICS_SCHEMA: &str = "nusight_kinematics_v0";

/// Kinematics histograms of one run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KinematicsReport {
    /// Always [`KINEMATICS_SCHEMA`].
    pub schema_version: String,
    /// Events read.
    pub events: u64,
    /// Neutrino energy, all events.
    pub neutrino_energy: BinnedSeries,
    /// Neutrino energy per channel tag, in [`Channel::ALL`] order.
    pub neutrino_energy_by_channel: Vec<BinnedSeries>,
    /// Outgoing lepton energy.
    pub lepton_energy: BinnedSeries,
    /// Q².
    pub q2: BinnedSeries,
    /// |q|.
    pub q3: BinnedSeries,
    /// ω.
    pub omega: BinnedSeries,
    /// Bjorken x.
    pub bjorken_x: BinnedSeries,
    /// Bjorken y.
    pub bjorken_y: BinnedSeries,
    /// Events without lepton-side observables.
    pub skips: SkipCounts,
}

impl KinematicsReport {
    /// Neutrino energy for events tagged `channel`.
    pub fn channel(&self, channel: Channel) -> Option<&BinnedSeries> {
        let name = format!("enu_{}", channel.label());
        self.neutrino_energy_by_channel.iter().find(|h| h.name == name)
    }

    /// Every 1-D series of the report.
    pub fn series(&self) -> impl Iterator<Item = &BinnedSeries> {
        std::iter::once(&self.neutrino_energy)
            .chain(&self.neutrino_energy_by_channel)
            .chain([
                &self.lepton_energy,
                &self.q2,
                &self.q3,
                &self.omega,
                &self.bjorken_x,
                &self.bjorken_y,
            ])
    }

    fn series_mut(&mut self) -> impl Iterator<Item = &mut BinnedSeries> {
        std::iter::once(&mut self.neutrino_energy)
            .chain(&mut self.neutrino_energy_by_channel)
            .chain([
                &mut self.lepton_energy,
                &mut self.q2,
                &mut self.q3,
                &mut self.omega,
                &mut self.bjorken_x,
                &mut self.bjorken_y,
            ])
    }
}

/// Accumulator behind [`run_kinematics`].
#[derive(Debug, Clone)]
pub struct KinematicsAccumulator {
    weighted: bool,
    report: KinematicsReport,
}

impl KinematicsAccumulator {
    /// Empty histograms with the configured binnings.
    pub fn new(config: &KinematicsConfig) -> Self {
        let by_channel = Channel::ALL
            .iter()
            .map(|ch| {
                BinnedSeries::new(format!("enu_{}", ch.label()), config.neutrino_energy)
                    .with_title(format!("{};E_nu [GeV];Events", ch.label().to_uppercase()))
            })
            .collect();
        let report = KinematicsReport {
            schema_version: KINEMATICS_SCHEMA.to_string(),
            events: 0,
            neutrino_energy: BinnedSeries::new("enu_total", config.neutrino_energy)
                .with_title("Neutrino energy;E_nu [GeV];Events"),
            neutrino_energy_by_channel: by_channel,
            lepton_energy: BinnedSeries::new("e_lepton", config.lepton_energy)
                .with_title("Outgoing lepton energy;E_lep [GeV];Events"),
            q2: BinnedSeries::new("q2", config.q2)
                .with_title("Four-momentum transfer;Q^2 [GeV^2];Events"),
            q3: BinnedSeries::new("q3", config.q3)
                .with_title("Three-momentum transfer;|q| [GeV];Events"),
            omega: BinnedSeries::new("omega", config.omega)
                .with_title("Energy transfer;omega [GeV];Events"),
            bjorken_x: BinnedSeries::new("bjorken_x", config.bjorken_x)
                .with_title("Bjorken x;x;Events"),
            bjorken_y: BinnedSeries::new("bjorken_y", config.bjorken_y)
                .with_title("Bjorken y;y;Events"),
            skips: SkipCounts::default(),
        };
        Self { weighted: config.weighted, report }
    }

    /// Final report, unit-normalized on request.
    pub fn finish(mut self, normalize: bool) -> KinematicsReport {
        if normalize {
            for h in self.report.series_mut() {
                h.normalize();
            }
        }
        self.report
    }
}

impl Accumulator for KinematicsAccumulator {
    fn observe(&mut self, event: &EventRecord) {
        let r = &mut self.report;
        let w = if self.weighted { event.cross_section_weight() } else { 1.0 };
        let e_nu = event.neutrino().energy;
        r.events += 1;

        r.neutrino_energy.fill(e_nu, w);
        for (ch, h) in Channel::ALL.iter().zip(r.neutrino_energy_by_channel.iter_mut()) {
            if event.channel().has(*ch) {
                h.fill(e_nu, w);
            }
        }

        match event_kinematics(event) {
            Ok(k) => {
                r.lepton_energy.fill(k.lepton_energy, w);
                r.q2.fill(k.q2, w);
                r.q3.fill(k.q3, w);
                r.omega.fill(k.omega, w);
                r.bjorken_x.fill(k.bjorken_x, w);
                r.bjorken_y.fill(k.bjorken_y, w);
            }
            Err(skip) => r.skips.record(event.entry(), skip),
        }
    }

    fn merge(&mut self, other: Self) -> Result<()> {
        let r = &mut self.report;
        let o = other.report;
        r.events += o.events;
        r.skips.merge(&o.skips);
        for (a, b) in r.series_mut().zip(o.series()) {
            a.merge(b)?;
        }
        Ok(())
    }
}

/// Fill the kinematics histograms from every event of `source`.
pub fn run_kinematics<S: EventSource + ?Sized>(
    source: &S,
    config: &AnalysisConfig,
) -> Result<KinematicsReport> {
    tracing::info!(events = source.count(), "kinematics analysis");
    let acc = run_pass(source, config, || KinematicsAccumulator::new(&config.kinematics))?;
    let report = acc.finish(config.normalize);
    tracing::debug!(
        events = report.events,
        skipped = report.skips.total(),
        "kinematics analysis done"
    );
    Ok(report)
}

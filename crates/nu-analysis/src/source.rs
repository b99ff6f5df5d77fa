//! Event and cross-section sources.
//!
//! - [`MemoryEventSource`]: owned, already validated records
//! - [`ColumnarEvents`]: the converted-tree layout, one array per branch
//!   with jagged particle branches
//! - [`CurveTable`]: cross-section curves keyed by directory and channel

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use nu_core::units::natural_to_cm2;
use nu_core::{
    ChannelFlags, CrossSectionCurve, CrossSectionSource, Error, EventRecord, EventSource, Momentum,
    Neutrino, ParticleRecord, Result,
};
use serde::{Deserialize, Serialize};

use crate::config::WeightPolicy;

/// Branch names of the converted event tree.
pub mod branch {
    /// Neutrino PDG code.
    pub const NU_PDG: &str = "nupdg";
    /// Neutrino energy [GeV].
    pub const NU_E: &str = "nuE";
    /// Neutrino momentum x [GeV].
    pub const NU_PX: &str = "nuPx";
    /// Neutrino momentum y [GeV].
    pub const NU_PY: &str = "nuPy";
    /// Neutrino momentum z [GeV].
    pub const NU_PZ: &str = "nuPz";
    /// Event cross section [cm²].
    pub const XSECTION: &str = "xsection";
    /// Generator cross section [GeV⁻²], read when [`XSECTION`] is absent.
    pub const XSEC_NATURAL: &str = "xsec";
    /// Quasi-elastic flag.
    pub const IS_QE: &str = "IsQE";
    /// Resonant flag.
    pub const IS_RES: &str = "IsRES";
    /// Deep-inelastic flag.
    pub const IS_DIS: &str = "IsDIS";
    /// Coherent flag.
    pub const IS_COH: &str = "IsCoh";
    /// Meson-exchange-current flag.
    pub const IS_MEC: &str = "IsMEC";
    /// Charged-current flag.
    pub const IS_CC: &str = "IsCC";
    /// Neutral-current flag.
    pub const IS_NC: &str = "IsNC";

    /// Per-particle status code.
    pub const STATUS: &str = "status";
    /// Per-particle PDG code.
    pub const PDG: &str = "pdg";
    /// Per-particle energy [GeV].
    pub const ENERGY: &str = "energy";
    /// Per-particle momentum x [GeV].
    pub const PX: &str = "px";
    /// Per-particle momentum y [GeV].
    pub const PY: &str = "py";
    /// Per-particle momentum z [GeV].
    pub const PZ: &str = "pz";

    /// Event-level branches, all required.
    pub const EVENT: [&str; 13] = [
        NU_PDG, NU_E, NU_PX, NU_PY, NU_PZ, XSECTION, IS_QE, IS_RES, IS_DIS, IS_COH, IS_MEC, IS_CC,
        IS_NC,
    ];

    /// Particle-level (jagged) branches, all required.
    pub const PARTICLE: [&str; 6] = [STATUS, PDG, ENERGY, PX, PY, PZ];
}

/// Owned event records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryEventSource {
    events: Vec<EventRecord>,
}

impl MemoryEventSource {
    /// Wrap `events`.
    pub fn new(events: Vec<EventRecord>) -> Self {
        Self { events }
    }

    /// Records in source order.
    pub fn records(&self) -> &[EventRecord] {
        &self.events
    }
}

impl FromIterator<EventRecord> for MemoryEventSource {
    fn from_iter<I: IntoIterator<Item = EventRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl EventSource for MemoryEventSource {
    fn count(&self) -> usize {
        self.events.len()
    }

    fn get(&self, index: usize) -> Result<EventRecord> {
        self.events
            .get(index)
            .cloned()
            .ok_or(Error::OutOfRange { index, count: self.events.len() })
    }
}

/// Events decoded from flat event columns and jagged particle columns.
///
/// All columns are validated and the weight policy applied on
/// construction, so [`EventSource::get`] cannot fail for an in-range index.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnarEvents {
    neutrinos: Vec<Neutrino>,
    flags: Vec<ChannelFlags>,
    weights: Vec<f64>,
    particles: Vec<Vec<ParticleRecord>>,
    clamped: usize,
}

impl ColumnarEvents {
    /// Build from named columns.
    ///
    /// `event_columns` must contain every name in [`branch::EVENT`] with one
    /// value per event; `particle_columns` every name in
    /// [`branch::PARTICLE`] with one list per event, the six lists of an
    /// event having equal length. Integer and flag branches are carried as
    /// `f64`; flags are set when non-zero. Extra columns are ignored.
    ///
    /// Without an `xsection` column, a raw generator `xsec` column in GeV⁻²
    /// is accepted and converted to cm².
    pub fn from_columns(
        event_columns: impl IntoIterator<Item = (String, Vec<f64>)>,
        particle_columns: impl IntoIterator<Item = (String, Vec<Vec<f64>>)>,
        policy: WeightPolicy,
    ) -> Result<Self> {
        let mut event: HashMap<String, Vec<f64>> = event_columns.into_iter().collect();
        let mut jagged: HashMap<String, Vec<Vec<f64>>> = particle_columns.into_iter().collect();

        let mut cols = Vec::with_capacity(branch::EVENT.len());
        let mut n_events: Option<usize> = None;
        for name in branch::EVENT {
            let col = match event.remove(name) {
                Some(col) => col,
                None if name == branch::XSECTION => natural_xsec(&mut event)?,
                None => return Err(Error::MissingColumn(name.to_string())),
            };
            check_length(name, col.len(), &mut n_events)?;
            cols.push(col);
        }
        let mut pcols = Vec::with_capacity(branch::PARTICLE.len());
        for name in branch::PARTICLE {
            let col = jagged.remove(name).ok_or_else(|| Error::MissingColumn(name.to_string()))?;
            check_length(name, col.len(), &mut n_events)?;
            pcols.push(col);
        }
        if !event.is_empty() || !jagged.is_empty() {
            tracing::trace!(
                ignored = event.len() + jagged.len(),
                "extra columns ignored by the event decoder"
            );
        }
        let n = n_events.unwrap_or(0);

        let [nu_pdg, nu_e, nu_px, nu_py, nu_pz, xsec, qe, res, dis, coh, mec, cc, nc] =
            cols.as_slice()
        else {
            return Err(Error::Validation("event column set incomplete".into()));
        };
        let [status, pdg, energy, px, py, pz] = pcols.as_slice() else {
            return Err(Error::Validation("particle column set incomplete".into()));
        };

        let mut neutrinos = Vec::with_capacity(n);
        let mut flags = Vec::with_capacity(n);
        let mut weights = Vec::with_capacity(n);
        let mut particles = Vec::with_capacity(n);
        let mut clamped = 0usize;

        for i in 0..n {
            neutrinos.push(Neutrino {
                pdg: integer(branch::NU_PDG, i, nu_pdg[i])?,
                energy: nu_e[i],
                momentum: Momentum::new(nu_px[i], nu_py[i], nu_pz[i]),
            });
            flags.push(ChannelFlags {
                qe: qe[i] != 0.0,
                res: res[i] != 0.0,
                dis: dis[i] != 0.0,
                mec: mec[i] != 0.0,
                coh: coh[i] != 0.0,
                cc: cc[i] != 0.0,
                nc: nc[i] != 0.0,
            });

            let (w, was_clamped) = policy.apply(i, xsec[i])?;
            clamped += usize::from(was_clamped);
            weights.push(w);

            let np = status[i].len();
            for (name, col) in branch::PARTICLE.iter().zip(&pcols).skip(1) {
                if col[i].len() != np {
                    return Err(Error::Validation(format!(
                        "particle column '{name}' has {} entries for event {i}, '{}' has {np}",
                        col[i].len(),
                        branch::STATUS
                    )));
                }
            }
            let list = (0..np)
                .map(|j| {
                    Ok(ParticleRecord {
                        pdg: integer(branch::PDG, i, pdg[i][j])?,
                        status: integer(branch::STATUS, i, status[i][j])?,
                        energy: energy[i][j],
                        momentum: Momentum::new(px[i][j], py[i][j], pz[i][j]),
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            particles.push(list);
        }

        if clamped > 0 {
            tracing::warn!(clamped, events = n, "clamped invalid cross-section weights to zero");
        }
        tracing::debug!(events = n, "decoded columnar events");
        Ok(Self { neutrinos, flags, weights, particles, clamped })
    }

    /// Events whose weight was clamped to zero at ingestion.
    pub fn clamped(&self) -> usize {
        self.clamped
    }
}

fn natural_xsec(event: &mut HashMap<String, Vec<f64>>) -> Result<Vec<f64>> {
    let raw = event
        .remove(branch::XSEC_NATURAL)
        .ok_or_else(|| Error::MissingColumn(branch::XSECTION.to_string()))?;
    tracing::debug!(events = raw.len(), "converting generator cross sections to cm²");
    Ok(raw.into_iter().map(natural_to_cm2).collect())
}

fn check_length(name: &str, len: usize, expected: &mut Option<usize>) -> Result<()> {
    match *expected {
        Some(n) if n != len => Err(Error::Validation(format!(
            "column length mismatch for '{name}': expected {n}, got {len}"
        ))),
        Some(_) => Ok(()),
        None => {
            *expected = Some(len);
            Ok(())
        }
    }
}

fn integer(name: &str, event: usize, v: f64) -> Result<i32> {
    if v.fract() != 0.0 || v < f64::from(i32::MIN) || v > f64::from(i32::MAX) {
        return Err(Error::Validation(format!(
            "column '{name}' holds non-integer value {v} at event {event}"
        )));
    }
    Ok(v as i32)
}

impl EventSource for ColumnarEvents {
    fn count(&self) -> usize {
        self.neutrinos.len()
    }

    fn get(&self, index: usize) -> Result<EventRecord> {
        let count = self.count();
        let neutrino = *self.neutrinos.get(index).ok_or(Error::OutOfRange { index, count })?;
        EventRecord::new(
            index,
            neutrino,
            self.flags[index],
            self.weights[index],
            self.particles[index].clone(),
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawCurve {
    x: Vec<f64>,
    y: Vec<f64>,
}

type RawTable = BTreeMap<String, BTreeMap<String, RawCurve>>;

/// In-memory cross-section curves, `directory → channel → curve`.
///
/// Serialized as nested maps of `{x, y}` arrays:
///
/// ```json
/// { "nu_mu_Ar40": { "qel_cc_n": { "x": [0.5, 1.0], "y": [1.2e-38, 2.1e-38] } } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTable", into = "RawTable")]
pub struct CurveTable {
    directories: BTreeMap<String, BTreeMap<String, CrossSectionCurve>>,
}

impl TryFrom<RawTable> for CurveTable {
    type Error = Error;

    fn try_from(raw: RawTable) -> Result<Self> {
        let mut table = CurveTable::new();
        for (dir, curves) in raw {
            for (name, c) in curves {
                table.insert(&dir, CrossSectionCurve::new(name, c.x, c.y)?);
            }
        }
        Ok(table)
    }
}

impl From<CurveTable> for RawTable {
    fn from(table: CurveTable) -> Self {
        table
            .directories
            .into_iter()
            .map(|(dir, curves)| {
                let curves =
                    curves.into_iter().map(|(n, c)| (n, RawCurve { x: c.x, y: c.y })).collect();
                (dir, curves)
            })
            .collect()
    }
}

impl CurveTable {
    /// Empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `curve` under `directory`, keyed by its name.
    pub fn insert(&mut self, directory: &str, curve: CrossSectionCurve) {
        let curves = self.directories.entry(directory.to_string()).or_default();
        curves.insert(curve.name.clone(), curve);
    }

    /// Load from a JSON or YAML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let table: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_slice(&bytes)?,
            _ => serde_yaml_ng::from_slice(&bytes)?,
        };
        tracing::debug!(
            path = %path.display(),
            directories = table.directories.len(),
            "loaded curve table"
        );
        Ok(table)
    }
}

impl CrossSectionSource for CurveTable {
    fn directories(&self) -> Vec<String> {
        self.directories.keys().cloned().collect()
    }

    fn curve(&self, directory: &str, channel: &str) -> Result<CrossSectionCurve> {
        let curves = self
            .directories
            .get(directory)
            .ok_or_else(|| Error::Validation(format!("unknown directory '{directory}'")))?;
        curves
            .get(channel)
            .cloned()
            .ok_or_else(|| Error::MissingColumn(format!("{directory}/{channel}")))
    }
}

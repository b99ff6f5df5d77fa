//! Common data types for NuSight

use serde::{Deserialize, Serialize};

use crate::pdg;
use crate::{Error, Result};

/// Three-momentum in GeV.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Momentum {
    /// x component.
    pub px: f64,
    /// y component.
    pub py: f64,
    /// z component (beam axis).
    pub pz: f64,
}

impl Momentum {
    /// Create a momentum vector.
    pub const fn new(px: f64, py: f64, pz: f64) -> Self {
        Self { px, py, pz }
    }

    /// Euclidean magnitude.
    #[inline]
    pub fn magnitude(&self) -> f64 {
        (self.px * self.px + self.py * self.py + self.pz * self.pz).sqrt()
    }

    /// Cosine of the angle to the beam (z) axis. `None` for a null vector.
    #[inline]
    pub fn cos_theta(&self) -> Option<f64> {
        let p = self.magnitude();
        if p > 0.0 { Some(self.pz / p) } else { None }
    }
}

impl std::ops::Sub for Momentum {
    type Output = Momentum;

    fn sub(self, rhs: Momentum) -> Momentum {
        Momentum { px: self.px - rhs.px, py: self.py - rhs.py, pz: self.pz - rhs.pz }
    }
}

/// Incoming neutrino state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neutrino {
    /// PDG code (14 = νμ, -14 = ν̄μ, ...).
    pub pdg: i32,
    /// Energy [GeV].
    pub energy: f64,
    /// Three-momentum [GeV].
    pub momentum: Momentum,
}

impl Neutrino {
    /// Neutrino travelling along +z with `|p| = E`.
    pub fn along_beam(pdg: i32, energy: f64) -> Self {
        Self { pdg, energy, momentum: Momentum::new(0.0, 0.0, energy) }
    }

    /// `true` for νμ and ν̄μ.
    pub fn is_muon_flavor(&self) -> bool {
        self.pdg.abs() == pdg::NU_MU
    }
}

/// One entry of the generator particle list.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParticleRecord {
    /// Signed PDG code.
    pub pdg: i32,
    /// Generator status; `1` marks final-state particles.
    pub status: i32,
    /// Energy [GeV].
    pub energy: f64,
    /// Three-momentum [GeV].
    pub momentum: Momentum,
}

impl ParticleRecord {
    /// Final-state particle.
    pub fn final_state(pdg: i32, energy: f64, momentum: Momentum) -> Self {
        Self { pdg, status: pdg::STATUS_FINAL_STATE, energy, momentum }
    }

    /// `status == 1`.
    #[inline]
    pub fn is_final_state(&self) -> bool {
        self.status == pdg::STATUS_FINAL_STATE
    }
}

/// Hadronic interaction channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Channel {
    /// Quasi-elastic.
    Qe,
    /// Resonant pion production.
    Res,
    /// Deep-inelastic scattering.
    Dis,
    /// Meson-exchange current (2p2h).
    Mec,
    /// Coherent pion production.
    Coherent,
}

impl Channel {
    /// All channels, in reporting order.
    pub const ALL: [Channel; 5] =
        [Channel::Qe, Channel::Res, Channel::Dis, Channel::Mec, Channel::Coherent];

    /// Short lowercase label.
    pub fn label(self) -> &'static str {
        match self {
            Channel::Qe => "qe",
            Channel::Res => "res",
            Channel::Dis => "dis",
            Channel::Mec => "mec",
            Channel::Coherent => "coh",
        }
    }
}

/// Weak current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Current {
    /// Charged current.
    Cc,
    /// Neutral current.
    Nc,
}

/// Interaction-channel tags of one event.
///
/// The generator sets one hadronic channel and one current, but nothing
/// enforces it; each tag is stored independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelFlags {
    /// Quasi-elastic.
    pub qe: bool,
    /// Resonant.
    pub res: bool,
    /// Deep-inelastic.
    pub dis: bool,
    /// Meson-exchange current.
    pub mec: bool,
    /// Coherent.
    pub coh: bool,
    /// Charged current.
    pub cc: bool,
    /// Neutral current.
    pub nc: bool,
}

impl ChannelFlags {
    /// Flags with a single channel and current set.
    pub fn new(channel: Channel, current: Current) -> Self {
        Self::default().with_channel(channel).with_current(current)
    }

    /// Set a channel tag.
    pub fn with_channel(mut self, channel: Channel) -> Self {
        match channel {
            Channel::Qe => self.qe = true,
            Channel::Res => self.res = true,
            Channel::Dis => self.dis = true,
            Channel::Mec => self.mec = true,
            Channel::Coherent => self.coh = true,
        }
        self
    }

    /// Set a current tag.
    pub fn with_current(mut self, current: Current) -> Self {
        match current {
            Current::Cc => self.cc = true,
            Current::Nc => self.nc = true,
        }
        self
    }

    /// Whether `channel` is tagged.
    pub fn has(&self, channel: Channel) -> bool {
        match channel {
            Channel::Qe => self.qe,
            Channel::Res => self.res,
            Channel::Dis => self.dis,
            Channel::Mec => self.mec,
            Channel::Coherent => self.coh,
        }
    }

    /// Charged-current tag.
    pub fn is_cc(&self) -> bool {
        self.cc
    }

    /// Neutral-current tag.
    pub fn is_nc(&self) -> bool {
        self.nc
    }
}

/// One simulated interaction.
///
/// Immutable once built; the weight is validated on construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawEventRecord")]
pub struct EventRecord {
    entry: usize,
    neutrino: Neutrino,
    channel: ChannelFlags,
    cross_section_weight: f64,
    particles: Vec<ParticleRecord>,
}

#[derive(Deserialize)]
struct RawEventRecord {
    entry: usize,
    neutrino: Neutrino,
    channel: ChannelFlags,
    cross_section_weight: f64,
    particles: Vec<ParticleRecord>,
}

impl TryFrom<RawEventRecord> for EventRecord {
    type Error = Error;

    fn try_from(raw: RawEventRecord) -> Result<Self> {
        EventRecord::new(
            raw.entry,
            raw.neutrino,
            raw.channel,
            raw.cross_section_weight,
            raw.particles,
        )
    }
}

impl EventRecord {
    /// Build a record for source entry `entry`.
    ///
    /// Fails with [`Error::InvalidWeight`] if the weight is negative or not
    /// finite.
    pub fn new(
        entry: usize,
        neutrino: Neutrino,
        channel: ChannelFlags,
        cross_section_weight: f64,
        particles: Vec<ParticleRecord>,
    ) -> Result<Self> {
        if !cross_section_weight.is_finite() || cross_section_weight < 0.0 {
            return Err(Error::InvalidWeight { index: entry, weight: cross_section_weight });
        }
        Ok(Self { entry, neutrino, channel, cross_section_weight, particles })
    }

    /// Entry number in the originating source.
    pub fn entry(&self) -> usize {
        self.entry
    }

    /// Incoming neutrino.
    pub fn neutrino(&self) -> &Neutrino {
        &self.neutrino
    }

    /// Channel tags.
    pub fn channel(&self) -> &ChannelFlags {
        &self.channel
    }

    /// Per-event cross-section weight [cm²], never negative.
    pub fn cross_section_weight(&self) -> f64 {
        self.cross_section_weight
    }

    /// Particle list in generation order.
    pub fn particles(&self) -> &[ParticleRecord] {
        &self.particles
    }

    /// Final-state particles in generation order.
    pub fn final_state(&self) -> impl Iterator<Item = &ParticleRecord> {
        self.particles.iter().filter(|p| p.is_final_state())
    }
}

/// Tabulated cross-section curve: `(energy, value)` samples.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossSectionCurve {
    /// Curve name (channel label or composite name).
    pub name: String,
    /// Energies [GeV].
    pub x: Vec<f64>,
    /// Values at each energy.
    pub y: Vec<f64>,
}

impl CrossSectionCurve {
    /// Create a curve, checking `x`/`y` lengths and that every energy is finite.
    pub fn new(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        let name = name.into();
        if x.len() != y.len() {
            return Err(Error::Validation(format!(
                "curve '{name}': x/y length mismatch ({} vs {})",
                x.len(),
                y.len()
            )));
        }
        if let Some(bad) = x.iter().find(|v| !v.is_finite()) {
            return Err(Error::Validation(format!("curve '{name}': non-finite energy {bad}")));
        }
        Ok(Self { name, x, y })
    }

    /// Build from `(x, y)` points.
    pub fn from_points(name: impl Into<String>, points: &[(f64, f64)]) -> Result<Self> {
        let (x, y) = points.iter().copied().unzip();
        Self::new(name, x, y)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// `true` if there are no samples.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Iterate `(x, y)` pairs.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.x.iter().copied().zip(self.y.iter().copied())
    }
}

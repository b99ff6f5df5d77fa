//! Analysis configuration.
//!
//! One document configures every analysis. Every field has a default, so a
//! file only needs the settings it changes. YAML and JSON are both read.
//!
//! ```yaml
//! threads: 0
//! normalize: true
//! weight_policy: clamp_to_zero
//! energy:
//!   binning: { n_bins: 40, min: 0.0, max: 4.0 }
//! oscillation:
//!   engine:
//!     baseline_km: 1300.0
//!     medium: { density: 2.8, electron_fraction: 0.5 }
//! ```

use std::path::Path;

use nu_core::{Error, Result};
use nu_hist::Binning;
use nu_physics::{EnergyReconstructor, OscillationEngine};
use serde::{Deserialize, Serialize};

const ENERGY_AXIS: Binning = Binning::from_const(50, 0.0, 5.0);
const BEAM_AXIS: Binning = Binning::from_const(50, 0.0, 10.0);
const UNIT_AXIS: Binning = Binning::from_const(50, 0.0, 1.0);
const OSCILLATION_AXIS: Binning = Binning::from_const(100, 0.0, 5.0);

/// Handling of a negative or non-finite cross-section weight at ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightPolicy {
    /// Abort with [`Error::InvalidWeight`].
    #[default]
    Reject,
    /// Store a weight of zero and count the event as clamped.
    ClampToZero,
}

impl WeightPolicy {
    /// Weight to store for event `index`, and whether it was clamped.
    pub fn apply(self, index: usize, weight: f64) -> Result<(f64, bool)> {
        if weight.is_finite() && weight >= 0.0 {
            return Ok((weight, false));
        }
        match self {
            WeightPolicy::Reject => Err(Error::InvalidWeight { index, weight }),
            WeightPolicy::ClampToZero => Ok((0.0, true)),
        }
    }
}

/// Binnings of the kinematics analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KinematicsConfig {
    /// Neutrino energy, total and per channel [GeV].
    pub neutrino_energy: Binning,
    /// Outgoing lepton energy [GeV].
    pub lepton_energy: Binning,
    /// Q² [GeV²].
    pub q2: Binning,
    /// |q| [GeV].
    pub q3: Binning,
    /// ω [GeV].
    pub omega: Binning,
    /// Bjorken x.
    pub bjorken_x: Binning,
    /// Inelasticity y.
    pub bjorken_y: Binning,
    /// Fill with the event cross-section weight instead of unit weight.
    pub weighted: bool,
}

impl Default for KinematicsConfig {
    fn default() -> Self {
        Self {
            neutrino_energy: BEAM_AXIS,
            lepton_energy: BEAM_AXIS,
            q2: ENERGY_AXIS,
            q3: ENERGY_AXIS,
            omega: ENERGY_AXIS,
            bjorken_x: UNIT_AXIS,
            bjorken_y: UNIT_AXIS,
            weighted: false,
        }
    }
}

/// Energy reconstruction analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    /// Shared by the three spectra and both axes of the response.
    pub binning: Binning,
    /// Estimator settings.
    pub reconstructor: EnergyReconstructor,
    /// Normalize every true-energy column of the response to unit sum.
    pub normalize_response: bool,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            binning: ENERGY_AXIS,
            reconstructor: EnergyReconstructor::default(),
            normalize_response: false,
        }
    }
}

/// Oscillation weighting analysis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillationConfig {
    /// Neutrino energy binning.
    pub binning: Binning,
    /// Mixing parameters, baseline and medium.
    pub engine: OscillationEngine,
}

impl Default for OscillationConfig {
    fn default() -> Self {
        Self { binning: OSCILLATION_AXIS, engine: OscillationEngine::default() }
    }
}

/// Top-level configuration shared by all analyses.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Kinematics analysis.
    pub kinematics: KinematicsConfig,
    /// Energy reconstruction analysis.
    pub energy: EnergyConfig,
    /// Oscillation weighting analysis.
    pub oscillation: OscillationConfig,
    /// Normalize every 1-D output to unit area.
    pub normalize: bool,
    /// Ingestion weight policy.
    pub weight_policy: WeightPolicy,
    /// Worker threads: `1` runs sequentially, `0` uses the global rayon pool.
    pub threads: usize,
    /// Events per parallel work item.
    pub chunk_size: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            kinematics: KinematicsConfig::default(),
            energy: EnergyConfig::default(),
            oscillation: OscillationConfig::default(),
            normalize: false,
            weight_policy: WeightPolicy::Reject,
            threads: 1,
            chunk_size: 4096,
        }
    }
}

impl AnalysisConfig {
    /// Default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a YAML or JSON file and validate.
    ///
    /// `.json` files go through `serde_json`; anything else is parsed as
    /// YAML, which also accepts JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let cfg: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_slice(&bytes)?,
            _ => serde_yaml_ng::from_slice(&bytes)?,
        };
        tracing::debug!(path = %path.display(), threads = cfg.threads, "loaded analysis config");
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse YAML text and validate.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let cfg: Self = serde_yaml_ng::from_str(text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check settings that the field types alone do not constrain.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::Validation("chunk_size must be positive".into()));
        }
        let engine = &self.oscillation.engine;
        if !engine.baseline_km.is_finite() || engine.baseline_km < 0.0 {
            return Err(Error::Validation(format!(
                "baseline must be finite and non-negative, got {}",
                engine.baseline_km
            )));
        }
        if !engine.medium.density.is_finite() || engine.medium.density < 0.0 {
            return Err(Error::Validation(format!(
                "matter density must be finite and non-negative, got {}",
                engine.medium.density
            )));
        }
        if engine.params.dm31_sq == 0.0 || !engine.params.dm31_sq.is_finite() {
            return Err(Error::Validation("dm31_sq must be finite and non-zero".into()));
        }
        let reco = &self.energy.reconstructor;
        if reco.max_kinematic_energy.is_nan() || reco.max_kinematic_energy <= 0.0 {
            return Err(Error::Validation(format!(
                "max_kinematic_energy must be positive, got {}",
                reco.max_kinematic_energy
            )));
        }
        Ok(())
    }

    /// Set the worker thread count.
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set the parallel chunk size.
    pub fn chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Normalize 1-D outputs to unit area.
    pub fn normalize(mut self, normalize: bool) -> Self {
        self.normalize = normalize;
        self
    }

    /// Set the ingestion weight policy.
    pub fn weight_policy(mut self, policy: WeightPolicy) -> Self {
        self.weight_policy = policy;
        self
    }

    /// Set the energy binning.
    pub fn energy_binning(mut self, binning: Binning) -> Self {
        self.energy.binning = binning;
        self
    }

    /// Set the energy estimator settings.
    pub fn reconstructor(mut self, reconstructor: EnergyReconstructor) -> Self {
        self.energy.reconstructor = reconstructor;
        self
    }

    /// Set the oscillation binning.
    pub fn oscillation_binning(mut self, binning: Binning) -> Self {
        self.oscillation.binning = binning;
        self
    }

    /// Set the oscillation engine.
    pub fn oscillation_engine(mut self, engine: OscillationEngine) -> Self {
        self.oscillation.engine = engine;
        self
    }

    /// Fill kinematics with cross-section weights.
    pub fn weighted_kinematics(mut self, weighted: bool) -> Self {
        self.kinematics.weighted = weighted;
        self
    }
}

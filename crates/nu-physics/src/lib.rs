//! # nu-physics
//!
//! Pure per-event derivations and the cross-section aggregator.
//!
//! - [`kinematics`]: Q², q3, ω and Bjorken x, y from the outgoing lepton
//! - [`energy`]: true, calorimetric and quasi-elastic energy estimators
//! - [`oscillation`]: two-flavor νμ survival/appearance, vacuum and matter
//! - [`xsec`]: per-channel cross-section curves combined into CC/NC composites
//!
//! Per-event conditions that make a quantity undefined (no lepton, no
//! muon, an unstable quasi-elastic solution) are returned as a [`Skip`],
//! never as an error: the caller drops that one contribution and moves on.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod energy;
pub mod kinematics;
pub mod oscillation;
pub mod xsec;

use serde::Serialize;
use thiserror::Error;

pub use energy::{EnergyEstimates, EnergyReconstructor, QeConstants};
pub use kinematics::{Kinematics, NUCLEON_MASS_GEV};
pub use oscillation::{EffectiveMixing, Medium, OscillationEngine, OscillationParams, Probabilities};
pub use xsec::{FamilyCurves, XsecAggregator, XsecFamily, XsecSummary, parse_mass_number};

/// Why a per-event quantity was not derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize)]
pub enum Skip {
    /// No final-state electron or muon.
    #[error("no final-state charged lepton")]
    MissingLepton,
    /// No final-state muon for the quasi-elastic formula.
    #[error("no final-state muon")]
    NoMuon,
    /// Quasi-elastic solution unstable or outside the plausible range.
    #[error("quasi-elastic energy undefined")]
    UndefinedKinematicEnergy,
    /// Event not tagged charged-current.
    #[error("not a charged-current event")]
    NotChargedCurrent,
    /// Incoming neutrino is not νμ/ν̄μ.
    #[error("not a muon neutrino")]
    NotMuonNeutrino,
    /// Incoming neutrino energy is zero or negative.
    #[error("non-positive neutrino energy")]
    NonPositiveEnergy,
}

/// Outcome of a per-event derivation.
pub type Derived<T> = std::result::Result<T, Skip>;

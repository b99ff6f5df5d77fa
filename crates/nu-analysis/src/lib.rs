//! # nu-analysis
//!
//! Configurable analysis passes over neutrino interaction events and
//! cross-section tables.
//!
//! Every event analysis is an [`Accumulator`] driven by [`run_pass`], which
//! runs sequentially or shards the event range over rayon workers and
//! merges their histograms. Outputs are plain `Serialize` reports tagged
//! with a `schema_version`.
//!
//! ```
//! use nu_analysis::{AnalysisConfig, MemoryEventSource, run_all};
//! use nu_core::{Channel, ChannelFlags, Current, EventRecord, Momentum, Neutrino, ParticleRecord};
//!
//! let muon = ParticleRecord::final_state(13, 1.5, Momentum::new(0.0, 0.0, 1.4));
//! let event = EventRecord::new(
//!     0,
//!     Neutrino::along_beam(14, 2.0),
//!     ChannelFlags::new(Channel::Qe, Current::Cc),
//!     1.0e-38,
//!     vec![muon],
//! )?;
//! let source = MemoryEventSource::new(vec![event]);
//! let report = run_all(&source, &AnalysisConfig::new())?;
//! assert_eq!(report.kinematics.events, 1);
//! # Ok::<(), nu_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod energy;
pub mod kinematics;
pub mod oscillation;
pub mod pass;
pub mod report;
pub mod source;
pub mod xsec;

pub use config::{AnalysisConfig, EnergyConfig, KinematicsConfig, OscillationConfig, WeightPolicy};
pub use energy::{EnergyReport, run_energy};
pub use kinematics::{KinematicsReport, run_kinematics};
pub use oscillation::{OscillationReport, run_oscillation};
pub use pass::{Accumulator, SkipCounts, run_pass};
pub use report::{EventReport, run_all, write_json};
pub use source::{ColumnarEvents, CurveTable, MemoryEventSource};
pub use xsec::{XsecReport, run_xsec};

//! # nu-core
//!
//! Core types for NuSight: the simulated interaction record, the PDG particle
//! table, the shared error type, and the traits through which event and
//! cross-section data reach the analysis engines.
//!
//! Nothing here touches a storage format. Decoding generator output into
//! [`EventRecord`] values is the job of whatever implements [`EventSource`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod pdg;
pub mod traits;
pub mod types;
pub mod units;

pub use error::{Error, Result};
pub use traits::{CrossSectionSource, EventSource};
pub use types::{
    Channel, ChannelFlags, CrossSectionCurve, Current, EventRecord, Momentum, Neutrino,
    ParticleRecord,
};

//! # nu-hist
//!
//! Fixed-range, fixed-bin-count weighted accumulators.
//!
//! Every analysis in NuSight writes into these. A series is created once per
//! run, filled event by event, and may be merged with a series of identical
//! binning produced by another worker.
//!
//! ```
//! use nu_hist::{BinnedSeries, Binning};
//!
//! let mut h = BinnedSeries::new("e_true", Binning::new(50, 0.0, 5.0).unwrap());
//! h.fill(1.23, 2.0);
//! h.fill(7.0, 1.0); // out of range: dropped
//! assert_eq!(h.integral(), 2.0);
//! h.normalize();
//! assert!((h.integral() - 1.0).abs() < 1e-12);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod binning;
pub mod series;
pub mod series2d;

pub use binning::Binning;
pub use series::{Bin, BinnedSeries};
pub use series2d::BinnedSeries2D;

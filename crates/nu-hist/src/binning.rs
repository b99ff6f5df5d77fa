//! Uniform axis binning.

use nu_core::{Error, Result};
use serde::{Deserialize, Serialize};

/// `n_bins` equal-width bins covering `[min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBinning")]
pub struct Binning {
    n_bins: usize,
    min: f64,
    max: f64,
}

#[derive(Deserialize)]
struct RawBinning {
    n_bins: usize,
    min: f64,
    max: f64,
}

impl TryFrom<RawBinning> for Binning {
    type Error = Error;

    fn try_from(raw: RawBinning) -> Result<Self> {
        Binning::new(raw.n_bins, raw.min, raw.max)
    }
}

impl Binning {
    /// Create a binning; requires `n_bins > 0` and finite `min < max`.
    pub fn new(n_bins: usize, min: f64, max: f64) -> Result<Self> {
        if n_bins == 0 {
            return Err(Error::Validation("binning requires at least one bin".into()));
        }
        if !min.is_finite() || !max.is_finite() || min >= max {
            return Err(Error::Validation(format!(
                "invalid binning range: expected finite min < max, got ({min}, {max})"
            )));
        }
        Ok(Self { n_bins, min, max })
    }

    /// Binning for `const` items. An invalid range fails constant evaluation.
    ///
    /// # Panics
    ///
    /// Panics when called at runtime with `n_bins == 0` or a range that
    /// [`Binning::new`] would reject. Use [`Binning::new`] for runtime input.
    pub const fn from_const(n_bins: usize, min: f64, max: f64) -> Self {
        assert!(n_bins > 0, "binning requires at least one bin");
        assert!(min.is_finite() && max.is_finite() && min < max, "invalid binning range");
        Self { n_bins, min, max }
    }

    /// Number of bins.
    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    /// Lower edge of the first bin.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper edge of the last bin.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Common bin width.
    pub fn width(&self) -> f64 {
        (self.max - self.min) / self.n_bins as f64
    }

    /// Lower edge of bin `i` (`i == n_bins` gives `max`).
    ///
    /// Nominal edges such as `1.2` on a `[0, 5)` axis come out exact.
    pub fn edge(&self, i: usize) -> f64 {
        if i >= self.n_bins {
            self.max
        } else {
            self.min + (self.max - self.min) * i as f64 / self.n_bins as f64
        }
    }

    /// All `n_bins + 1` edges.
    pub fn edges(&self) -> Vec<f64> {
        (0..=self.n_bins).map(|i| self.edge(i)).collect()
    }

    /// Bin centers.
    pub fn centers(&self) -> Vec<f64> {
        let n = self.n_bins as f64;
        (0..self.n_bins).map(|i| self.min + (self.max - self.min) * (i as f64 + 0.5) / n).collect()
    }

    /// Bin index containing `val`.
    ///
    /// Returns `None` outside `[min, max)` and for NaN.
    pub fn find_bin(&self, val: f64) -> Option<usize> {
        if val.is_nan() || val < self.min || val >= self.max {
            return None;
        }
        let mut i = ((val - self.min) * self.n_bins as f64 / (self.max - self.min)) as usize;
        if i >= self.n_bins {
            i = self.n_bins - 1;
        }
        // Arithmetic index can be off by one on an edge; settle against the edges.
        if val < self.edge(i) {
            i -= 1;
        } else if i + 1 < self.n_bins && val >= self.edge(i + 1) {
            i += 1;
        }
        Some(i)
    }
}

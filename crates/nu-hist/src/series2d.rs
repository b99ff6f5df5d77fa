//! Two-dimensional weighted accumulator (response matrices).

use nu_core::{Error, Result};
use serde::Serialize;

use crate::binning::Binning;

/// Weighted 2-D histogram, row-major over `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinnedSeries2D {
    /// Histogram name.
    pub name: String,
    /// Free-form title.
    pub title: String,
    x_binning: Binning,
    y_binning: Binning,
    /// `bin_content[ix * ny + iy]`
    bin_content: Vec<f64>,
    entries: u64,
    dropped: u64,
}

impl BinnedSeries2D {
    /// Empty 2-D series.
    pub fn new(name: impl Into<String>, x_binning: Binning, y_binning: Binning) -> Self {
        Self {
            name: name.into(),
            title: String::new(),
            x_binning,
            y_binning,
            bin_content: vec![0.0; x_binning.n_bins() * y_binning.n_bins()],
            entries: 0,
            dropped: 0,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Add `weight` at `(x, y)`; dropped if either coordinate is out of range.
    pub fn fill(&mut self, x: f64, y: f64, weight: f64) -> bool {
        match (self.x_binning.find_bin(x), self.y_binning.find_bin(y)) {
            (Some(ix), Some(iy)) => {
                self.bin_content[ix * self.y_binning.n_bins() + iy] += weight;
                self.entries += 1;
                true
            }
            _ => {
                self.dropped += 1;
                false
            }
        }
    }

    /// Content of bin `(ix, iy)`.
    pub fn get(&self, ix: usize, iy: usize) -> Option<f64> {
        if ix >= self.x_binning.n_bins() || iy >= self.y_binning.n_bins() {
            return None;
        }
        Some(self.bin_content[ix * self.y_binning.n_bins() + iy])
    }

    /// Sum of all bins.
    pub fn integral(&self) -> f64 {
        self.bin_content.iter().sum()
    }

    /// Multiply every bin by `factor`.
    pub fn scale(&mut self, factor: f64) {
        self.bin_content.iter_mut().for_each(|c| *c *= factor);
    }

    /// Scale to unit integral; no-op for a non-positive integral.
    pub fn normalize(&mut self) -> bool {
        let total = self.integral();
        if total > 0.0 {
            self.scale(1.0 / total);
            true
        } else {
            false
        }
    }

    /// Normalize each x column so its y distribution sums to one.
    ///
    /// Gives P(reco | true) when x is the true quantity. Empty columns stay
    /// zero.
    pub fn normalize_columns(&mut self) {
        let ny = self.y_binning.n_bins();
        for col in self.bin_content.chunks_mut(ny) {
            let s: f64 = col.iter().sum();
            if s > 0.0 {
                col.iter_mut().for_each(|c| *c /= s);
            }
        }
    }

    /// Add `other` bin by bin. Both binnings must match.
    pub fn merge(&mut self, other: &BinnedSeries2D) -> Result<()> {
        if self.x_binning != other.x_binning || self.y_binning != other.y_binning {
            return Err(Error::Validation(format!(
                "cannot merge '{}' into '{}': binning mismatch",
                other.name, self.name
            )));
        }
        for (a, b) in self.bin_content.iter_mut().zip(&other.bin_content) {
            *a += b;
        }
        self.entries += other.entries;
        self.dropped += other.dropped;
        Ok(())
    }

    /// x-axis binning.
    pub fn x_binning(&self) -> &Binning {
        &self.x_binning
    }

    /// y-axis binning.
    pub fn y_binning(&self) -> &Binning {
        &self.y_binning
    }

    /// Row-major contents.
    pub fn bin_content(&self) -> &[f64] {
        &self.bin_content
    }

    /// Accepted fills.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Fills dropped for falling outside the range.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

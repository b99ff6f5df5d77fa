//! One-dimensional weighted accumulator.

use nu_core::{Error, Result};
use serde::Serialize;

use crate::binning::Binning;

/// One bin as reported to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    /// Lower edge.
    pub low_edge: f64,
    /// Width.
    pub width: f64,
    /// Sum of weights.
    pub content: f64,
}

/// Weighted 1-D histogram with fixed binning.
///
/// Values outside `[min, max)` are dropped; there are no under/overflow
/// bins, only a counter of dropped fills.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinnedSeries {
    /// Histogram name.
    pub name: String,
    /// Free-form title (axis labels etc.).
    pub title: String,
    binning: Binning,
    bin_content: Vec<f64>,
    sumw2: Vec<f64>,
    entries: u64,
    dropped: u64,
}

impl BinnedSeries {
    /// Empty series.
    pub fn new(name: impl Into<String>, binning: Binning) -> Self {
        let n = binning.n_bins();
        Self {
            name: name.into(),
            title: String::new(),
            binning,
            bin_content: vec![0.0; n],
            sumw2: vec![0.0; n],
            entries: 0,
            dropped: 0,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Add `weight` to the bin containing `value`.
    ///
    /// Returns `false` if the value fell outside the range and was dropped.
    pub fn fill(&mut self, value: f64, weight: f64) -> bool {
        match self.binning.find_bin(value) {
            Some(b) => {
                self.bin_content[b] += weight;
                self.sumw2[b] += weight * weight;
                self.entries += 1;
                true
            }
            None => {
                self.dropped += 1;
                false
            }
        }
    }

    /// Sum of all bin weights.
    pub fn integral(&self) -> f64 {
        self.bin_content.iter().sum()
    }

    /// Multiply every bin by `factor`.
    pub fn scale(&mut self, factor: f64) {
        let f2 = factor * factor;
        for (c, w2) in self.bin_content.iter_mut().zip(self.sumw2.iter_mut()) {
            *c *= factor;
            *w2 *= f2;
        }
    }

    /// Scale to unit integral.
    ///
    /// No-op when the integral is not positive. Returns whether it scaled.
    pub fn normalize(&mut self) -> bool {
        let total = self.integral();
        if total > 0.0 {
            self.scale(1.0 / total);
            true
        } else {
            false
        }
    }

    /// Add `other` bin by bin. Binnings must match exactly.
    pub fn merge(&mut self, other: &BinnedSeries) -> Result<()> {
        if self.binning != other.binning {
            return Err(Error::Validation(format!(
                "cannot merge '{}' into '{}': binning mismatch ({:?} vs {:?})",
                other.name, self.name, other.binning, self.binning
            )));
        }
        for (a, b) in self.bin_content.iter_mut().zip(&other.bin_content) {
            *a += b;
        }
        for (a, b) in self.sumw2.iter_mut().zip(&other.sumw2) {
            *a += b;
        }
        self.entries += other.entries;
        self.dropped += other.dropped;
        Ok(())
    }

    /// Binning.
    pub fn binning(&self) -> &Binning {
        &self.binning
    }

    /// Bin contents.
    pub fn bin_content(&self) -> &[f64] {
        &self.bin_content
    }

    /// Sum of squared weights per bin.
    pub fn sumw2(&self) -> &[f64] {
        &self.sumw2
    }

    /// Bin edges (`n_bins + 1`).
    pub fn bin_edges(&self) -> Vec<f64> {
        self.binning.edges()
    }

    /// Bin centers.
    pub fn bin_centers(&self) -> Vec<f64> {
        self.binning.centers()
    }

    /// Accepted fills.
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Fills dropped for falling outside the range.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Bins as `(low edge, width, content)` in order.
    pub fn bins(&self) -> impl Iterator<Item = Bin> + '_ {
        let width = self.binning.width();
        self.bin_content.iter().enumerate().map(move |(i, &content)| Bin {
            low_edge: self.binning.edge(i),
            width,
            content,
        })
    }
}

//! Cross-section composites for every directory of a curve source.

use nu_core::{CrossSectionSource, Result};
use nu_physics::{XsecAggregator, XsecSummary};
use serde::Serialize;

/// Schema tag of [`XsecReport`].
pub const XSEC_SCHEMA: &str = "nusight_xsec_v0";

/// Composites per directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XsecReport {
    /// Always [`XSEC_SCHEMA`].
    pub schema_version: String,
    /// One summary per directory, in source order.
    pub directories: Vec<XsecSummary>,
}

impl XsecReport {
    /// Summary of `directory`.
    pub fn directory(&self, directory: &str) -> Option<&XsecSummary> {
        self.directories.iter().find(|s| s.directory == directory)
    }
}

/// Aggregate every directory of `source`, taking the mass number from the
/// directory name.
pub fn run_xsec(source: &dyn CrossSectionSource) -> Result<XsecReport> {
    let dirs = source.directories();
    tracing::info!(directories = dirs.len(), "cross-section extraction");
    let directories = dirs
        .iter()
        .map(|d| XsecAggregator::for_directory(d).aggregate(source, d))
        .collect::<Result<Vec<_>>>()?;
    Ok(XsecReport { schema_version: XSEC_SCHEMA.to_string(), directories })
}

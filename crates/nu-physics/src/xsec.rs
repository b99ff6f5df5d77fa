//! Cross-section curve aggregation.
//!
//! Generator spline files hold one curve per exclusive channel (e.g.
//! `qel_cc_n`, `res_nc_p`) in a directory per probe/target pair
//! (`nu_mu_Ar40`). Curves of one family are summed into CC, NC and CC+NC
//! composites and reported per nucleon per unit energy: `σ / (E · A)`.
//!
//! Curves are matched by energy value, not by position: each input is
//! sorted by energy and every sample must line up with the reference
//! within a tolerance, otherwise the combination fails with
//! [`Error::MisalignedCurves`].

use std::collections::HashMap;

use nu_core::{CrossSectionCurve, CrossSectionSource, Error, Result};
use serde::Serialize;

/// Channel family of the spline files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum XsecFamily {
    /// Quasi-elastic.
    Qe,
    /// Resonant.
    Res,
    /// Deep-inelastic.
    Dis,
    /// Coherent.
    Coh,
    /// Meson-exchange current.
    Mec,
    /// Generator-provided inclusive totals.
    Total,
}

impl XsecFamily {
    /// All families in reporting order.
    pub const ALL: [XsecFamily; 6] = [
        XsecFamily::Qe,
        XsecFamily::Res,
        XsecFamily::Dis,
        XsecFamily::Coh,
        XsecFamily::Mec,
        XsecFamily::Total,
    ];

    /// Families built from exclusive channels (everything but `Total`).
    pub const EXCLUSIVE: [XsecFamily; 5] =
        [XsecFamily::Qe, XsecFamily::Res, XsecFamily::Dis, XsecFamily::Coh, XsecFamily::Mec];

    /// Name prefix of the composite curves.
    pub fn prefix(self) -> &'static str {
        match self {
            XsecFamily::Qe => "qel",
            XsecFamily::Res => "res",
            XsecFamily::Dis => "dis",
            XsecFamily::Coh => "coh",
            XsecFamily::Mec => "mec",
            XsecFamily::Total => "tot",
        }
    }

    /// Charged-current input curves.
    pub fn cc_channels(self) -> &'static [&'static str] {
        match self {
            XsecFamily::Qe => &["qel_cc_n"],
            XsecFamily::Res => &["res_cc_p", "res_cc_n"],
            XsecFamily::Dis => &["dis_cc"],
            XsecFamily::Coh => &["coh_cc"],
            XsecFamily::Mec => &["mec_cc"],
            XsecFamily::Total => &["tot_cc"],
        }
    }

    /// Neutral-current input curves.
    pub fn nc_channels(self) -> &'static [&'static str] {
        match self {
            XsecFamily::Qe => &["qel_nc_n", "qel_nc_p"],
            XsecFamily::Res => &["res_nc_p", "res_nc_n"],
            XsecFamily::Dis => &["dis_nc"],
            XsecFamily::Coh => &["coh_nc"],
            XsecFamily::Mec => &["mec_nc"],
            XsecFamily::Total => &["tot_nc"],
        }
    }
}

/// Mass number from a directory label: the first run of digits.
///
/// `"nu_mu_Ar40"` gives 40. `None` if there are no digits or the run
/// parses to zero.
pub fn parse_mass_number(label: &str) -> Option<u32> {
    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse::<u32>().ok().filter(|&a| a > 0)
}

/// CC, NC and CC+NC composites of one family (or of the channel sum).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FamilyCurves {
    /// Name prefix, e.g. `"qel"`.
    pub label: String,
    /// Charged current.
    pub cc: CrossSectionCurve,
    /// Neutral current.
    pub nc: CrossSectionCurve,
    /// CC + NC.
    pub total: CrossSectionCurve,
}

/// All composites for one directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XsecSummary {
    /// Source directory.
    pub directory: String,
    /// Target mass number used for the per-nucleon scaling.
    pub mass_number: u32,
    /// Per-family composites in [`XsecFamily::ALL`] order.
    pub families: Vec<FamilyCurves>,
    /// Sum of the five exclusive families, summed before rescaling.
    pub channel_sum: FamilyCurves,
}

impl XsecSummary {
    /// Composites of `family`.
    pub fn family(&self, family: XsecFamily) -> Option<&FamilyCurves> {
        self.families.iter().find(|f| f.label == family.prefix())
    }

    /// Any composite by curve name (`"res_cc"`, `"sum_total"`, ...).
    pub fn curve(&self, name: &str) -> Option<&CrossSectionCurve> {
        self.families
            .iter()
            .chain(std::iter::once(&self.channel_sum))
            .flat_map(|f| [&f.cc, &f.nc, &f.total])
            .find(|c| c.name == name)
    }

    /// Inclusive CC total followed by the QE, RES and DIS CC composites.
    pub fn cc_breakdown(&self) -> Vec<&CrossSectionCurve> {
        [XsecFamily::Total, XsecFamily::Qe, XsecFamily::Res, XsecFamily::Dis]
            .into_iter()
            .filter_map(|f| self.family(f).map(|c| &c.cc))
            .collect()
    }
}

/// Sums curves and rescales them per nucleon per energy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct XsecAggregator {
    /// Target mass number A.
    pub mass_number: u32,
    /// Relative tolerance when matching energies across curves.
    pub x_tolerance: f64,
}

impl XsecAggregator {
    /// Aggregator for mass number `mass_number`.
    pub fn new(mass_number: u32) -> Self {
        Self { mass_number: mass_number.max(1), x_tolerance: 1e-9 }
    }

    /// Aggregator with A parsed from a directory label (1 if none found).
    pub fn for_directory(directory: &str) -> Self {
        let a = parse_mass_number(directory).unwrap_or_else(|| {
            tracing::warn!(directory, "could not detect mass number, defaulting to 1");
            1
        });
        Self::new(a)
    }

    /// Sum `curves` sample by sample, matched by energy.
    ///
    /// Returns the shared energy grid (ascending) and the summed values.
    pub fn sum_aligned(&self, curves: &[&CrossSectionCurve]) -> Result<(Vec<f64>, Vec<f64>)> {
        let (first, rest) = curves
            .split_first()
            .ok_or_else(|| Error::Validation("no curves to combine".into()))?;
        let (x, mut y) = sorted_by_energy(first);

        for curve in rest {
            if curve.len() != x.len() {
                return Err(Error::MisalignedCurves(format!(
                    "'{}' has {} points but '{}' has {}",
                    curve.name,
                    curve.len(),
                    first.name,
                    x.len()
                )));
            }
            let (cx, cy) = sorted_by_energy(curve);
            for (i, (&xr, &xc)) in x.iter().zip(&cx).enumerate() {
                if !self.same_energy(xr, xc) {
                    return Err(Error::MisalignedCurves(format!(
                        "'{}' sample {i} at E = {xc} does not match '{}' at E = {xr}",
                        curve.name, first.name
                    )));
                }
            }
            for (acc, v) in y.iter_mut().zip(cy) {
                *acc += v;
            }
        }
        Ok((x, y))
    }

    /// Sum of `curves` divided by `E · A`; zero at `E == 0`.
    pub fn combine(
        &self,
        name: impl Into<String>,
        curves: &[&CrossSectionCurve],
    ) -> Result<CrossSectionCurve> {
        let (x, sum) = self.sum_aligned(curves)?;
        let a = f64::from(self.mass_number);
        let y = x
            .iter()
            .zip(&sum)
            .map(|(&e, &s)| if e != 0.0 { s / (e * a) } else { 0.0 })
            .collect();
        CrossSectionCurve::new(name, x, y)
    }

    fn same_energy(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.x_tolerance * a.abs().max(b.abs()).max(1.0)
    }

    fn family_curves(
        &self,
        label: &str,
        cc: &[&CrossSectionCurve],
        nc: &[&CrossSectionCurve],
    ) -> Result<FamilyCurves> {
        let all: Vec<&CrossSectionCurve> = cc.iter().chain(nc).copied().collect();
        Ok(FamilyCurves {
            label: label.to_string(),
            cc: self.combine(format!("{label}_cc"), cc)?,
            nc: self.combine(format!("{label}_nc"), nc)?,
            total: self.combine(format!("{label}_total"), &all)?,
        })
    }

    /// Composites for every family of `directory`, plus the channel sum.
    ///
    /// Every input curve must be present; a missing one is an error.
    pub fn aggregate(
        &self,
        source: &dyn CrossSectionSource,
        directory: &str,
    ) -> Result<XsecSummary> {
        tracing::debug!(directory, mass_number = self.mass_number, "aggregating cross sections");

        let mut loaded: HashMap<&'static str, CrossSectionCurve> = HashMap::new();
        for family in XsecFamily::ALL {
            for &ch in family.cc_channels().iter().chain(family.nc_channels()) {
                loaded.insert(ch, source.curve(directory, ch)?);
            }
        }
        let pick = |names: &[&'static str]| -> Vec<&CrossSectionCurve> {
            names.iter().filter_map(|n| loaded.get(n)).collect()
        };

        let families = XsecFamily::ALL
            .into_iter()
            .map(|f| self.family_curves(f.prefix(), &pick(f.cc_channels()), &pick(f.nc_channels())))
            .collect::<Result<Vec<_>>>()?;

        let sum_cc: Vec<&CrossSectionCurve> =
            XsecFamily::EXCLUSIVE.iter().flat_map(|f| pick(f.cc_channels())).collect();
        let sum_nc: Vec<&CrossSectionCurve> =
            XsecFamily::EXCLUSIVE.iter().flat_map(|f| pick(f.nc_channels())).collect();
        let channel_sum = self.family_curves("sum", &sum_cc, &sum_nc)?;

        Ok(XsecSummary {
            directory: directory.to_string(),
            mass_number: self.mass_number,
            families,
            channel_sum,
        })
    }
}

fn sorted_by_energy(curve: &CrossSectionCurve) -> (Vec<f64>, Vec<f64>) {
    let mut pts: Vec<(f64, f64)> = curve.points().collect();
    pts.sort_by(|a, b| a.0.total_cmp(&b.0));
    pts.into_iter().unzip()
}

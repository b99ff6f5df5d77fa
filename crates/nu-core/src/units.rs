//! Unit conversions.

/// ħc in GeV·cm, inverted: 1 GeV⁻¹ = 1 / 5.07×10¹³ cm.
pub const GEV_INV_PER_CM: f64 = 5.07e13;

/// MeV per GeV.
pub const MEV_PER_GEV: f64 = 1000.0;

/// Convert a cross-section from natural units (GeV⁻²) to cm².
#[inline]
pub fn natural_to_cm2(xsec_gev_m2: f64) -> f64 {
    xsec_gev_m2 / (GEV_INV_PER_CM * GEV_INV_PER_CM)
}

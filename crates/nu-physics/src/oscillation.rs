//! Two-flavor νμ oscillation probabilities, vacuum and matter-approximated.
//!
//! Only the leading atmospheric terms are kept:
//!
//! ```text
//! P(νμ→νμ) = 1 − cos⁴θ13 · sin²2θ23 · sin²(1.267 Δm²31 L / E)
//! P(νμ→νe) = sin²θ23 · sin²2θ13 · sin²(1.267 Δm²31 L / E)
//! ```
//!
//! Matter enters through effective 1–3 parameters (constant density, MSW
//! potential `A = 1.512e-4 ρ Ye E`). Survival and appearance are separate
//! approximations; their sum is not 1 and is not meant to be.
//!
//! Units: E in GeV, L in km, Δm² in eV², ρ in g/cm³.

use serde::{Deserialize, Serialize};

/// Phase prefactor of `Δm² L / 4E` in eV², km, GeV.
pub const PHASE_PREFACTOR: f64 = 1.267;

/// Matter potential prefactor: `A [eV²] = 1.512e-4 · ρ [g/cm³] · Ye · E [GeV]`.
pub const MATTER_POTENTIAL_PREFACTOR: f64 = 1.512e-4;

/// Mixing parameters. Angles in radians, splittings in eV².
///
/// θ12, Δm²21 and δCP do not enter the two-flavor formulas but belong to the
/// parameter set and are carried for completeness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillationParams {
    /// θ12 (solar).
    pub theta12: f64,
    /// θ13 (reactor).
    pub theta13: f64,
    /// θ23 (atmospheric).
    pub theta23: f64,
    /// Δm²21.
    pub dm21_sq: f64,
    /// Δm²31.
    pub dm31_sq: f64,
    /// δCP.
    pub delta_cp: f64,
}

impl Default for OscillationParams {
    fn default() -> Self {
        Self::from_degrees(33.44, 8.57, 49.2, 7.42e-5, 2.517e-3, 197.0)
    }
}

impl OscillationParams {
    /// Build from angles in degrees.
    pub fn from_degrees(
        theta12: f64,
        theta13: f64,
        theta23: f64,
        dm21_sq: f64,
        dm31_sq: f64,
        delta_cp: f64,
    ) -> Self {
        Self {
            theta12: theta12.to_radians(),
            theta13: theta13.to_radians(),
            theta23: theta23.to_radians(),
            dm21_sq,
            dm31_sq,
            delta_cp: delta_cp.to_radians(),
        }
    }

    /// Vacuum 1–3 parameters.
    pub fn vacuum_mixing(&self) -> EffectiveMixing {
        let s2 = (2.0 * self.theta13).sin();
        EffectiveMixing {
            dm31_sq: self.dm31_sq,
            theta13: self.theta13,
            sin2_2theta13: s2 * s2,
            cos4_theta13: self.theta13.cos().powi(4),
        }
    }

    /// Effective 1–3 parameters in matter at energy `energy`.
    ///
    /// `energy <= 0` and NaN return the vacuum parameters (A → 0).
    pub fn matter_mixing(&self, energy: f64, medium: &Medium) -> EffectiveMixing {
        if energy.is_nan() || energy <= 0.0 {
            return self.vacuum_mixing();
        }
        let a = MATTER_POTENTIAL_PREFACTOR * medium.density * medium.electron_fraction * energy;
        let cos2 = (2.0 * self.theta13).cos();
        let sin2 = (2.0 * self.theta13).sin();
        let shifted = cos2 - a / self.dm31_sq;
        let d = shifted * shifted + sin2 * sin2;

        // atan2 keeps θ13 in the right quadrant past the resonance.
        let theta13 = 0.5 * sin2.atan2(shifted);
        EffectiveMixing {
            dm31_sq: self.dm31_sq * d.sqrt(),
            theta13,
            // d = 0 only at resonance with θ13 = 0, where there is no 1–3 mixing.
            sin2_2theta13: if d > 0.0 { sin2 * sin2 / d } else { 0.0 },
            cos4_theta13: theta13.cos().powi(4),
        }
    }
}

/// Effective 1–3 sector parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EffectiveMixing {
    /// Δm²31 (effective).
    pub dm31_sq: f64,
    /// θ13 (effective), radians.
    pub theta13: f64,
    /// sin²2θ13 (effective).
    pub sin2_2theta13: f64,
    /// cos⁴θ13 (effective).
    pub cos4_theta13: f64,
}

/// Constant-density medium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Medium {
    /// Density ρ [g/cm³].
    pub density: f64,
    /// Electron fraction Ye.
    pub electron_fraction: f64,
}

impl Medium {
    /// No matter.
    pub const VACUUM: Medium = Medium { density: 0.0, electron_fraction: 0.5 };

    /// Average continental crust.
    pub const EARTH_CRUST: Medium = Medium { density: 2.8, electron_fraction: 0.5 };
}

impl Default for Medium {
    fn default() -> Self {
        Self::EARTH_CRUST
    }
}

/// νμ survival and νμ→νe appearance, each clamped to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Probabilities {
    /// P(νμ → νμ).
    pub survival: f64,
    /// P(νμ → νe).
    pub appearance: f64,
}

impl Probabilities {
    /// No oscillation.
    pub const UNOSCILLATED: Probabilities = Probabilities { survival: 1.0, appearance: 0.0 };
}

/// Leading-term probabilities for given (effective) mixing.
///
/// `energy <= 0` and NaN give [`Probabilities::UNOSCILLATED`].
pub fn probabilities(
    mixing: &EffectiveMixing,
    theta23: f64,
    energy: f64,
    baseline_km: f64,
) -> Probabilities {
    if energy.is_nan() || energy <= 0.0 {
        return Probabilities::UNOSCILLATED;
    }
    let arg = PHASE_PREFACTOR * mixing.dm31_sq * baseline_km / energy;
    let sin2_arg = arg.sin().powi(2);
    let s2_23 = (2.0 * theta23).sin();
    let s23 = theta23.sin();

    let survival = 1.0 - mixing.cos4_theta13 * s2_23 * s2_23 * sin2_arg;
    let appearance = s23 * s23 * mixing.sin2_2theta13 * sin2_arg;
    Probabilities { survival: survival.clamp(0.0, 1.0), appearance: appearance.clamp(0.0, 1.0) }
}

/// Probabilities at a fixed baseline through a fixed medium.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OscillationEngine {
    /// Mixing parameters.
    pub params: OscillationParams,
    /// Baseline L [km].
    pub baseline_km: f64,
    /// Medium along the baseline.
    pub medium: Medium,
}

impl Default for OscillationEngine {
    fn default() -> Self {
        Self { params: OscillationParams::default(), baseline_km: 810.0, medium: Medium::default() }
    }
}

impl OscillationEngine {
    /// Engine at `baseline_km` through `medium` with default mixing.
    pub fn new(baseline_km: f64, medium: Medium) -> Self {
        Self { params: OscillationParams::default(), baseline_km, medium }
    }

    /// Replace the mixing parameters.
    pub fn with_params(mut self, params: OscillationParams) -> Self {
        self.params = params;
        self
    }

    /// Vacuum probabilities at `energy`.
    pub fn vacuum(&self, energy: f64) -> Probabilities {
        probabilities(&self.params.vacuum_mixing(), self.params.theta23, energy, self.baseline_km)
    }

    /// Matter-approximated probabilities at `energy`.
    pub fn matter(&self, energy: f64) -> Probabilities {
        let mixing = self.params.matter_mixing(energy, &self.medium);
        probabilities(&mixing, self.params.theta23, energy, self.baseline_km)
    }

    /// Sample both approximations over `energies`.
    pub fn scan(&self, energies: impl IntoIterator<Item = f64>) -> Vec<OscillationPoint> {
        energies
            .into_iter()
            .map(|e| OscillationPoint { energy: e, vacuum: self.vacuum(e), matter: self.matter(e) })
            .collect()
    }
}

/// One point of an oscillation scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OscillationPoint {
    /// Energy [GeV].
    pub energy: f64,
    /// Vacuum probabilities.
    pub vacuum: Probabilities,
    /// Matter-approximated probabilities.
    pub matter: Probabilities,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f64::consts::FRAC_PI_2;

    fn in_unit(p: &Probabilities) -> bool {
        (0.0..=1.0).contains(&p.survival) && (0.0..=1.0).contains(&p.appearance)
    }

    #[test]
    fn appearance_peak_at_quarter_period() {
        let params = OscillationParams::default();
        let energy = 1.0;
        let baseline = FRAC_PI_2 * energy / (PHASE_PREFACTOR * params.dm31_sq);
        let engine = OscillationEngine::new(baseline, Medium::VACUUM);

        let p = engine.vacuum(energy);
        let expected = params.theta23.sin().powi(2) * (2.0 * params.theta13).sin().powi(2);
        assert_relative_eq!(p.appearance, expected, max_relative = 1e-12);

        let expected_surv =
            1.0 - params.theta13.cos().powi(4) * (2.0 * params.theta23).sin().powi(2);
        assert_relative_eq!(p.survival, expected_surv, max_relative = 1e-12);
    }

    #[test]
    fn no_oscillation_at_zero_phase() {
        let engine = OscillationEngine::new(0.0, Medium::EARTH_CRUST);
        assert_eq!(engine.vacuum(2.0), Probabilities::UNOSCILLATED);
        assert_eq!(engine.matter(2.0), Probabilities::UNOSCILLATED);
    }

    #[test]
    fn matter_reduces_to_vacuum() {
        let params = OscillationParams::default();
        let vac = params.vacuum_mixing();
        let m = params.matter_mixing(3.0, &Medium { density: 1e-9, electron_fraction: 0.5 });
        assert_abs_diff_eq!(m.dm31_sq, vac.dm31_sq, epsilon = 1e-6);
        assert_abs_diff_eq!(m.sin2_2theta13, vac.sin2_2theta13, epsilon = 1e-6);
        assert_abs_diff_eq!(m.cos4_theta13, vac.cos4_theta13, epsilon = 1e-6);

        let exact = params.matter_mixing(3.0, &Medium::VACUUM);
        assert_relative_eq!(exact.dm31_sq, vac.dm31_sq, max_relative = 1e-12);
        assert_relative_eq!(exact.theta13, vac.theta13, max_relative = 1e-12);
    }

    #[test]
    fn non_positive_energy_is_unoscillated() {
        let engine = OscillationEngine::default();
        for e in [0.0, -1.0] {
            assert_eq!(engine.vacuum(e), Probabilities::UNOSCILLATED);
            assert_eq!(engine.matter(e), Probabilities::UNOSCILLATED);
        }
        let params = OscillationParams::default();
        assert_eq!(params.matter_mixing(0.0, &Medium::EARTH_CRUST), params.vacuum_mixing());
    }

    #[test]
    fn nan_energy_is_unoscillated() {
        let engine = OscillationEngine::default();
        assert_eq!(engine.vacuum(f64::NAN), Probabilities::UNOSCILLATED);
        assert_eq!(engine.matter(f64::NAN), Probabilities::UNOSCILLATED);
        let params = OscillationParams::default();
        assert_eq!(params.matter_mixing(f64::NAN, &Medium::EARTH_CRUST), params.vacuum_mixing());
    }

    #[test]
    fn nova_baseline_matter_shift() {
        let vac = OscillationEngine::new(810.0, Medium::VACUUM);
        let mat = OscillationEngine::new(810.0, Medium::EARTH_CRUST);
        let pv = vac.matter(1.0);
        let pm = mat.matter(1.0);
        assert!(in_unit(&pv) && in_unit(&pm));
        assert!((pv.survival - pm.survival).abs() > 1e-6);
        assert_relative_eq!(pv.survival, vac.vacuum(1.0).survival, max_relative = 1e-12);
        assert_abs_diff_eq!(pv.survival, 0.7372770684, epsilon = 1e-8);
        assert_abs_diff_eq!(pm.survival, 0.5548506354, epsilon = 1e-8);
    }

    #[test]
    fn atan2_keeps_quadrant_past_resonance() {
        // Far above the MSW resonance cos2θ13 − A/Δm² < 0 and θ13_eff → π/2.
        let params = OscillationParams::default();
        let m = params.matter_mixing(500.0, &Medium { density: 10.0, electron_fraction: 0.5 });
        assert!(m.theta13 > std::f64::consts::FRAC_PI_4);
        assert!(m.cos4_theta13 < params.vacuum_mixing().cos4_theta13);
    }

    #[test]
    fn probabilities_bounded_over_scan() {
        let medium = Medium { density: 3.0, electron_fraction: 0.5 };
        let engine = OscillationEngine::new(1300.0, medium);
        let points = engine.scan((1..=400).map(|i| i as f64 * 0.025));
        assert_eq!(points.len(), 400);
        for pt in &points {
            assert!(in_unit(&pt.vacuum), "vacuum out of range at E = {}", pt.energy);
            assert!(in_unit(&pt.matter), "matter out of range at E = {}", pt.energy);
        }
    }

    #[test]
    fn zero_theta13_has_no_appearance() {
        let params = OscillationParams::from_degrees(33.44, 0.0, 49.2, 7.42e-5, 2.517e-3, 0.0);
        let engine = OscillationEngine::new(1300.0, Medium::EARTH_CRUST).with_params(params);
        // The last point sits on the resonance, A = Δm²31.
        let resonance = params.dm31_sq / (MATTER_POTENTIAL_PREFACTOR * 2.8 * 0.5);
        let energies = (1..=200).map(|i| i as f64 * 0.1).chain([resonance]);
        for pt in engine.scan(energies) {
            assert_eq!(pt.vacuum.appearance, 0.0, "vacuum at E = {}", pt.energy);
            assert_eq!(pt.matter.appearance, 0.0, "matter at E = {}", pt.energy);
            assert!(in_unit(&pt.matter));
        }
    }

    #[test]
    fn maximal_mixing_empties_survival_at_first_minimum() {
        let params = OscillationParams::from_degrees(33.44, 0.0, 45.0, 7.42e-5, 2.5e-3, 0.0);
        let energy = 2.0;
        let baseline = FRAC_PI_2 * energy / (PHASE_PREFACTOR * params.dm31_sq);
        let engine = OscillationEngine::new(baseline, Medium::VACUUM).with_params(params);
        let p = engine.vacuum(energy);
        assert_abs_diff_eq!(p.survival, 0.0, epsilon = 1e-12);
        assert_eq!(p.appearance, 0.0);
        assert_abs_diff_eq!(engine.matter(energy).survival, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn inverted_ordering_stays_bounded() {
        let normal = OscillationEngine::new(1300.0, Medium::EARTH_CRUST);
        let mut flipped = normal.params;
        flipped.dm31_sq = -flipped.dm31_sq;
        let inverted = normal.with_params(flipped);

        let energies: Vec<f64> = (1..=200).map(|i| i as f64 * 0.05).collect();
        for (n, i) in normal.scan(energies.iter().copied()).iter().zip(inverted.scan(energies)) {
            assert!(in_unit(&i.vacuum) && in_unit(&i.matter), "E = {}", i.energy);
            assert_relative_eq!(n.vacuum.survival, i.vacuum.survival, max_relative = 1e-12);
        }
        // Matter distinguishes the orderings, vacuum does not.
        assert!((normal.matter(2.5).survival - inverted.matter(2.5).survival).abs() > 1e-4);
    }

    #[test]
    fn params_deserialize_with_defaults() {
        let e: OscillationEngine = serde_json::from_str(r#"{"baseline_km": 295.0}"#).unwrap();
        assert_eq!(e.baseline_km, 295.0);
        assert_eq!(e.params, OscillationParams::default());
        assert_eq!(e.medium, Medium::EARTH_CRUST);
    }
}

//! PDG particle codes and rest masses used by the reconstruction.
//!
//! Masses are in MeV, matching the calorimetric sum convention.

/// Electron.
pub const ELECTRON: i32 = 11;
/// Electron neutrino.
pub const NU_E: i32 = 12;
/// Muon.
pub const MUON: i32 = 13;
/// Muon neutrino.
pub const NU_MU: i32 = 14;
/// Neutral pion.
pub const PI0: i32 = 111;
/// Charged pion (π⁺; π⁻ is the negative code).
pub const PI_PLUS: i32 = 211;
/// Neutron.
pub const NEUTRON: i32 = 2112;
/// Proton.
pub const PROTON: i32 = 2212;

/// Muon rest mass [MeV].
pub const MUON_MASS_MEV: f64 = 105.66;
/// Charged pion rest mass [MeV].
pub const PI_PLUS_MASS_MEV: f64 = 139.57;
/// Proton rest mass [MeV] (calorimetric table value).
pub const PROTON_MASS_MEV: f64 = 938.27;
/// Neutron rest mass [MeV] (calorimetric table value).
pub const NEUTRON_MASS_MEV: f64 = 939.57;
/// Neutral pion rest mass [MeV].
pub const PI0_MASS_MEV: f64 = 134.97;

/// Status code of a final-state (outgoing, detectable) particle.
pub const STATUS_FINAL_STATE: i32 = 1;

/// Rest mass in MeV for the species the calorimetric sum knows about.
///
/// Lookup is on `|pdg|`; anything else returns `None` and is left out of
/// the sum.
pub fn rest_mass_mev(pdg: i32) -> Option<f64> {
    match pdg.abs() {
        MUON => Some(MUON_MASS_MEV),
        PI_PLUS => Some(PI_PLUS_MASS_MEV),
        PROTON => Some(PROTON_MASS_MEV),
        NEUTRON => Some(NEUTRON_MASS_MEV),
        PI0 => Some(PI0_MASS_MEV),
        _ => None,
    }
}

/// `true` for electrons and muons of either charge.
#[inline]
pub fn is_charged_lepton(pdg: i32) -> bool {
    matches!(pdg.abs(), ELECTRON | MUON)
}

/// `true` for muons of either charge.
#[inline]
pub fn is_muon(pdg: i32) -> bool {
    pdg.abs() == MUON
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rest_mass_ignores_charge() {
        assert_eq!(rest_mass_mev(13), Some(MUON_MASS_MEV));
        assert_eq!(rest_mass_mev(-13), Some(MUON_MASS_MEV));
        assert_eq!(rest_mass_mev(-211), Some(PI_PLUS_MASS_MEV));
        assert_eq!(rest_mass_mev(22), None);
        assert_eq!(rest_mass_mev(11), None);
    }

    #[test]
    fn lepton_predicates() {
        assert!(is_charged_lepton(11));
        assert!(is_charged_lepton(-13));
        assert!(!is_charged_lepton(14));
        assert!(is_muon(-13));
        assert!(!is_muon(11));
    }
}

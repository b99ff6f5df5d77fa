//! Lepton-side event kinematics.

use nu_core::pdg;
use nu_core::{EventRecord, Neutrino, ParticleRecord};
use serde::Serialize;

use crate::{Derived, Skip};

/// Nucleon mass used for Bjorken x [GeV].
pub const NUCLEON_MASS_GEV: f64 = 0.939;

/// Momentum-transfer observables of one event. Energies in GeV.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Kinematics {
    /// Outgoing lepton energy.
    pub lepton_energy: f64,
    /// Three-momentum transfer |q|.
    pub q3: f64,
    /// Energy transfer ω = Eν − Eℓ (signed).
    pub omega: f64,
    /// Four-momentum transfer Q², clamped at zero.
    pub q2: f64,
    /// Bjorken x, zero when ω ≤ 0. Not clamped to [0, 1].
    pub bjorken_x: f64,
    /// Inelasticity y = ω / Eν.
    pub bjorken_y: f64,
}

/// First final-state electron or muon in particle-list order.
///
/// Deliberately the first match and not the most energetic one.
pub fn find_lepton(particles: &[ParticleRecord]) -> Option<&ParticleRecord> {
    particles.iter().find(|p| p.is_final_state() && pdg::is_charged_lepton(p.pdg))
}

/// Kinematics from a neutrino and the matched lepton.
pub fn derive(neutrino: &Neutrino, lepton: &ParticleRecord) -> Kinematics {
    let q3 = (neutrino.momentum - lepton.momentum).magnitude();
    let omega = neutrino.energy - lepton.energy;
    let q2 = (q3 * q3 - omega * omega).max(0.0);
    let bjorken_y = if neutrino.energy > 0.0 { omega / neutrino.energy } else { 0.0 };
    let bjorken_x = if omega > 0.0 { q2 / (2.0 * NUCLEON_MASS_GEV * omega) } else { 0.0 };

    Kinematics { lepton_energy: lepton.energy, q3, omega, q2, bjorken_x, bjorken_y }
}

/// Kinematics of `event`, or [`Skip::MissingLepton`].
pub fn event_kinematics(event: &EventRecord) -> Derived<Kinematics> {
    let lepton = find_lepton(event.particles()).ok_or(Skip::MissingLepton)?;
    Ok(derive(event.neutrino(), lepton))
}

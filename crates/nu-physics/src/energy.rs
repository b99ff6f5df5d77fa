//! Neutrino energy estimators for charged-current events.
//!
//! Three estimators per event:
//! - true: the generator's neutrino energy
//! - calorimetric: kinetic energy summed over recognised final-state particles
//! - kinematic: the CCQE two-body formula evaluated on the leading muon
//!
//! Particle energies arrive in GeV; the sums and the quasi-elastic formula
//! work in MeV and report back in GeV.

use nu_core::pdg;
use nu_core::units::MEV_PER_GEV;
use nu_core::{EventRecord, ParticleRecord};
use serde::{Deserialize, Serialize};

use crate::{Derived, Skip};

/// Constants of the quasi-elastic energy formula [MeV].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QeConstants {
    /// Neutron mass.
    pub neutron_mass: f64,
    /// Proton mass.
    pub proton_mass: f64,
    /// Nuclear binding energy.
    pub binding_energy: f64,
    /// Muon mass.
    pub muon_mass: f64,
}

impl Default for QeConstants {
    fn default() -> Self {
        Self {
            neutron_mass: 939.565,
            proton_mass: 938.272,
            binding_energy: 27.0,
            muon_mass: 105.66,
        }
    }
}

/// Estimators for one CC event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnergyEstimates {
    /// True neutrino energy [GeV].
    pub true_energy: f64,
    /// Calorimetric estimate [GeV].
    pub calorimetric: f64,
    /// Quasi-elastic estimate [GeV], or why it is undefined.
    pub kinematic: Derived<f64>,
}

/// Energy reconstruction settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyReconstructor {
    /// Quasi-elastic formula constants.
    pub qe: QeConstants,
    /// Upper end of the plausible quasi-elastic solution [GeV].
    pub max_kinematic_energy: f64,
    /// Denominators smaller than this in magnitude are unstable [MeV].
    pub min_denominator: f64,
}

impl Default for EnergyReconstructor {
    fn default() -> Self {
        Self { qe: QeConstants::default(), max_kinematic_energy: 100.0, min_denominator: 1e-3 }
    }
}

/// Calorimetric energy in MeV: Σ max(0, E − m) over final-state particles
/// with a known rest mass. Unknown species contribute nothing.
pub fn calorimetric_energy_mev<'a>(particles: impl IntoIterator<Item = &'a ParticleRecord>) -> f64 {
    particles
        .into_iter()
        .filter(|p| p.is_final_state())
        .filter_map(|p| {
            let mass = pdg::rest_mass_mev(p.pdg)?;
            Some((p.energy * MEV_PER_GEV - mass).max(0.0))
        })
        .sum()
}

/// First final-state muon in particle-list order.
pub fn find_muon(particles: &[ParticleRecord]) -> Option<&ParticleRecord> {
    particles.iter().find(|p| p.is_final_state() && pdg::is_muon(p.pdg))
}

impl EnergyReconstructor {
    /// Quasi-elastic neutrino energy in MeV from a muon, angle taken to the z axis.
    ///
    /// Undefined when the muon has no direction, when the denominator is
    /// within `min_denominator` of zero, or when the result is not in
    /// `(0, max_kinematic_energy]`.
    pub fn qe_energy_mev(&self, muon: &ParticleRecord) -> Derived<f64> {
        let c = &self.qe;
        let cos_theta = muon.momentum.cos_theta().ok_or(Skip::UndefinedKinematicEnergy)?;
        let e_mu = muon.energy * MEV_PER_GEV;
        let p_mu = muon.momentum.magnitude() * MEV_PER_GEV;

        let mn_eff = c.neutron_mass - c.binding_energy;
        let num = 2.0 * mn_eff * e_mu
            - (c.binding_energy * c.binding_energy - 2.0 * c.neutron_mass * c.binding_energy
                + c.muon_mass * c.muon_mass
                + c.neutron_mass * c.neutron_mass
                - c.proton_mass * c.proton_mass);
        let den = 2.0 * (mn_eff - e_mu + p_mu * cos_theta);
        if den.abs() < self.min_denominator {
            return Err(Skip::UndefinedKinematicEnergy);
        }

        let e_qe = num / den;
        let max_mev = self.max_kinematic_energy * MEV_PER_GEV;
        if !e_qe.is_finite() || e_qe <= 0.0 || e_qe > max_mev {
            return Err(Skip::UndefinedKinematicEnergy);
        }
        Ok(e_qe)
    }

    /// Quasi-elastic estimate for an event [GeV].
    pub fn kinematic_energy(&self, event: &EventRecord) -> Derived<f64> {
        let muon = find_muon(event.particles()).ok_or(Skip::NoMuon)?;
        Ok(self.qe_energy_mev(muon)? / MEV_PER_GEV)
    }

    /// All three estimators, or [`Skip::NotChargedCurrent`] for non-CC events.
    pub fn reconstruct(&self, event: &EventRecord) -> Derived<EnergyEstimates> {
        if !event.channel().is_cc() {
            return Err(Skip::NotChargedCurrent);
        }
        Ok(EnergyEstimates {
            true_energy: event.neutrino().energy,
            calorimetric: calorimetric_energy_mev(event.particles()) / MEV_PER_GEV,
            kinematic: self.kinematic_energy(event),
        })
    }
}

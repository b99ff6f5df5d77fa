//! Reference scenarios across the physics engines.

use approx::{assert_abs_diff_eq, assert_relative_eq};
use nu_core::{
    Channel, ChannelFlags, CrossSectionCurve, Current, EventRecord, Momentum, Neutrino,
    ParticleRecord,
};
use nu_physics::energy::calorimetric_energy_mev;
use nu_physics::kinematics::event_kinematics;
use nu_physics::oscillation::{PHASE_PREFACTOR, probabilities};
use nu_physics::{EnergyReconstructor, Medium, OscillationEngine, OscillationParams, XsecAggregator};

fn cc_event(e_nu: f64, particles: Vec<ParticleRecord>) -> EventRecord {
    EventRecord::new(
        0,
        Neutrino::along_beam(14, e_nu),
        ChannelFlags::new(Channel::Qe, Current::Cc),
        1.0,
        particles,
    )
    .unwrap()
}

#[test]
fn two_gev_muon_event() {
    let muon = ParticleRecord::final_state(13, 1.5, Momentum::new(0.0, 0.0, 1.4));
    let ev = cc_event(2.0, vec![muon]);
    let k = event_kinematics(&ev).unwrap();
    assert!(k.q2 >= 0.0 && k.q3 >= 0.0 && k.omega >= 0.0 && k.bjorken_x >= 0.0);
    assert_relative_eq!(k.bjorken_y, 0.25, epsilon = 1e-12);

    let est = EnergyReconstructor::default().reconstruct(&ev).unwrap();
    assert_abs_diff_eq!(est.calorimetric, (1500.0 - 105.66) / 1000.0, epsilon = 1e-12);
    assert!(est.kinematic.is_ok());
}

#[test]
fn calorimetric_muon_and_proton() {
    let particles = [
        ParticleRecord::final_state(13, 1.0, Momentum::new(0.0, 0.0, 0.99)),
        ParticleRecord::final_state(2212, 1.0, Momentum::new(0.0, 0.0, 0.35)),
    ];
    assert_abs_diff_eq!(calorimetric_energy_mev(&particles), 894.34 + 61.73, epsilon = 1e-9);
}

#[test]
fn matter_changes_nova_survival() {
    let vacuum = OscillationEngine::new(810.0, Medium::VACUUM);
    let matter = OscillationEngine::new(810.0, Medium::EARTH_CRUST);
    let pv = vacuum.matter(1.0);
    let pm = matter.matter(1.0);
    assert_relative_eq!(pv.survival, vacuum.vacuum(1.0).survival, epsilon = 1e-12);
    assert!((pv.survival - pm.survival).abs() > 1e-6);
    for p in [pv, pm] {
        assert!((0.0..=1.0).contains(&p.survival));
        assert!((0.0..=1.0).contains(&p.appearance));
    }
}

#[test]
fn appearance_at_first_maximum() {
    let params = OscillationParams::default();
    let mixing = params.vacuum_mixing();
    let l = 810.0;
    // 1.267 Δm² L / E = π/2
    let e = PHASE_PREFACTOR * params.dm31_sq * l / std::f64::consts::FRAC_PI_2;
    let p = probabilities(&mixing, params.theta23, e, l);
    let s23 = params.theta23.sin();
    assert_relative_eq!(p.appearance, s23 * s23 * mixing.sin2_2theta13, epsilon = 1e-12);
}

#[test]
fn vanishing_density_recovers_vacuum_mixing() {
    let params = OscillationParams::default();
    let vac = params.vacuum_mixing();
    let thin = params.matter_mixing(2.0, &Medium { density: 1e-9, electron_fraction: 0.5 });
    assert_abs_diff_eq!(thin.dm31_sq, vac.dm31_sq, epsilon = 1e-6);
    assert_abs_diff_eq!(thin.sin2_2theta13, vac.sin2_2theta13, epsilon = 1e-6);
}

#[test]
fn single_curve_per_energy() {
    let points = [(0.0, 5.0), (0.5, 1.0), (2.0, 6.0)];
    let c = CrossSectionCurve::from_points("qel_cc_n", &points).unwrap();
    let out = XsecAggregator::new(1).combine("qel_cc", &[&c]).unwrap();
    assert_eq!(out.y, vec![0.0, 2.0, 3.0]);
}

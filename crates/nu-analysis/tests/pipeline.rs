//! End-to-end passes over a synthetic sample.

use approx::assert_relative_eq;
use nu_analysis::source::branch;
use nu_analysis::{
    AnalysisConfig, ColumnarEvents, CurveTable, MemoryEventSource, WeightPolicy, run_all,
    run_energy, run_kinematics, run_oscillation, run_xsec, write_json,
};
use nu_core::{
    Channel, ChannelFlags, CrossSectionCurve, Current, EventRecord, EventSource, Momentum,
    Neutrino, ParticleRecord,
};
use nu_hist::BinnedSeries;
use nu_physics::XsecFamily;

/// Deterministic uniform numbers in [0, 1).
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> f64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 11) as f64 / (1u64 << 53) as f64
    }
}

fn sample(n: usize) -> MemoryEventSource {
    let mut rng = Lcg(42);
    (0..n)
        .map(|i| {
            let e_nu = 0.2 + 4.5 * rng.next();
            let frac = 0.3 + 0.6 * rng.next();
            let e_mu = (e_nu * frac).max(0.11);
            let p = (e_mu * e_mu - 0.10566 * 0.10566).sqrt();
            let cos = 0.5 + 0.5 * rng.next();
            let sin = (1.0 - cos * cos).sqrt();
            let muon = ParticleRecord::final_state(13, e_mu, Momentum::new(p * sin, 0.0, p * cos));
            let e_p = 0.94 + 0.3 * rng.next();
            let proton = ParticleRecord::final_state(2212, e_p, Momentum::new(0.1, 0.1, 0.2));
            let e_pi = 0.14 + 0.5 * rng.next();
            let pion = ParticleRecord::final_state(211, e_pi, Momentum::new(0.0, 0.2, 0.1));

            let channel = Channel::ALL[i % Channel::ALL.len()];
            let current = if i % 4 == 3 { Current::Nc } else { Current::Cc };
            let pdg = if i % 10 == 9 { 12 } else { 14 };
            let particles = match current {
                Current::Cc => vec![muon, proton, pion],
                Current::Nc => vec![proton, pion],
            };
            EventRecord::new(
                i,
                Neutrino::along_beam(pdg, e_nu),
                ChannelFlags::new(channel, current),
                1e-38 * (0.5 + rng.next()),
                particles,
            )
            .unwrap()
        })
        .collect()
}

fn assert_series_close(a: &BinnedSeries, b: &BinnedSeries) {
    assert_eq!(a.name, b.name);
    assert_eq!(a.entries(), b.entries());
    for (x, y) in a.bin_content().iter().zip(b.bin_content()) {
        assert_relative_eq!(*x, *y, max_relative = 1e-10, epsilon = 1e-60);
    }
}

#[test]
fn parallel_matches_sequential() {
    let src = sample(5000);
    let seq_cfg = AnalysisConfig::new();
    let seq = run_all(&src, &seq_cfg).unwrap();

    for threads in [0, 4] {
        let cfg = seq_cfg.threads(threads).chunk_size(333);
        let par = run_all(&src, &cfg).unwrap();

        for (a, b) in seq.kinematics.series().zip(par.kinematics.series()) {
            assert_series_close(a, b);
        }
        assert_eq!(seq.kinematics.skips, par.kinematics.skips);

        assert_series_close(&seq.energy.true_energy, &par.energy.true_energy);
        assert_series_close(&seq.energy.calorimetric, &par.energy.calorimetric);
        assert_series_close(&seq.energy.kinematic, &par.energy.kinematic);
        assert_eq!(seq.energy.response.entries(), par.energy.response.entries());
        assert_relative_eq!(
            seq.energy.response.integral(),
            par.energy.response.integral(),
            max_relative = 1e-10
        );
        assert_eq!(seq.energy.skips, par.energy.skips);

        assert_series_close(&seq.oscillation.unoscillated, &par.oscillation.unoscillated);
        assert_series_close(&seq.oscillation.vacuum, &par.oscillation.vacuum);
        assert_series_close(&seq.oscillation.matter, &par.oscillation.matter);
        assert_eq!(seq.oscillation.selected, par.oscillation.selected);
    }
}

#[test]
fn combined_pass_matches_individual_runs() {
    let src = sample(800);
    let cfg = AnalysisConfig::new();
    let all = run_all(&src, &cfg).unwrap();

    assert_eq!(all.kinematics, run_kinematics(&src, &cfg).unwrap());
    assert_eq!(all.energy, run_energy(&src, &cfg).unwrap());
    assert_eq!(all.oscillation, run_oscillation(&src, &cfg).unwrap());

    // Every NC event is skipped by the energy analysis, every νe by oscillation.
    assert_eq!(all.energy.cc_events + all.energy.skips.not_charged_current, 800);
    assert_eq!(all.oscillation.selected + all.oscillation.skips.not_muon_neutrino, 800);
    assert_eq!(all.kinematics.skips.missing_lepton, 200);
}

#[test]
fn physical_invariants_hold_on_the_sample() {
    let src = sample(2000);
    for ev in src.iter() {
        let ev = ev.unwrap();
        if let Ok(k) = nu_physics::kinematics::event_kinematics(&ev) {
            assert!(k.q2 >= 0.0);
            assert!(k.q3 >= 0.0);
        }
    }

    let report = run_oscillation(&src, &AnalysisConfig::new()).unwrap();
    for point in &report.probabilities {
        for p in [point.vacuum, point.matter] {
            assert!((0.0..=1.0).contains(&p.survival));
            assert!((0.0..=1.0).contains(&p.appearance));
        }
    }
    let uno = report.unoscillated.bin_content();
    let vac = report.vacuum.bin_content();
    for (i, (v, m)) in vac.iter().zip(report.matter.bin_content()).enumerate() {
        assert!(*v <= uno[i] * (1.0 + 1e-12));
        assert!(*m <= uno[i] * (1.0 + 1e-12));
    }
}

type EventColumns = Vec<(String, Vec<f64>)>;
type ParticleColumns = Vec<(String, Vec<Vec<f64>>)>;

fn columns_from(src: &MemoryEventSource) -> (EventColumns, ParticleColumns) {
    let evs = src.records();
    let flag = |f: fn(&ChannelFlags) -> bool| -> Vec<f64> {
        evs.iter().map(|e| f64::from(u8::from(f(e.channel())))).collect()
    };
    let event = vec![
        (branch::NU_PDG.to_string(), evs.iter().map(|e| f64::from(e.neutrino().pdg)).collect()),
        (branch::NU_E.to_string(), evs.iter().map(|e| e.neutrino().energy).collect()),
        (branch::NU_PX.to_string(), evs.iter().map(|e| e.neutrino().momentum.px).collect()),
        (branch::NU_PY.to_string(), evs.iter().map(|e| e.neutrino().momentum.py).collect()),
        (branch::NU_PZ.to_string(), evs.iter().map(|e| e.neutrino().momentum.pz).collect()),
        (branch::XSECTION.to_string(), evs.iter().map(|e| e.cross_section_weight()).collect()),
        (branch::IS_QE.to_string(), flag(|c| c.qe)),
        (branch::IS_RES.to_string(), flag(|c| c.res)),
        (branch::IS_DIS.to_string(), flag(|c| c.dis)),
        (branch::IS_COH.to_string(), flag(|c| c.coh)),
        (branch::IS_MEC.to_string(), flag(|c| c.mec)),
        (branch::IS_CC.to_string(), flag(|c| c.cc)),
        (branch::IS_NC.to_string(), flag(|c| c.nc)),
    ];
    let jagged = |f: fn(&ParticleRecord) -> f64| -> Vec<Vec<f64>> {
        evs.iter().map(|e| e.particles().iter().map(f).collect()).collect()
    };
    let particles = vec![
        (branch::STATUS.to_string(), jagged(|p| f64::from(p.status))),
        (branch::PDG.to_string(), jagged(|p| f64::from(p.pdg))),
        (branch::ENERGY.to_string(), jagged(|p| p.energy)),
        (branch::PX.to_string(), jagged(|p| p.momentum.px)),
        (branch::PY.to_string(), jagged(|p| p.momentum.py)),
        (branch::PZ.to_string(), jagged(|p| p.momentum.pz)),
    ];
    (event, particles)
}

#[test]
fn columnar_source_reproduces_memory_source() {
    let mem = sample(300);
    let (event, particles) = columns_from(&mem);
    let col = ColumnarEvents::from_columns(event, particles, WeightPolicy::Reject).unwrap();
    assert_eq!(col.count(), mem.count());
    for i in [0, 17, 299] {
        assert_eq!(col.get(i).unwrap(), mem.get(i).unwrap());
    }

    let cfg = AnalysisConfig::new().threads(2);
    let from_columns = run_all(&col, &cfg).unwrap();
    assert_eq!(from_columns.energy.cc_events, run_all(&mem, &cfg).unwrap().energy.cc_events);
}

#[test]
fn config_file_and_report_output() {
    let dir = std::env::temp_dir().join(format!("nu-analysis-test-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let cfg_path = dir.join("analysis.yaml");
    let yaml = "\
normalize: true
threads: 2
oscillation:
  binning: { n_bins: 20, min: 0.0, max: 5.0 }
  engine:
    baseline_km: 1300.0
";
    std::fs::write(&cfg_path, yaml).unwrap();
    let cfg = AnalysisConfig::from_path(&cfg_path).unwrap();
    assert_eq!(cfg.oscillation.engine.baseline_km, 1300.0);
    assert_eq!(cfg.oscillation.engine.medium.density, 2.8);

    let report = run_all(&sample(400), &cfg).unwrap();
    assert_eq!(report.oscillation.matter.bin_content().len(), 20);
    assert_relative_eq!(report.oscillation.matter.integral(), 1.0, epsilon = 1e-12);

    let out = dir.join("report.json");
    write_json(&report, &out).unwrap();
    let written = std::fs::read_to_string(&out).unwrap();
    let value: serde_json::Value = serde_json::from_str(&written).unwrap();
    assert_eq!(value["schema_version"], "nusight_event_report_v0");
    assert_eq!(value["oscillation"]["unoscillated"]["name"], "unoscillated");
    assert_eq!(value["config"]["threads"], 2);

    let json_path = dir.join("analysis.json");
    let bad = serde_json::to_string(&AnalysisConfig::new().chunk_size(0)).unwrap();
    std::fs::write(&json_path, bad).unwrap();
    assert!(AnalysisConfig::from_path(&json_path).is_err());

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn xsec_from_curve_file() {
    let mut table = CurveTable::new();
    let grid = [0.0, 0.5, 1.0, 2.0, 5.0];
    for f in XsecFamily::ALL {
        for &ch in f.cc_channels().iter().chain(f.nc_channels()) {
            let y = grid.iter().map(|e| 40.0 * e).collect();
            table.insert("nu_mu_Ar40", CrossSectionCurve::new(ch, grid.to_vec(), y).unwrap());
        }
    }
    let report = run_xsec(&table).unwrap();
    let ar = report.directory("nu_mu_Ar40").unwrap();

    // Two RES CC curves of 40·E over A = 40: 2 everywhere but E = 0.
    let res_cc = ar.curve("res_cc").unwrap();
    assert_eq!(res_cc.y, vec![0.0, 2.0, 2.0, 2.0, 2.0]);
    let sum_total = ar.curve("sum_total").unwrap();
    // 6 CC + 7 NC exclusive curves.
    assert_relative_eq!(sum_total.y[3], 13.0);
    assert_eq!(ar.cc_breakdown().len(), 4);
}

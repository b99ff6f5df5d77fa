//! Single pass over an event source, sequential or sharded with rayon.
//!
//! Each worker owns its accumulator and processes a contiguous chunk of
//! event indices; partial accumulators are merged by element-wise
//! summation. Only the floating-point summation order differs from a
//! sequential pass.

use nu_core::{Error, EventRecord, EventSource, Result};
use nu_physics::Skip;
use rayon::prelude::*;
use serde::Serialize;

use crate::config::AnalysisConfig;

/// Per-event state of one analysis.
pub trait Accumulator: Send + Sized {
    /// Add one event.
    fn observe(&mut self, event: &EventRecord);

    /// Fold another partial result into this one.
    fn merge(&mut self, other: Self) -> Result<()>;
}

/// Events whose contribution was skipped, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkipCounts {
    /// No final-state charged lepton.
    pub missing_lepton: u64,
    /// No final-state muon.
    pub no_muon: u64,
    /// Quasi-elastic energy undefined.
    pub undefined_kinematic_energy: u64,
    /// Not charged current.
    pub not_charged_current: u64,
    /// Not νμ/ν̄μ.
    pub not_muon_neutrino: u64,
    /// Neutrino energy ≤ 0.
    pub non_positive_energy: u64,
}

impl SkipCounts {
    /// Count one skip of event `entry`.
    pub fn record(&mut self, entry: usize, skip: Skip) {
        tracing::trace!(entry, reason = %skip, "event skipped");
        *self.slot(skip) += 1;
    }

    /// Count for one reason.
    pub fn get(&self, skip: Skip) -> u64 {
        match skip {
            Skip::MissingLepton => self.missing_lepton,
            Skip::NoMuon => self.no_muon,
            Skip::UndefinedKinematicEnergy => self.undefined_kinematic_energy,
            Skip::NotChargedCurrent => self.not_charged_current,
            Skip::NotMuonNeutrino => self.not_muon_neutrino,
            Skip::NonPositiveEnergy => self.non_positive_energy,
        }
    }

    /// Sum over all reasons.
    pub fn total(&self) -> u64 {
        self.missing_lepton
            + self.no_muon
            + self.undefined_kinematic_energy
            + self.not_charged_current
            + self.not_muon_neutrino
            + self.non_positive_energy
    }

    /// Add `other`'s counts.
    pub fn merge(&mut self, other: &SkipCounts) {
        self.missing_lepton += other.missing_lepton;
        self.no_muon += other.no_muon;
        self.undefined_kinematic_energy += other.undefined_kinematic_energy;
        self.not_charged_current += other.not_charged_current;
        self.not_muon_neutrino += other.not_muon_neutrino;
        self.non_positive_energy += other.non_positive_energy;
    }

    fn slot(&mut self, skip: Skip) -> &mut u64 {
        match skip {
            Skip::MissingLepton => &mut self.missing_lepton,
            Skip::NoMuon => &mut self.no_muon,
            Skip::UndefinedKinematicEnergy => &mut self.undefined_kinematic_energy,
            Skip::NotChargedCurrent => &mut self.not_charged_current,
            Skip::NotMuonNeutrino => &mut self.not_muon_neutrino,
            Skip::NonPositiveEnergy => &mut self.non_positive_energy,
        }
    }
}

/// Feed every event of `source` to accumulators built by `make`.
///
/// `config.threads == 1` runs on the calling thread; `0` uses the global
/// rayon pool; any other value a dedicated pool of that size. A source
/// error aborts the pass.
pub fn run_pass<S, A, F>(source: &S, config: &AnalysisConfig, make: F) -> Result<A>
where
    S: EventSource + ?Sized,
    A: Accumulator,
    F: Fn() -> A + Sync,
{
    let n = source.count();
    let t0 = std::time::Instant::now();

    let acc = match config.threads {
        1 => {
            let mut acc = make();
            for i in 0..n {
                acc.observe(&source.get(i)?);
            }
            acc
        }
        0 => sharded(source, n, config.chunk_size, &make)?,
        threads => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| Error::Computation(format!("failed to create thread pool: {e}")))?;
            pool.install(|| sharded(source, n, config.chunk_size, &make))?
        }
    };

    tracing::debug!(
        events = n,
        threads = config.threads,
        wall_s = t0.elapsed().as_secs_f64(),
        "pass complete"
    );
    Ok(acc)
}

fn sharded<S, A, F>(source: &S, n: usize, chunk_size: usize, make: &F) -> Result<A>
where
    S: EventSource + ?Sized,
    A: Accumulator,
    F: Fn() -> A + Sync,
{
    let chunk_size = chunk_size.max(1);
    let n_chunks = n.div_ceil(chunk_size);
    let ranges: Vec<(usize, usize)> = (0..n_chunks)
        .map(|c| {
            let start = c * chunk_size;
            (start, (start + chunk_size).min(n))
        })
        .collect();

    ranges
        .into_par_iter()
        .try_fold(make, |mut acc, (start, end)| {
            for i in start..end {
                acc.observe(&source.get(i)?);
            }
            Ok::<A, Error>(acc)
        })
        .try_reduce(make, |mut a, b| {
            a.merge(b)?;
            Ok(a)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryEventSource;
    use nu_core::{ChannelFlags, Neutrino};

    #[derive(Default)]
    struct Sum {
        energy: f64,
        events: usize,
    }

    impl Accumulator for Sum {
        fn observe(&mut self, event: &EventRecord) {
            self.energy += event.neutrino().energy;
            self.events += 1;
        }

        fn merge(&mut self, other: Self) -> Result<()> {
            self.energy += other.energy;
            self.events += other.events;
            Ok(())
        }
    }

    fn source(n: usize) -> MemoryEventSource {
        (0..n)
            .map(|i| {
                let nu = Neutrino::along_beam(14, 0.01 * i as f64);
                EventRecord::new(i, nu, ChannelFlags::default(), 1.0, Vec::new()).unwrap()
            })
            .collect()
    }

    #[test]
    fn sequential_and_sharded_agree() {
        let src = source(1001);
        let seq = run_pass(&src, &AnalysisConfig::new(), Sum::default).unwrap();
        for threads in [0, 2, 3] {
            let cfg = AnalysisConfig::new().threads(threads).chunk_size(64);
            let par = run_pass(&src, &cfg, Sum::default).unwrap();
            assert_eq!(par.events, 1001);
            approx::assert_relative_eq!(par.energy, seq.energy, max_relative = 1e-12);
        }
    }

    #[test]
    fn empty_source() {
        let src = source(0);
        let cfg = AnalysisConfig::new().threads(0);
        assert_eq!(run_pass(&src, &cfg, Sum::default).unwrap().events, 0);
    }

    #[test]
    fn skip_counts() {
        let mut a = SkipCounts::default();
        a.record(0, Skip::NoMuon);
        a.record(1, Skip::NoMuon);
        let mut b = SkipCounts::default();
        b.record(2, Skip::MissingLepton);
        a.merge(&b);
        assert_eq!(a.get(Skip::NoMuon), 2);
        assert_eq!(a.get(Skip::MissingLepton), 1);
        assert_eq!(a.total(), 3);
    }
}

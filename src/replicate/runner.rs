//! Parallel fan-out of independent annealing runs.

use super::config::{available_units, ReplicaCount};
use crate::anneal::{AnnealResult, Annealer, Schedule, System};
use crate::error::{AnnealError, ReplicaError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, info, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Outcome of a [`Replicator`] run.
///
/// `outcomes[i]` belongs to replicate `i`, which was seeded with `seeds[i]`.
#[derive(Debug)]
pub struct ReplicateRun<S> {
    /// Seed of each replicate's random stream.
    pub seeds: Vec<u64>,

    /// Per-replicate result, indexed by replicate number.
    pub outcomes: Vec<Result<AnnealResult<S>, ReplicaError>>,
}

impl<S> ReplicateRun<S> {
    /// Number of replicates that were run.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Finished replicates.
    pub fn successes(&self) -> impl Iterator<Item = &AnnealResult<S>> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    /// Failed replicates.
    pub fn failures(&self) -> impl Iterator<Item = &ReplicaError> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    /// The finished replicate with the lowest best energy.
    pub fn best(&self) -> Option<&AnnealResult<S>> {
        self.successes()
            .min_by(|a, b| a.best_energy.total_cmp(&b.best_energy))
    }

    /// Consumes the run, returning the replicate with the lowest best energy.
    pub fn into_best(self) -> Option<AnnealResult<S>> {
        self.outcomes
            .into_iter()
            .filter_map(Result::ok)
            .min_by(|a, b| a.best_energy.total_cmp(&b.best_energy))
    }

    /// The finished systems, in replicate order.
    pub fn into_systems(self) -> Vec<Result<S, ReplicaError>> {
        self.outcomes
            .into_iter()
            .map(|o| o.map(|r| r.system))
            .collect()
    }
}

/// Runs independent copies of one system under the same schedule.
///
/// Every replicate gets its own clone of the template, its own engine and
/// its own random stream, seeded from a master stream. Replicates never
/// communicate; results are gathered once all have finished.
///
/// # Usage
///
/// ```ignore
/// let run = Replicator::new(system, schedule)?
///     .with_replicas(ReplicaCount::Fixed(8))?
///     .with_seed(42)
///     .run()?;
/// let best = run.into_best().map(|r| r.into_best());
/// ```
#[derive(Debug, Clone)]
pub struct Replicator<S> {
    template: S,
    schedule: Schedule,
    replicas: usize,
    seed: Option<u64>,
    threshold: f64,
}

impl<S> Replicator<S>
where
    S: System + Clone + Send,
{
    /// Creates a replicator using [`ReplicaCount::Auto`] replicates.
    pub fn new(template: S, schedule: Schedule) -> Result<Self, AnnealError> {
        schedule.validate()?;
        Ok(Self {
            template,
            schedule,
            replicas: ReplicaCount::Auto.resolve(available_units())?,
            seed: None,
            threshold: 0.0,
        })
    }

    pub fn with_replicas(mut self, count: ReplicaCount) -> Result<Self, AnnealError> {
        self.replicas = count.resolve(available_units())?;
        Ok(self)
    }

    /// Seeds the master stream that replicate seeds are drawn from.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Early-stop threshold passed to every replicate.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Number of replicates a run launches.
    pub fn replicas(&self) -> usize {
        self.replicas
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    /// Worker threads a parallel run uses: one per replicate, capped at the
    /// available execution units.
    pub fn worker_threads(&self) -> usize {
        self.replicas.min(available_units()).max(1)
    }

    /// Per-replicate seeds.
    ///
    /// Deterministic for a fixed master seed; fresh on every call otherwise.
    pub fn seeds(&self) -> Vec<u64> {
        let mut master = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::seed_from_u64(rand::random()),
        };
        (0..self.replicas).map(|_| master.random::<u64>()).collect()
    }

    /// Runs every replicate to completion.
    ///
    /// A replicate that errors or panics is reported in its own slot; the
    /// others are unaffected. The outer error is only returned when the
    /// worker pool cannot be built.
    pub fn run(&self) -> Result<ReplicateRun<S>, AnnealError> {
        let seeds = self.seeds();
        info!(
            replicas = self.replicas,
            workers = self.worker_threads(),
            "replicate run start"
        );
        for (index, seed) in seeds.iter().enumerate() {
            debug!(replica = index, seed, "replicate seed");
        }

        let jobs: Vec<(usize, S, u64)> = seeds
            .iter()
            .enumerate()
            .map(|(index, &seed)| (index, self.template.clone(), seed))
            .collect();

        let outcomes = self.dispatch(jobs)?;

        for err in outcomes.iter().filter_map(|o| o.as_ref().err()) {
            warn!(replica = err.index(), error = %err, "replicate failed");
        }
        info!(
            replicas = outcomes.len(),
            failed = outcomes.iter().filter(|o| o.is_err()).count(),
            "replicate run finish"
        );

        Ok(ReplicateRun { seeds, outcomes })
    }

    #[cfg(feature = "parallel")]
    fn dispatch(
        &self,
        jobs: Vec<(usize, S, u64)>,
    ) -> Result<Vec<Result<AnnealResult<S>, ReplicaError>>, AnnealError> {
        // Extra replicates queue on the pool instead of getting their own thread.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.worker_threads())
            .build()
            .map_err(|err| AnnealError::WorkerPool(err.to_string()))?;

        let schedule = self.schedule;
        let threshold = self.threshold;
        Ok(pool.install(|| {
            jobs.into_par_iter()
                .map(|(index, system, seed)| run_replica(index, system, schedule, seed, threshold))
                .collect()
        }))
    }

    #[cfg(not(feature = "parallel"))]
    fn dispatch(
        &self,
        jobs: Vec<(usize, S, u64)>,
    ) -> Result<Vec<Result<AnnealResult<S>, ReplicaError>>, AnnealError> {
        Ok(jobs
            .into_iter()
            .map(|(index, system, seed)| {
                run_replica(index, system, self.schedule, seed, self.threshold)
            })
            .collect())
    }
}

/// Runs one replicate, converting engine errors and panics into a
/// [`ReplicaError`] for that replicate.
fn run_replica<S: System>(
    index: usize,
    system: S,
    schedule: Schedule,
    seed: u64,
    threshold: f64,
) -> Result<AnnealResult<S>, ReplicaError> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        Annealer::with_seed(system, schedule, seed)?.anneal_with_threshold(threshold)
    }));

    match outcome {
        Ok(Ok(result)) => Ok(result),
        Ok(Err(source)) => Err(ReplicaError::Anneal { index, source }),
        Err(payload) => Err(ReplicaError::Panicked {
            index,
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

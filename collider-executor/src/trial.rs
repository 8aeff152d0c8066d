//! Trial driver: one ladder, N workers, one result.

use std::thread;

use collider_core::{
    CollisionError, CollisionResult, DrawSource, Entry, OsDrawSource, TrialConfig,
};
use collider_ladder::{Ladder, Record};
use collider_sync::{Completion, Coordinator, CoordinatorSummary};
use tracing::{debug, info};

use crate::worker::{Worker, WorkerReport};

/// Everything known about a finished trial.
#[derive(Debug, Clone)]
pub struct TrialReport {
    /// Configuration the trial ran with
    pub config: TrialConfig,
    /// Reconstructed draw count (the trial's outcome)
    pub result: u64,
    /// Per-level counts the result was computed from
    pub record: Record,
    /// Entry whose terminal promotion ended the trial
    pub solution: Entry,
    /// Draws actually performed across all workers
    pub draws_performed: u64,
    /// One report per worker, in index order
    pub workers: Vec<WorkerReport>,
    /// Coordinator state after draining
    pub coordination: CoordinatorSummary,
}

/// Runs trials for one configuration.
#[derive(Debug, Clone)]
pub struct TrialRunner {
    config: TrialConfig,
}

impl TrialRunner {
    /// Validate `config` and build a runner.
    ///
    /// # Errors
    ///
    /// [`CollisionError::Config`] when the configuration is invalid.
    pub fn new(config: TrialConfig) -> CollisionResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this runner uses.
    pub fn config(&self) -> &TrialConfig {
        &self.config
    }

    /// Run one trial drawing from the OS CSPRNG.
    ///
    /// # Errors
    ///
    /// See [`TrialRunner::run_with_sources`].
    pub fn run(&self) -> CollisionResult<TrialReport> {
        self.run_with_sources(|_| OsDrawSource::new())
    }

    /// Run one trial with a caller-supplied source per worker.
    ///
    /// `sources` is called once per worker index before any thread starts.
    ///
    /// # Errors
    ///
    /// - [`CollisionError::Draw`] or [`CollisionError::Ladder`] if the first
    ///   completion was a worker failure.
    /// - [`CollisionError::NoSolution`] if every worker exited without
    ///   reaching the terminal condition.
    /// - [`CollisionError::WorkerPanicked`] / [`CollisionError::SpawnFailed`]
    ///   for thread failures.
    pub fn run_with_sources<S, F>(&self, sources: F) -> CollisionResult<TrialReport>
    where
        S: DrawSource,
        F: FnMut(usize) -> S,
    {
        let ceiling = self.config.ceiling()?;
        let ladder = Ladder::new(self.config.collision_order);
        let (coordinator, signals) = Coordinator::new(self.config.workers);
        let sources: Vec<S> = (0..self.config.workers).map(sources).collect();

        debug!(
            difficulty = self.config.difficulty,
            collision_order = self.config.collision_order,
            workers = self.config.workers,
            "trial starting"
        );

        let (first, joined) = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(self.config.workers);
            let mut spawn_error = None;

            for (signal, source) in signals.into_iter().zip(sources) {
                let id = signal.worker();
                let worker = Worker::new(&ladder, &ceiling, source, signal);
                let spawned = thread::Builder::new()
                    .name(format!("collider-worker-{id}"))
                    .spawn_scoped(scope, move || worker.run());
                match spawned {
                    Ok(handle) => handles.push(handle),
                    Err(err) => {
                        spawn_error = Some(CollisionError::SpawnFailed(err.to_string()));
                        break;
                    }
                }
            }

            let first = match spawn_error {
                Some(err) => Err(err),
                None => Ok(coordinator.await_completion()),
            };
            coordinator.broadcast_stop();

            let joined: Vec<Result<WorkerReport, usize>> = handles
                .into_iter()
                .enumerate()
                .map(|(index, handle)| handle.join().map_err(|_| index))
                .collect();
            (first, joined)
        });

        let coordination = coordinator.drain();
        let mut workers = Vec::with_capacity(joined.len());
        for report in joined {
            workers.push(report.map_err(CollisionError::WorkerPanicked)?);
        }

        let solution = match first? {
            Some(Completion::Solved { entry, .. }) => entry,
            Some(Completion::Failed { error, .. }) => return Err(error),
            None => return Err(CollisionError::NoSolution),
        };

        let record = Record::from_drained(&ladder, coordination.phase)?;
        let result = record.total_draws();
        let draws_performed: u64 = workers.iter().map(|report| report.draws).sum();

        if self.config.debug {
            info!(
                difficulty = self.config.difficulty,
                collision_order = self.config.collision_order,
                record = %record,
                sum = result,
                draws_performed,
                "desired collisions found"
            );
        } else {
            debug!(
                difficulty = self.config.difficulty,
                collision_order = self.config.collision_order,
                record = %record,
                sum = result,
                draws_performed,
                "desired collisions found"
            );
        }

        Ok(TrialReport {
            config: self.config.clone(),
            result,
            record,
            solution,
            draws_performed,
            workers,
            coordination,
        })
    }
}

/// Run one trial with default settings and return its draw count.
///
/// # Errors
///
/// [`CollisionError::Config`] for `difficulty < 1` or `collision_order < 2`,
/// otherwise see [`TrialRunner::run_with_sources`].
pub fn run_trial(difficulty: u32, collision_order: usize) -> CollisionResult<u64> {
    TrialRunner::new(TrialConfig::new(difficulty, collision_order))?
        .run()
        .map(|report| report.result)
}

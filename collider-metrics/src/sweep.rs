//! Parameter sweeps over difficulty and collision order.

use core::fmt;

use collider_core::{CollisionError, ConfigError, StatsError, TrialConfig};
use collider_executor::TrialRunner;
use tracing::info;

use crate::BatchStats;

/// Bounds and repetition count for a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepConfig {
    /// Smallest difficulty swept (inclusive)
    pub min_difficulty: u32,
    /// Largest difficulty swept (inclusive)
    pub max_difficulty: u32,
    /// Smallest collision order swept (inclusive)
    pub min_collision_order: usize,
    /// Largest collision order swept (inclusive)
    pub max_collision_order: usize,
    /// Trials per point
    pub iterations: usize,
    /// Worker threads per trial
    pub workers: usize,
    /// Surface per-trial diagnostics at `info`
    pub debug: bool,
}

impl SweepConfig {
    /// Sweep every `d` in `1..=max_difficulty` and `k` in
    /// `2..=max_collision_order`.
    pub fn new(max_difficulty: u32, max_collision_order: usize) -> Self {
        Self {
            min_difficulty: 1,
            max_difficulty,
            min_collision_order: 2,
            max_collision_order,
            iterations: 100,
            workers: TrialConfig::default().workers,
            debug: false,
        }
    }

    /// Set the smallest difficulty.
    #[must_use]
    pub fn with_min_difficulty(mut self, min_difficulty: u32) -> Self {
        self.min_difficulty = min_difficulty;
        self
    }

    /// Set the smallest collision order.
    #[must_use]
    pub fn with_min_collision_order(mut self, min_collision_order: usize) -> Self {
        self.min_collision_order = min_collision_order;
        self
    }

    /// Set the number of trials per point.
    #[must_use]
    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    /// Set the number of worker threads per trial.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Enable per-trial diagnostics.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Number of points the sweep will produce.
    pub fn points(&self) -> usize {
        let difficulties = (self.min_difficulty..=self.max_difficulty).count();
        let orders = (self.min_collision_order..=self.max_collision_order).count();
        difficulties * orders
    }

    /// Check the sweep bounds and the trial configuration at the lowest
    /// corner.
    ///
    /// # Errors
    ///
    /// [`ConfigError::EmptyRange`] for an inverted range,
    /// [`ConfigError::NoIterations`] for zero iterations, otherwise whatever
    /// [`TrialConfig::validate`] rejects.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_difficulty > self.max_difficulty {
            return Err(ConfigError::EmptyRange {
                parameter: "difficulty",
                min: self.min_difficulty as usize,
                max: self.max_difficulty as usize,
            });
        }
        if self.min_collision_order > self.max_collision_order {
            return Err(ConfigError::EmptyRange {
                parameter: "collision order",
                min: self.min_collision_order,
                max: self.max_collision_order,
            });
        }
        if self.iterations == 0 {
            return Err(ConfigError::NoIterations);
        }
        self.trial(self.min_difficulty, self.min_collision_order)
            .validate()
    }

    fn trial(&self, difficulty: u32, collision_order: usize) -> TrialConfig {
        TrialConfig::new(difficulty, collision_order)
            .with_workers(self.workers)
            .with_debug(self.debug)
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self::new(32, 3)
    }
}

/// Failure of a sweep point.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepError {
    /// The sweep configuration was rejected
    Config(ConfigError),
    /// A trial failed
    Trial(CollisionError),
    /// A point's results could not be reduced
    Stats(StatsError),
}

impl fmt::Display for SweepError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "Invalid sweep: {err}"),
            Self::Trial(err) => write!(f, "Trial failed: {err}"),
            Self::Stats(err) => write!(f, "Statistics failed: {err}"),
        }
    }
}

impl std::error::Error for SweepError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Trial(err) => Some(err),
            Self::Stats(err) => Some(err),
        }
    }
}

impl From<ConfigError> for SweepError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<CollisionError> for SweepError {
    fn from(err: CollisionError) -> Self {
        Self::Trial(err)
    }
}

impl From<StatsError> for SweepError {
    fn from(err: StatsError) -> Self {
        Self::Stats(err)
    }
}

/// One `(d, k)` point of a sweep.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    /// Difficulty `d`
    pub difficulty: u32,
    /// Collision order `k`
    pub collision_order: usize,
    /// Label `d * 100 + k`
    pub key: u64,
    /// Statistics over `results`
    pub stats: BatchStats,
    /// Raw trial results
    pub results: Vec<u64>,
}

impl SweepPoint {
    /// Label for a `(d, k)` pair.
    pub fn key_for(difficulty: u32, collision_order: usize) -> u64 {
        u64::from(difficulty) * 100 + collision_order as u64
    }
}

/// Runs a batch of trials for every point of a [`SweepConfig`].
#[derive(Debug, Clone)]
pub struct Sweep {
    config: SweepConfig,
}

impl Sweep {
    /// Validate and wrap a sweep configuration.
    ///
    /// # Errors
    ///
    /// See [`SweepConfig::validate`].
    pub fn new(config: SweepConfig) -> Result<Self, SweepError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The sweep configuration.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Run one point.
    ///
    /// # Errors
    ///
    /// The first failing trial, or a statistics failure.
    pub fn run_point(&self, difficulty: u32, collision_order: usize) -> Result<SweepPoint, SweepError> {
        let runner = TrialRunner::new(self.config.trial(difficulty, collision_order))?;
        let results = (0..self.config.iterations)
            .map(|_| runner.run().map(|report| report.result))
            .collect::<Result<Vec<_>, _>>()?;
        let stats = BatchStats::from_results(&results)?;

        info!(
            difficulty,
            collision_order,
            mean = stats.mean,
            cv = stats.cv,
            "sweep point complete"
        );
        Ok(SweepPoint {
            difficulty,
            collision_order,
            key: SweepPoint::key_for(difficulty, collision_order),
            stats,
            results,
        })
    }

    /// Run every point, difficulty-major, handing each to `on_point` as soon
    /// as it completes.
    ///
    /// # Errors
    ///
    /// Stops at the first failing point.
    pub fn run_with<F>(&self, mut on_point: F) -> Result<(), SweepError>
    where
        F: FnMut(&SweepPoint),
    {
        for difficulty in self.config.min_difficulty..=self.config.max_difficulty {
            for collision_order in
                self.config.min_collision_order..=self.config.max_collision_order
            {
                on_point(&self.run_point(difficulty, collision_order)?);
            }
        }
        Ok(())
    }

    /// Run every point and collect the results.
    ///
    /// # Errors
    ///
    /// Stops at the first failing point.
    pub fn run(&self) -> Result<Vec<SweepPoint>, SweepError> {
        let mut points = Vec::with_capacity(self.config.points());
        self.run_with(|point| points.push(point.clone()))?;
        Ok(points)
    }
}

//! Error types and handling for the Collider estimator.

use core::fmt;

use crate::TrialPhase;

/// Errors produced by a draw source.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrawError {
    /// The operating system entropy source failed
    Entropy(String),
    /// A scripted source has no values left
    Exhausted,
    /// A scripted value does not fit below the ceiling
    OutOfRange {
        /// The offending value, in decimal
        value: String,
        /// The ceiling it was checked against, in decimal
        ceiling: String,
    },
}

impl fmt::Display for DrawError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Entropy(msg) => write!(f, "Entropy source failure: {msg}"),
            Self::Exhausted => write!(f, "Draw source exhausted"),
            Self::OutOfRange { value, ceiling } => {
                write!(f, "Drawn value {value} is not below ceiling {ceiling}")
            }
        }
    }
}

/// Errors produced by the collision ladder.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LadderError {
    /// A level index past the top of the ladder
    LevelOutOfRange {
        /// Requested level
        level: usize,
        /// Number of levels in the ladder
        levels: usize,
    },
}

impl fmt::Display for LadderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LevelOutOfRange { level, levels } => {
                write!(f, "Level {level} out of range for a ladder of {levels} levels")
            }
        }
    }
}

/// Errors raised while validating configuration.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Difficulty must be at least 1
    DifficultyTooLow(u32),
    /// Difficulty beyond the largest supported draw space
    DifficultyTooHigh {
        /// Requested difficulty
        difficulty: u32,
        /// Largest accepted difficulty
        max: u32,
    },
    /// Collision order must be at least 2
    CollisionOrderTooLow(usize),
    /// At least one worker is required
    NoWorkers,
    /// A sweep needs at least one iteration per point
    NoIterations,
    /// A sweep range whose lower bound exceeds its upper bound
    EmptyRange {
        /// Which parameter the range belongs to
        parameter: &'static str,
        /// Lower bound
        min: usize,
        /// Upper bound
        max: usize,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DifficultyTooLow(d) => write!(f, "Difficulty must be at least 1, got {d}"),
            Self::DifficultyTooHigh { difficulty, max } => {
                write!(f, "Difficulty must be at most {max}, got {difficulty}")
            }
            Self::CollisionOrderTooLow(k) => {
                write!(f, "Collision order must be at least 2, got {k}")
            }
            Self::NoWorkers => write!(f, "At least one worker thread is required"),
            Self::NoIterations => write!(f, "At least one iteration per point is required"),
            Self::EmptyRange { parameter, min, max } => {
                write!(f, "Empty {parameter} range: {min} > {max}")
            }
        }
    }
}

/// Errors that abort a trial.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollisionError {
    /// The trial configuration was rejected before any worker started
    Config(ConfigError),
    /// A worker's draw source failed
    Draw {
        /// Index of the failing worker
        worker: usize,
        /// Underlying draw failure
        source: DrawError,
    },
    /// A ladder operation failed
    Ladder(LadderError),
    /// Every worker exited without reaching the terminal condition
    NoSolution,
    /// A worker thread could not be spawned
    SpawnFailed(String),
    /// A worker thread panicked
    WorkerPanicked(usize),
    /// The trial was not in the phase an operation requires
    InvalidPhase {
        /// Phase the operation needs
        expected: TrialPhase,
        /// Phase the trial was actually in
        found: TrialPhase,
    },
}

impl fmt::Display for CollisionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "Invalid configuration: {err}"),
            Self::Draw { worker, source } => write!(f, "Worker {worker} draw failed: {source}"),
            Self::Ladder(err) => write!(f, "Ladder error: {err}"),
            Self::NoSolution => write!(f, "All workers exited before a solution was found"),
            Self::SpawnFailed(msg) => write!(f, "Failed to spawn worker thread: {msg}"),
            Self::WorkerPanicked(worker) => write!(f, "Worker {worker} panicked"),
            Self::InvalidPhase { expected, found } => {
                write!(f, "Trial is {found}, expected {expected}")
            }
        }
    }
}

impl From<ConfigError> for CollisionError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<LadderError> for CollisionError {
    fn from(err: LadderError) -> Self {
        Self::Ladder(err)
    }
}

/// Errors raised when reducing a batch of trial results.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatsError {
    /// No results to reduce
    EmptyBatch,
    /// Coefficient of variation is undefined for a zero mean
    ZeroMean,
}

impl fmt::Display for StatsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyBatch => write!(f, "Cannot summarize an empty batch"),
            Self::ZeroMean => write!(f, "Coefficient of variation undefined for zero mean"),
        }
    }
}

/// A result type for draw operations.
pub type DrawResult<T> = Result<T, DrawError>;

/// A result type for ladder operations.
pub type LadderResult<T> = Result<T, LadderError>;

/// A result type for trial operations.
pub type CollisionResult<T> = Result<T, CollisionError>;

/// A result type for batch statistics.
pub type StatsResult<T> = Result<T, StatsError>;

impl std::error::Error for DrawError {}

impl std::error::Error for LadderError {}

impl std::error::Error for ConfigError {}

impl std::error::Error for CollisionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Draw { source, .. } => Some(source),
            Self::Ladder(err) => Some(err),
            _ => None,
        }
    }
}

impl std::error::Error for StatsError {}

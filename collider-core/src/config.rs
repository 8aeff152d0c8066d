//! Trial configuration.

use crate::{Ceiling, ConfigError, MAX_DIFFICULTY};

/// Smallest meaningful collision order (plain duplicate detection).
pub const MIN_COLLISION_ORDER: usize = 2;

/// Configuration for a single trial.
///
/// Passed by value into every trial; nothing here is shared between trials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrialConfig {
    /// Bit-width of the draw space (`ceiling = 2^difficulty`)
    pub difficulty: u32,
    /// Number of times one value must be drawn to end the trial
    pub collision_order: usize,
    /// Number of worker threads racing on the shared ladder
    pub workers: usize,
    /// Surface trial diagnostics at `info` instead of `debug`
    pub debug: bool,
}

impl TrialConfig {
    /// Create a configuration using every available CPU.
    #[must_use]
    pub fn new(difficulty: u32, collision_order: usize) -> Self {
        Self {
            difficulty,
            collision_order,
            workers: num_cpus::get(),
            debug: false,
        }
    }

    /// Set the number of worker threads.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Enable or disable diagnostics.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Index of the terminal level (`k - 1`).
    #[must_use]
    pub const fn terminal_level(&self) -> usize {
        self.collision_order.saturating_sub(1)
    }

    /// Reject configurations no trial can run with.
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.difficulty == 0 {
            return Err(ConfigError::DifficultyTooLow(self.difficulty));
        }
        if self.difficulty > MAX_DIFFICULTY {
            return Err(ConfigError::DifficultyTooHigh {
                difficulty: self.difficulty,
                max: MAX_DIFFICULTY,
            });
        }
        if self.collision_order < MIN_COLLISION_ORDER {
            return Err(ConfigError::CollisionOrderTooLow(self.collision_order));
        }
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        Ok(())
    }

    /// Validate and build the ceiling for this trial.
    ///
    /// # Errors
    ///
    /// See [`TrialConfig::validate`].
    pub fn ceiling(&self) -> Result<Ceiling, ConfigError> {
        self.validate()?;
        Ceiling::from_difficulty(self.difficulty)
    }
}

impl Default for TrialConfig {
    fn default() -> Self {
        // 2^32 draw space, 3-fold collisions.
        Self::new(32, 3)
    }
}

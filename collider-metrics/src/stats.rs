//! Summary statistics over a batch of trial results.

use collider_core::{StatsError, StatsResult};

/// Mean, spread and range of a batch of trial results.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchStats {
    /// Number of results
    pub count: usize,
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Coefficient of variation (`std_dev / mean`)
    pub cv: f64,
    /// Smallest result
    pub min: u64,
    /// Largest result
    pub max: u64,
}

impl BatchStats {
    /// Reduce a batch of results.
    ///
    /// # Errors
    ///
    /// [`StatsError::EmptyBatch`] for no results, [`StatsError::ZeroMean`]
    /// when every result is zero.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_results(results: &[u64]) -> StatsResult<Self> {
        let (Some(&min), Some(&max)) = (results.iter().min(), results.iter().max()) else {
            return Err(StatsError::EmptyBatch);
        };

        let samples: Vec<f64> = results.iter().map(|&r| r as f64).collect();
        let mean = statistical::mean(&samples);
        if mean == 0.0 {
            return Err(StatsError::ZeroMean);
        }
        let std_dev = statistical::population_standard_deviation(&samples, Some(mean));

        Ok(Self {
            count: results.len(),
            mean,
            std_dev,
            cv: std_dev / mean,
            min,
            max,
        })
    }
}

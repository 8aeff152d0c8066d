//! # Collider - k-fold collision estimation
//!
//! Estimates how many uniform draws from `[0, 2^d)` it takes until some value
//! has been drawn `k` times. Each trial races a pool of worker threads over a
//! shared collision ladder; the first worker to promote an entry to the top
//! level wins, everyone else is stopped, and the drained ladder is reduced to
//! a draw count.
//!
//! ## Layout
//!
//! - [`collider_core`]: ceiling, entries, phases, configuration, draw sources
//! - [`collider_ladder`]: the concurrent ladder and its reduction
//! - [`collider_sync`]: phase cell and the cancellation coordinator
//! - [`collider_executor`]: workers and the trial driver
//! - [`collider_metrics`]: batch statistics and sweeps
//!
//! ## Quick Start
//!
//! ```no_run
//! use collider::{run_trial, Sweep, SweepConfig};
//!
//! // One trial: draws until some 16-bit value appears three times.
//! let draws = run_trial(16, 3)?;
//! assert!(draws >= 3);
//!
//! // Fifty trials per point for d in 1..=8, k in 2..=3.
//! let sweep = Sweep::new(SweepConfig::new(8, 3).with_iterations(50))?;
//! for point in sweep.run()? {
//!     println!("{} {:.2} {:.3}", point.key, point.stats.mean, point.stats.cv);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub use collider_core::{
    error::*, Bound, Ceiling, DrawSource, Entry, OsDrawSource, ScriptedDraws, TrialConfig,
    TrialPhase, MAX_DIFFICULTY, MAX_NATIVE_DIFFICULTY,
};
pub use collider_executor::{run_trial, TrialReport, TrialRunner, WorkerExit, WorkerReport};
pub use collider_ladder::{summarize, Ladder, Mark, Promotion, Record};
pub use collider_metrics::{BatchStats, Sweep, SweepConfig, SweepError, SweepPoint};
pub use collider_sync::{Completion, Coordinator, CoordinatorSummary, PhaseCell, WorkerSignal};

/// Version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_facade_runs_a_trial() {
        let report = TrialRunner::new(TrialConfig::new(4, 2).with_workers(2))
            .unwrap()
            .run()
            .unwrap();
        assert!(report.result >= 2);
        assert_eq!(report.coordination.phase, TrialPhase::Drained);
    }
}

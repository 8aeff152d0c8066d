//! # Collider Executor
//!
//! Runs collision trials: spawns one [`Worker`] per configured thread over a
//! shared ladder, waits for the first completion, broadcasts stop, joins every
//! worker and reduces the drained ladder to a draw count.
//!
//! ```no_run
//! use collider_executor::run_trial;
//!
//! let draws = run_trial(16, 3)?;
//! assert!(draws >= 3);
//! # Ok::<(), collider_core::CollisionError>(())
//! ```

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod trial;
pub mod worker;

pub use trial::{run_trial, TrialReport, TrialRunner};
pub use worker::{Step, Worker, WorkerExit, WorkerReport};

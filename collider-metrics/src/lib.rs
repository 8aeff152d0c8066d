//! # Collider Metrics
//!
//! Reduces batches of trial results to summary statistics and runs parameter
//! sweeps over difficulty and collision order.

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod stats;
pub mod sweep;

pub use stats::BatchStats;
pub use sweep::{Sweep, SweepConfig, SweepError, SweepPoint};

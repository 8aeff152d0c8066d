//! Collision ladder and aggregation for Collider trials.
//!
//! The [`Ladder`] is the only shared mutable state of a trial. Each of its `k`
//! levels is an internally sharded concurrent map, so every operation is
//! atomic on its own and callers never hold a lock across protocol steps.
//! Once a trial is drained, [`Record`] reduces the levels to the
//! reconstructed draw count.

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ladder;
pub mod record;

pub use ladder::{Ladder, Mark, Promotion};
pub use record::{summarize, Record};

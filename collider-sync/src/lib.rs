//! Synchronization primitives for Collider trials.
//!
//! - [`PhaseCell`]: the trial's forward-only phase state machine.
//! - [`coordinator`]: exactly-once completion and stop broadcast.

#![deny(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::sync::atomic::{AtomicU8, Ordering};

use collider_core::TrialPhase;

pub mod coordinator;

pub use coordinator::{Completion, Coordinator, CoordinatorSummary, WorkerSignal};

/// A trial phase that can only move forward.
#[derive(Debug)]
pub struct PhaseCell {
    inner: AtomicU8,
}

impl PhaseCell {
    /// Create a cell in the `Running` phase.
    pub const fn new() -> Self {
        Self {
            inner: AtomicU8::new(TrialPhase::Running as u8),
        }
    }

    /// Current phase.
    pub fn load(&self) -> TrialPhase {
        // Only valid phases are ever stored.
        TrialPhase::from_u8(self.inner.load(Ordering::Acquire)).unwrap_or(TrialPhase::Drained)
    }

    /// Move from exactly `from` to `to`.
    ///
    /// Returns `true` only for the single caller that performed the
    /// transition.
    pub fn transition(&self, from: TrialPhase, to: TrialPhase) -> bool {
        from < to
            && self
                .inner
                .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
    }

    /// Move forward to `target` from any earlier phase.
    ///
    /// Returns `true` if this call moved the phase, `false` if it was already
    /// at or past `target`.
    pub fn advance_to(&self, target: TrialPhase) -> bool {
        self.inner
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                (raw < target as u8).then_some(target as u8)
            })
            .is_ok()
    }
}

impl Default for PhaseCell {
    fn default() -> Self {
        Self::new()
    }
}

//! Reduction of a drained ladder to a single draw count.

use core::fmt;

use collider_core::{CollisionError, CollisionResult, TrialPhase};

use crate::Ladder;

/// Per-level occupancy of a drained ladder.
///
/// `counts[i]` is the number of entries drawn exactly `i + 1` times. Level 0
/// holds a pointer for every entry ever drawn, so its raw count is reduced by
/// the membership of every higher level to leave only the singletons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    counts: Vec<u64>,
}

impl Record {
    /// Read the ladder's levels into a record.
    #[must_use]
    pub fn from_ladder(ladder: &Ladder) -> Self {
        let mut counts: Vec<u64> = ladder.counts().into_iter().map(|c| c as u64).collect();
        let promoted: u64 = counts.iter().skip(1).sum();
        if let Some(singletons) = counts.first_mut() {
            *singletons = singletons.saturating_sub(promoted);
        }
        Self { counts }
    }

    /// Read the ladder only if its trial has been drained.
    ///
    /// # Errors
    ///
    /// [`CollisionError::InvalidPhase`] for any phase other than `Drained`.
    pub fn from_drained(ladder: &Ladder, phase: TrialPhase) -> CollisionResult<Self> {
        if phase != TrialPhase::Drained {
            return Err(CollisionError::InvalidPhase {
                expected: TrialPhase::Drained,
                found: phase,
            });
        }
        Ok(Self::from_ladder(ladder))
    }

    /// Per-level counts, bottom first.
    #[must_use]
    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Reconstructed number of draws: `sum(counts[i] * (i + 1))`.
    #[must_use]
    pub fn total_draws(&self) -> u64 {
        self.counts
            .iter()
            .zip(1u64..)
            .map(|(count, weight)| count * weight)
            .sum()
    }

    /// Number of entries that reached the terminal level.
    #[must_use]
    pub fn terminal_entries(&self) -> u64 {
        self.counts.last().copied().unwrap_or(0)
    }

    /// Draws attributed to terminal entries (`counts[k-1] * k`).
    #[must_use]
    pub fn terminal_draws(&self) -> u64 {
        self.terminal_entries() * self.counts.len() as u64
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (index, count) in self.counts.iter().enumerate() {
            if index > 0 {
                write!(f, " ")?;
            }
            write!(f, "{count}")?;
        }
        write!(f, "]")
    }
}

/// Reconstructed draw count of a ladder.
///
/// Only meaningful once every worker has stopped writing; before that it is
/// still safe to call but the levels are read at different instants.
#[must_use]
pub fn summarize(ladder: &Ladder) -> u64 {
    Record::from_ladder(ladder).total_draws()
}

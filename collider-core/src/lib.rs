//! # Collider Core
//!
//! Core types for the Collider k-fold collision estimator.
//!
//! A trial draws values uniformly from `[0, 2^d)` until one of them has been
//! drawn `k` times. This crate holds the pieces every other crate agrees on:
//! the draw [`Ceiling`], the [`Entry`] key, the [`TrialPhase`] state machine,
//! trial configuration and the [`draw`] sources.

#![deny(missing_docs)]
#![deny(unsafe_op_in_unsafe_fn)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use core::fmt;

use num_bigint::BigUint;
use num_traits::One;

pub mod config;
pub mod draw;
pub mod error;

pub use config::TrialConfig;
pub use draw::{DrawSource, OsDrawSource, ScriptedDraws};
pub use error::{
    CollisionError, CollisionResult, ConfigError, DrawError, DrawResult, LadderError,
    LadderResult, StatsError, StatsResult,
};

/// Largest difficulty whose ceiling still fits in a `u64`.
pub const MAX_NATIVE_DIFFICULTY: u32 = 63;

/// Largest accepted difficulty. Entries at this width are 1234-digit keys.
pub const MAX_DIFFICULTY: u32 = 4096;

/// Exclusive upper bound of the draw space.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Bound {
    /// `2^d` for `d <= 63`
    Native(u64),
    /// `2^d` for larger difficulties
    Big(BigUint),
}

/// The draw ceiling `2^d` for one trial.
///
/// Fixed for the lifetime of a trial and shared read-only by every worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ceiling {
    difficulty: u32,
    bound: Bound,
}

impl Ceiling {
    /// Build the ceiling for a difficulty.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::DifficultyTooLow`] when `difficulty` is zero and
    /// [`ConfigError::DifficultyTooHigh`] above [`MAX_DIFFICULTY`].
    pub fn from_difficulty(difficulty: u32) -> Result<Self, ConfigError> {
        if difficulty == 0 {
            return Err(ConfigError::DifficultyTooLow(difficulty));
        }
        if difficulty > MAX_DIFFICULTY {
            return Err(ConfigError::DifficultyTooHigh {
                difficulty,
                max: MAX_DIFFICULTY,
            });
        }
        let bound = if difficulty <= MAX_NATIVE_DIFFICULTY {
            Bound::Native(1u64 << difficulty)
        } else {
            Bound::Big(BigUint::one() << difficulty as usize)
        };
        Ok(Self { difficulty, bound })
    }

    /// The difficulty this ceiling was built from.
    #[must_use]
    pub const fn difficulty(&self) -> u32 {
        self.difficulty
    }

    /// The exclusive upper bound.
    #[must_use]
    pub const fn bound(&self) -> &Bound {
        &self.bound
    }

    /// Whether draws fit in a native integer.
    #[must_use]
    pub const fn is_native(&self) -> bool {
        matches!(self.bound, Bound::Native(_))
    }

    /// Number of random bytes needed to cover the draw space.
    #[must_use]
    pub const fn byte_len(&self) -> usize {
        (self.difficulty as usize + 7) / 8
    }

    /// Check whether a native value lies in `[0, ceiling)`.
    #[must_use]
    pub fn admits(&self, value: u64) -> bool {
        match &self.bound {
            Bound::Native(bound) => value < *bound,
            Bound::Big(_) => true,
        }
    }
}

impl fmt::Display for Ceiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.bound {
            Bound::Native(bound) => write!(f, "{bound}"),
            Bound::Big(bound) => write!(f, "{bound}"),
        }
    }
}

/// The canonical decimal key of a drawn value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entry(String);

impl Entry {
    /// Key for a native draw.
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self(value.to_string())
    }

    /// Key for an arbitrary-precision draw.
    #[must_use]
    pub fn from_biguint(value: &BigUint) -> Self {
        Self(value.to_str_radix(10))
    }

    /// The decimal representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<u64> for Entry {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle of a single trial.
///
/// Transitions only move forward:
/// `Running -> SolutionFound -> Cancelling -> Drained`. Aggregation is only
/// meaningful once a trial is `Drained`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TrialPhase {
    /// Workers are drawing, no terminal condition yet
    Running = 0,
    /// One worker reached the terminal condition and notified the coordinator
    SolutionFound = 1,
    /// Stop tokens have been broadcast
    Cancelling = 2,
    /// Every worker has been joined
    Drained = 3,
}

impl TrialPhase {
    /// Decode a phase from its `repr(u8)` value.
    #[must_use]
    pub const fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            0 => Some(Self::Running),
            1 => Some(Self::SolutionFound),
            2 => Some(Self::Cancelling),
            3 => Some(Self::Drained),
            _ => None,
        }
    }
}

impl Default for TrialPhase {
    fn default() -> Self {
        Self::Running
    }
}

impl fmt::Display for TrialPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::SolutionFound => write!(f, "SolutionFound"),
            Self::Cancelling => write!(f, "Cancelling"),
            Self::Drained => write!(f, "Drained"),
        }
    }
}

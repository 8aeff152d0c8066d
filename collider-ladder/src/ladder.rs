//! The shared collision ladder.
//!
//! Level 0 maps every entry ever drawn to a pointer: the highest level the
//! entry currently occupies. Levels `1..k` are presence sets, membership at
//! level `i` meaning "drawn `i + 1` times". Membership of the top level
//! (`k - 1`) is the terminal condition.
//!
//! Storage is `O(distinct entries)`: an entry lives in level 0 plus at most
//! one higher level, because promotion removes it from the level it left.
//!
//! The first terminal promotion seals the ladder. Only one entry ever reaches
//! the top level, and draws recorded after the seal are discarded, so the
//! drained ladder is the state at the moment the trial was decided.

use std::sync::atomic::{AtomicBool, Ordering};

use collider_core::{Entry, LadderError, LadderResult};
use dashmap::mapref::entry::Entry as Slot;
use dashmap::DashMap;
use tracing::trace;

/// Value stored under an entry at some level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    /// Level 0: highest level the entry occupies
    Pointer(usize),
    /// Levels 1 and up: the entry is a member
    Present,
}

impl Mark {
    /// The pointer value, if this is a level-0 mark.
    #[must_use]
    pub const fn pointer(self) -> Option<usize> {
        match self {
            Self::Pointer(level) => Some(level),
            Self::Present => None,
        }
    }
}

/// Outcome of recording one draw against the ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Promotion {
    /// First occurrence of the entry
    First,
    /// The entry moved up a level and may collide again
    Advanced {
        /// Level the entry left
        from: usize,
        /// Level the entry now occupies
        to: usize,
    },
    /// The entry reached the terminal level
    Terminal {
        /// Level the entry left
        from: usize,
    },
    /// Another entry already decided the trial; nothing was written
    Sealed,
}

impl Promotion {
    /// Whether this draw satisfied the trial.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal { .. })
    }
}

/// `k` concurrent levels sharing one key space.
#[derive(Debug)]
pub struct Ladder {
    levels: Vec<DashMap<Entry, Mark>>,
    sealed: AtomicBool,
}

impl Ladder {
    /// Build an empty ladder with one level per collision order.
    ///
    /// `collision_order` is expected to be validated (at least 2).
    #[must_use]
    pub fn new(collision_order: usize) -> Self {
        Self {
            levels: (0..collision_order).map(|_| DashMap::new()).collect(),
            sealed: AtomicBool::new(false),
        }
    }

    /// Number of levels (`k`).
    #[must_use]
    pub fn levels(&self) -> usize {
        self.levels.len()
    }

    /// Index of the terminal level (`k - 1`).
    #[must_use]
    pub fn terminal_level(&self) -> usize {
        self.levels.len().saturating_sub(1)
    }

    /// Whether some entry has already reached the terminal level.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed.load(Ordering::Acquire)
    }

    fn level(&self, level: usize) -> LadderResult<&DashMap<Entry, Mark>> {
        self.levels.get(level).ok_or(LadderError::LevelOutOfRange {
            level,
            levels: self.levels.len(),
        })
    }

    /// Insert `mark` only if `entry` is absent at `level`.
    ///
    /// Returns `true` if the entry was absent. Atomic with respect to every
    /// other caller on the same key.
    ///
    /// # Errors
    ///
    /// [`LadderError::LevelOutOfRange`] for an invalid level.
    pub fn set_if_absent(&self, level: usize, entry: &Entry, mark: Mark) -> LadderResult<bool> {
        match self.level(level)?.entry(entry.clone()) {
            Slot::Occupied(_) => Ok(false),
            Slot::Vacant(slot) => {
                slot.insert(mark);
                Ok(true)
            }
        }
    }

    /// Look up `entry` at `level`.
    ///
    /// # Errors
    ///
    /// [`LadderError::LevelOutOfRange`] for an invalid level.
    pub fn get(&self, level: usize, entry: &Entry) -> LadderResult<Option<Mark>> {
        Ok(self.level(level)?.get(entry).map(|mark| *mark))
    }

    /// Insert or overwrite `entry` at `level`.
    ///
    /// # Errors
    ///
    /// [`LadderError::LevelOutOfRange`] for an invalid level.
    pub fn set(&self, level: usize, entry: &Entry, mark: Mark) -> LadderResult<()> {
        self.level(level)?.insert(entry.clone(), mark);
        Ok(())
    }

    /// Remove `entry` from `level`; absent keys are ignored.
    ///
    /// # Errors
    ///
    /// [`LadderError::LevelOutOfRange`] for an invalid level.
    pub fn remove(&self, level: usize, entry: &Entry) -> LadderResult<()> {
        self.level(level)?.remove(entry);
        Ok(())
    }

    /// Number of keys at `level`.
    ///
    /// Not a consistent snapshot while workers are still writing.
    ///
    /// # Errors
    ///
    /// [`LadderError::LevelOutOfRange`] for an invalid level.
    pub fn count(&self, level: usize) -> LadderResult<usize> {
        Ok(self.level(level)?.len())
    }

    /// Key counts for every level, bottom first.
    #[must_use]
    pub fn counts(&self) -> Vec<usize> {
        self.levels.iter().map(|level| level.len()).collect()
    }

    /// Levels at or above 1 that currently contain `entry`.
    #[must_use]
    pub fn occupancy(&self, entry: &Entry) -> Vec<usize> {
        self.levels
            .iter()
            .enumerate()
            .skip(1)
            .filter(|(_, level)| level.contains_key(entry))
            .map(|(index, _)| index)
            .collect()
    }

    /// Apply the promote-on-collision protocol for one drawn entry.
    ///
    /// Each step is a separate atomic ladder operation; no lock is held
    /// across steps. Races on the same entry are arbitrated solely by the
    /// level-0 `set_if_absent`. Races for the terminal level are arbitrated by
    /// the seal: the loser writes nothing and gets [`Promotion::Sealed`].
    ///
    /// # Errors
    ///
    /// [`LadderError::LevelOutOfRange`] if a pointer ever points past the top.
    pub fn record_draw(&self, entry: &Entry) -> LadderResult<Promotion> {
        if self.is_sealed() {
            return Ok(Promotion::Sealed);
        }
        if self.set_if_absent(0, entry, Mark::Pointer(0))? {
            return Ok(Promotion::First);
        }

        // Level-0 keys are never removed, so a repeat always finds a pointer.
        let from = self.get(0, entry)?.and_then(Mark::pointer).unwrap_or(0);
        let to = from + 1;
        let terminal = self.terminal_level();

        if to == terminal
            && self
                .sealed
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            trace!(%entry, from, "terminal promotion refused, ladder sealed");
            return Ok(Promotion::Sealed);
        }

        self.set(to, entry, Mark::Present)?;
        if to < terminal {
            self.set(0, entry, Mark::Pointer(to))?;
        }
        if from != 0 {
            self.remove(from, entry)?;
        }

        trace!(%entry, from, to, "promoted");
        if to == terminal {
            Ok(Promotion::Terminal { from })
        } else {
            Ok(Promotion::Advanced { from, to })
        }
    }
}

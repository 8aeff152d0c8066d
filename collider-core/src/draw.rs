//! Random draw sources.
//!
//! Every draw is a uniform integer in `[0, ceiling)` rendered as an [`Entry`].
//! The production source reads the operating system CSPRNG and fails loudly
//! when it cannot; there is no fallback to a weaker generator.
//!
//! Since the ceiling is always a power of two, a uniform draw is exactly the
//! low `d` bits of a uniform byte string, so no rejection sampling is needed.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

use num_bigint::BigUint;
use rand::rngs::OsRng;
use rand::RngCore;

use crate::{Bound, Ceiling, DrawError, DrawResult, Entry};

/// A source of uniformly distributed entries.
///
/// Each worker owns one source, so implementations only need `Send`.
pub trait DrawSource: Send {
    /// Draw one value in `[0, ceiling)`.
    ///
    /// # Errors
    ///
    /// [`DrawError::Entropy`] and [`DrawError::OutOfRange`] are fatal to the
    /// trial. [`DrawError::Exhausted`] means the source has nothing left to
    /// offer and the worker should exit quietly.
    fn draw(&mut self, ceiling: &Ceiling) -> DrawResult<Entry>;
}

/// Draws from the operating system CSPRNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsDrawSource;

impl OsDrawSource {
    /// Create a new OS-backed source.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn fill(dest: &mut [u8]) -> DrawResult<()> {
        OsRng
            .try_fill_bytes(dest)
            .map_err(|err| DrawError::Entropy(err.to_string()))
    }
}

impl DrawSource for OsDrawSource {
    fn draw(&mut self, ceiling: &Ceiling) -> DrawResult<Entry> {
        let len = ceiling.byte_len();
        match ceiling.bound() {
            Bound::Native(bound) => {
                let mut buf = [0u8; 8];
                Self::fill(&mut buf[..len])?;
                Ok(Entry::from_u64(u64::from_le_bytes(buf) & (bound - 1)))
            }
            Bound::Big(_) => {
                let mut buf = vec![0u8; len];
                Self::fill(&mut buf)?;
                let excess = len * 8 - ceiling.difficulty() as usize;
                if let Some(top) = buf.last_mut() {
                    *top &= 0xFF >> excess;
                }
                Ok(Entry::from_biguint(&BigUint::from_bytes_le(&buf)))
            }
        }
    }
}

/// A pre-scripted sequence of draws.
///
/// Clones share the same queue, so several workers can consume one script
/// between them; build separate instances for independent per-worker scripts.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDraws {
    queue: Arc<Mutex<VecDeque<u64>>>,
}

impl ScriptedDraws {
    /// Create a script from a sequence of values.
    pub fn new<I>(values: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        Self {
            queue: Arc::new(Mutex::new(values.into_iter().collect())),
        }
    }

    /// Number of values not yet drawn.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl DrawSource for ScriptedDraws {
    fn draw(&mut self, ceiling: &Ceiling) -> DrawResult<Entry> {
        let next = self
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        let value = next.ok_or(DrawError::Exhausted)?;
        if !ceiling.admits(value) {
            return Err(DrawError::OutOfRange {
                value: value.to_string(),
                ceiling: ceiling.to_string(),
            });
        }
        Ok(Entry::from_u64(value))
    }
}

impl<S: DrawSource + ?Sized> DrawSource for Box<S> {
    fn draw(&mut self, ceiling: &Ceiling) -> DrawResult<Entry> {
        (**self).draw(ceiling)
    }
}

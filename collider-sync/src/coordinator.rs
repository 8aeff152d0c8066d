//! Exactly-once completion and stop broadcast for one trial.
//!
//! Workers hold a [`WorkerSignal`]; the trial driver holds the
//! [`Coordinator`]. Both channels are bounded to one slot per worker, so no
//! send on either side can ever block:
//!
//! - completion: a worker that reaches the terminal condition (or fails)
//!   reports it with `try_send`. Even if every worker finishes at once there is
//!   room for all of them.
//! - stop: the coordinator pushes one token per worker. Each worker consumes at
//!   most one token and then exits.
//!
//! Only the first completion moves the trial to `SolutionFound`. Anything
//! arriving later is drained after the join and reported as redundant.

use std::cell::Cell;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use collider_core::{CollisionError, Entry, TrialPhase};
use crossbeam::channel::{self, Receiver, Sender, TryRecvError, TrySendError};
use tracing::{debug, trace, warn};

use crate::PhaseCell;

/// What a worker reports when it stops on its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// The worker promoted `entry` to the terminal level
    Solved {
        /// Reporting worker
        worker: usize,
        /// The entry that reached `k` occurrences
        entry: Entry,
    },
    /// The worker hit a fatal error
    Failed {
        /// Reporting worker
        worker: usize,
        /// The failure
        error: CollisionError,
    },
}

impl Completion {
    /// Index of the reporting worker.
    pub fn worker(&self) -> usize {
        match self {
            Self::Solved { worker, .. } | Self::Failed { worker, .. } => *worker,
        }
    }
}

/// Worker-side half of the coordinator.
#[derive(Debug)]
pub struct WorkerSignal {
    worker: usize,
    done_tx: Sender<Completion>,
    stop_rx: Receiver<()>,
    stopped: Cell<bool>,
}

impl WorkerSignal {
    /// Index of the worker owning this signal.
    pub fn worker(&self) -> usize {
        self.worker
    }

    /// Non-blocking check for a stop token.
    ///
    /// Once a token has been observed the signal stays stopped. A coordinator
    /// that has gone away counts as a stop.
    pub fn should_stop(&self) -> bool {
        if self.stopped.get() {
            return true;
        }
        let stop = match self.stop_rx.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => true,
            Err(TryRecvError::Empty) => false,
        };
        self.stopped.set(stop);
        stop
    }

    /// Report a completion unless the trial is already being cancelled.
    ///
    /// Returns `true` if the notification was delivered. Never blocks.
    pub fn notify(&self, completion: Completion) -> bool {
        if self.should_stop() {
            trace!(worker = self.worker, "stop already broadcast, not notifying");
            return false;
        }
        match self.done_tx.try_send(completion) {
            Ok(()) => true,
            Err(TrySendError::Full(completion)) => {
                warn!(worker = self.worker, ?completion, "completion channel full, dropping");
                false
            }
            Err(TrySendError::Disconnected(_)) => false,
        }
    }
}

/// Result of draining a coordinator after every worker has been joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoordinatorSummary {
    /// Phase after draining (always `Drained`)
    pub phase: TrialPhase,
    /// Number of `SolutionFound` transitions (0 or 1)
    pub solutions: usize,
    /// Completions that arrived after the first and were absorbed
    pub redundant: usize,
}

/// Driver-side half: awaits the first completion and broadcasts stop.
#[derive(Debug)]
pub struct Coordinator {
    workers: usize,
    done_rx: Receiver<Completion>,
    stop_tx: Sender<()>,
    phase: PhaseCell,
    broadcast: AtomicBool,
    solutions: AtomicUsize,
}

impl Coordinator {
    /// Create a coordinator and one signal per worker.
    pub fn new(workers: usize) -> (Self, Vec<WorkerSignal>) {
        let capacity = workers.max(1);
        let (done_tx, done_rx) = channel::bounded(capacity);
        let (stop_tx, stop_rx) = channel::bounded(capacity);

        let signals = (0..workers)
            .map(|worker| WorkerSignal {
                worker,
                done_tx: done_tx.clone(),
                stop_rx: stop_rx.clone(),
                stopped: Cell::new(false),
            })
            .collect();

        let coordinator = Self {
            workers,
            done_rx,
            stop_tx,
            phase: PhaseCell::new(),
            broadcast: AtomicBool::new(false),
            solutions: AtomicUsize::new(0),
        };
        (coordinator, signals)
    }

    /// Current trial phase.
    pub fn phase(&self) -> TrialPhase {
        self.phase.load()
    }

    /// Block until the first completion.
    ///
    /// Returns `None` once every worker has exited without reporting.
    pub fn await_completion(&self) -> Option<Completion> {
        let completion = self.done_rx.recv().ok()?;
        self.record(&completion);
        Some(completion)
    }

    fn record(&self, completion: &Completion) {
        if let Completion::Solved { worker, entry } = completion {
            if self
                .phase
                .transition(TrialPhase::Running, TrialPhase::SolutionFound)
            {
                self.solutions.fetch_add(1, Ordering::AcqRel);
                debug!(worker, %entry, "solution found");
            }
        }
    }

    /// Push one stop token per worker. Idempotent.
    ///
    /// Returns the number of tokens pushed by this call.
    pub fn broadcast_stop(&self) -> usize {
        if self.broadcast.swap(true, Ordering::AcqRel) {
            return 0;
        }
        self.phase.advance_to(TrialPhase::Cancelling);
        let sent = (0..self.workers)
            .take_while(|_| self.stop_tx.try_send(()).is_ok())
            .count();
        debug!(workers = self.workers, sent, "stop broadcast");
        sent
    }

    /// Mark the trial drained and absorb late completions.
    ///
    /// Call only after every worker has been joined.
    pub fn drain(self) -> CoordinatorSummary {
        self.broadcast_stop();
        let redundant = self.done_rx.try_iter().count();
        if redundant > 0 {
            debug!(redundant, "absorbed late completions");
        }
        self.phase.advance_to(TrialPhase::Drained);
        CoordinatorSummary {
            phase: self.phase.load(),
            solutions: self.solutions.load(Ordering::Acquire),
            redundant,
        }
    }
}

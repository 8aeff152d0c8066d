//! A single collision-search worker.

use collider_core::{Ceiling, CollisionError, CollisionResult, DrawError, DrawSource, Entry};
use collider_ladder::{Ladder, Promotion};
use collider_sync::{Completion, WorkerSignal};
use tracing::trace;

/// Outcome of one protocol iteration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// The draw did not satisfy the trial
    Continue(Promotion),
    /// The drawn entry reached the terminal level
    Terminal(Entry),
    /// The trial was already decided by another entry; the draw was discarded
    Sealed,
}

/// Why a worker stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkerExit {
    /// Reached the terminal condition and notified the coordinator
    Solved,
    /// Observed a stop token, found the trial already decided, or reached
    /// the terminal condition after cancellation had already begun
    Stopped,
    /// Its draw source ran dry
    Exhausted,
    /// Hit a fatal error and reported it
    Failed(CollisionError),
}

/// Summary of a finished worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerReport {
    /// Worker index
    pub worker: usize,
    /// Draws this worker performed
    pub draws: u64,
    /// Why it stopped
    pub exit: WorkerExit,
}

/// Draws values and promotes them on the shared ladder until told to stop.
pub struct Worker<'a, S> {
    ladder: &'a Ladder,
    ceiling: &'a Ceiling,
    source: S,
    signal: WorkerSignal,
    draws: u64,
}

impl<'a, S: DrawSource> Worker<'a, S> {
    /// Create a worker bound to one trial's ladder and ceiling.
    pub fn new(ladder: &'a Ladder, ceiling: &'a Ceiling, source: S, signal: WorkerSignal) -> Self {
        Self {
            ladder,
            ceiling,
            source,
            signal,
            draws: 0,
        }
    }

    /// Worker index.
    pub fn id(&self) -> usize {
        self.signal.worker()
    }

    /// Draws performed so far.
    pub fn draws(&self) -> u64 {
        self.draws
    }

    /// Draw once and apply the promote-on-collision protocol.
    ///
    /// Does not look at the stop signal; [`Worker::run`] polls it before each
    /// step.
    ///
    /// # Errors
    ///
    /// Draw failures are wrapped in [`CollisionError::Draw`]; ladder failures
    /// in [`CollisionError::Ladder`].
    pub fn step(&mut self) -> CollisionResult<Step> {
        let entry = self
            .source
            .draw(self.ceiling)
            .map_err(|source| CollisionError::Draw {
                worker: self.id(),
                source,
            })?;
        self.draws += 1;

        match self.ladder.record_draw(&entry)? {
            Promotion::Terminal { .. } => Ok(Step::Terminal(entry)),
            Promotion::Sealed => Ok(Step::Sealed),
            promotion => Ok(Step::Continue(promotion)),
        }
    }

    /// Report a terminal entry to the coordinator.
    ///
    /// If cancellation has already been broadcast the worker stops without
    /// notifying, so only one of several simultaneous finishers is heard.
    pub fn conclude(&self, entry: Entry) -> WorkerExit {
        let worker = self.id();
        if self.signal.notify(Completion::Solved { worker, entry }) {
            WorkerExit::Solved
        } else {
            WorkerExit::Stopped
        }
    }

    /// Run until the terminal condition, a stop token, or a fatal error.
    pub fn run(mut self) -> WorkerReport {
        let exit = loop {
            if self.signal.should_stop() {
                break WorkerExit::Stopped;
            }
            match self.step() {
                Ok(Step::Continue(_)) => {}
                Ok(Step::Terminal(entry)) => break self.conclude(entry),
                Ok(Step::Sealed) => break WorkerExit::Stopped,
                Err(CollisionError::Draw {
                    source: DrawError::Exhausted,
                    ..
                }) => break WorkerExit::Exhausted,
                Err(error) => {
                    let worker = self.id();
                    self.signal.notify(Completion::Failed {
                        worker,
                        error: error.clone(),
                    });
                    break WorkerExit::Failed(error);
                }
            }
        };

        trace!(worker = self.id(), draws = self.draws, ?exit, "worker exited");
        WorkerReport {
            worker: self.id(),
            draws: self.draws,
            exit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use collider_core::{ScriptedDraws, TrialPhase};
    use collider_ladder::Record;
    use collider_sync::Coordinator;

    #[test]
    fn test_step_reports_promotions() {
        let ladder = Ladder::new(3);
        let ceiling = Ceiling::from_difficulty(4).unwrap();
        let (_coordinator, mut signals) = Coordinator::new(1);
        let signal = signals.remove(0);
        let mut worker = Worker::new(&ladder, &ceiling, ScriptedDraws::new([5, 5, 9, 5]), signal);

        assert_eq!(worker.step().unwrap(), Step::Continue(Promotion::First));
        assert_eq!(
            worker.step().unwrap(),
            Step::Continue(Promotion::Advanced { from: 0, to: 1 })
        );
        assert_eq!(worker.step().unwrap(), Step::Continue(Promotion::First));
        assert_eq!(worker.step().unwrap(), Step::Terminal(Entry::from_u64(5)));
        assert_eq!(worker.draws(), 4);
    }

    #[test]
    fn test_run_solves_and_notifies() {
        let ladder = Ladder::new(2);
        let ceiling = Ceiling::from_difficulty(4).unwrap();
        let (coordinator, mut signals) = Coordinator::new(1);
        let worker = Worker::new(&ladder, &ceiling, ScriptedDraws::new([3, 7, 3]), signals.remove(0));

        let report = worker.run();
        assert_eq!(report.exit, WorkerExit::Solved);
        assert_eq!(report.draws, 3);
        assert_eq!(
            coordinator.await_completion(),
            Some(Completion::Solved {
                worker: 0,
                entry: Entry::from_u64(3),
            })
        );
        assert_eq!(coordinator.phase(), TrialPhase::SolutionFound);
    }

    #[test]
    fn test_run_stops_before_drawing() {
        let ladder = Ladder::new(2);
        let ceiling = Ceiling::from_difficulty(4).unwrap();
        let (coordinator, mut signals) = Coordinator::new(1);
        coordinator.broadcast_stop();
        let script = ScriptedDraws::new([1, 1]);
        let worker = Worker::new(&ladder, &ceiling, script.clone(), signals.remove(0));

        let report = worker.run();
        assert_eq!(report.exit, WorkerExit::Stopped);
        assert_eq!(report.draws, 0);
        assert_eq!(script.remaining(), 2);
    }

    #[test]
    fn test_exhausted_source_exits_quietly() {
        let ladder = Ladder::new(2);
        let ceiling = Ceiling::from_difficulty(4).unwrap();
        let (coordinator, mut signals) = Coordinator::new(1);
        let worker = Worker::new(&ladder, &ceiling, ScriptedDraws::new([1, 2]), signals.remove(0));

        let report = worker.run();
        assert_eq!(report.exit, WorkerExit::Exhausted);
        assert_eq!(report.draws, 2);
        assert_eq!(coordinator.await_completion(), None);
    }

    #[test]
    fn test_late_finisher_is_not_counted() {
        let ladder = Ladder::new(2);
        let ceiling = Ceiling::from_difficulty(4).unwrap();
        let (coordinator, mut signals) = Coordinator::new(2);
        let second = signals.pop().unwrap();
        let first = signals.pop().unwrap();
        let mut a = Worker::new(&ladder, &ceiling, ScriptedDraws::new([1, 1]), first);
        let mut b = Worker::new(&ladder, &ceiling, ScriptedDraws::new([2, 2]), second);

        assert_eq!(a.step().unwrap(), Step::Continue(Promotion::First));
        let Step::Terminal(found) = a.step().unwrap() else {
            panic!("worker 0 should reach the terminal level");
        };
        assert_eq!(a.conclude(found), WorkerExit::Solved);
        assert_eq!(
            coordinator.await_completion().map(|done| done.worker()),
            Some(0)
        );
        coordinator.broadcast_stop();

        // Worker 1 was already past its stop poll; its draws must not land.
        assert_eq!(b.step().unwrap(), Step::Sealed);
        assert_eq!(b.step().unwrap(), Step::Sealed);
        assert_eq!(b.draws(), 2);
        drop((a, b));

        let summary = coordinator.drain();
        assert_eq!(summary.solutions, 1);
        assert_eq!(summary.redundant, 0);
        let record = Record::from_drained(&ladder, summary.phase).unwrap();
        assert_eq!(record.counts(), &[0, 1]);
        assert_eq!(record.total_draws(), 2);
    }

    #[test]
    fn test_simultaneous_finishers_yield_one_terminal_entry() {
        let ladder = Ladder::new(2);
        let ceiling = Ceiling::from_difficulty(4).unwrap();
        let (coordinator, mut signals) = Coordinator::new(2);
        let second = signals.pop().unwrap();
        let first = signals.pop().unwrap();
        let mut a = Worker::new(&ladder, &ceiling, ScriptedDraws::new([1, 2]), first);
        let mut b = Worker::new(&ladder, &ceiling, ScriptedDraws::new([2, 1]), second);

        assert_eq!(a.step().unwrap(), Step::Continue(Promotion::First));
        assert_eq!(b.step().unwrap(), Step::Continue(Promotion::First));
        let Step::Terminal(found) = a.step().unwrap() else {
            panic!("worker 0 should reach the terminal level");
        };
        // Both entries are now repeats, but only the first may finish.
        assert_eq!(b.step().unwrap(), Step::Sealed);

        assert_eq!(a.conclude(found), WorkerExit::Solved);
        assert_eq!(
            coordinator.await_completion(),
            Some(Completion::Solved {
                worker: 0,
                entry: Entry::from_u64(2),
            })
        );
        drop((a, b));

        let summary = coordinator.drain();
        assert_eq!(summary.phase, TrialPhase::Drained);
        assert_eq!(summary.solutions, 1);
        assert_eq!(ladder.counts(), vec![2, 1]);
    }

    #[test]
    fn test_run_stops_on_sealed_ladder() {
        let ladder = Ladder::new(2);
        let ceiling = Ceiling::from_difficulty(4).unwrap();
        ladder.record_draw(&Entry::from_u64(4)).unwrap();
        ladder.record_draw(&Entry::from_u64(4)).unwrap();
        let (coordinator, mut signals) = Coordinator::new(1);
        let worker = Worker::new(&ladder, &ceiling, ScriptedDraws::new([7, 7]), signals.remove(0));

        let report = worker.run();
        assert_eq!(report.exit, WorkerExit::Stopped);
        assert_eq!(report.draws, 1);
        assert_eq!(coordinator.await_completion(), None);
    }

    #[test]
    fn test_out_of_range_draw_is_reported() {
        let ladder = Ladder::new(2);
        let ceiling = Ceiling::from_difficulty(2).unwrap();
        let (coordinator, mut signals) = Coordinator::new(1);
        let worker = Worker::new(&ladder, &ceiling, ScriptedDraws::new([9]), signals.remove(0));

        let report = worker.run();
        assert!(matches!(
            report.exit,
            WorkerExit::Failed(CollisionError::Draw {
                worker: 0,
                source: DrawError::OutOfRange { .. },
            })
        ));
        assert!(matches!(
            coordinator.await_completion(),
            Some(Completion::Failed { worker: 0, .. })
        ));
    }
}

//! # Simulation Driver
//!
//! Reference implementation of the driver side of the scheduling
//! contract: an agenda of wake-ups ordered by time and arrival, replayed
//! against a [`ResourceScheduler`]. Each request that does not finish is
//! re-posted at the time the scheduler asked to be invoked again, and so
//! is every tick whose reschedule returned a finite time.

use crate::scheduler::ResourceScheduler;
use crate::task::TaskId;
use crate::time::{Duration, Instant};
use crate::SchedResult;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;

/// Default bound on processed wake-ups per `run_until`
pub const DEFAULT_MAX_STEPS: usize = 100_000;

/// Something the driver must do at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wakeup {
    /// A task asks to run
    Request {
        /// Requesting task
        task: TaskId,
        /// Deadline passed to the scheduler
        deadline: Instant,
    },
    /// Generic reschedule tick
    Tick,
}

/// A task completion observed by the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    /// Finished task
    pub task: TaskId,
    /// Time of completion
    pub time: Instant,
}

/// Outcome of one `run_until`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Wake-ups processed
    pub steps: usize,
    /// Time of the last processed wake-up
    pub now: Instant,
    /// True if the step bound stopped the run early
    pub exhausted: bool,
}

/// Driver loop around one scheduler
#[derive(Debug)]
pub struct SimulationDriver<S: ResourceScheduler> {
    scheduler: S,
    agenda: BTreeMap<(Instant, u64), Wakeup>,
    next_seq: u64,
    now: Instant,
    completions: Vec<Completion>,
    max_steps: usize,
}

impl<S: ResourceScheduler> SimulationDriver<S> {
    /// Wrap a configured scheduler
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            agenda: BTreeMap::new(),
            next_seq: 0,
            now: Instant::ZERO,
            completions: Vec::new(),
            max_steps: DEFAULT_MAX_STEPS,
        }
    }

    /// Bound the number of wake-ups processed per `run_until`
    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    /// Start a run
    pub fn start(&mut self) -> SchedResult<()> {
        self.agenda.clear();
        self.completions.clear();
        self.now = Instant::ZERO;
        self.scheduler.initialize()
    }

    /// Post a request for `task` at `at` with no deadline
    pub fn request(&mut self, task: TaskId, at: Instant) {
        self.request_with_deadline(task, at, Instant::INFINITY);
    }

    /// Post a request for `task` at `at`
    pub fn request_with_deadline(&mut self, task: TaskId, at: Instant, deadline: Instant) {
        self.post(at, Wakeup::Request { task, deadline });
    }

    /// Post a reschedule tick
    pub fn tick(&mut self, at: Instant) {
        self.post(at, Wakeup::Tick);
    }

    /// Process every wake-up up to and including `limit`
    pub fn run_until(&mut self, limit: Instant) -> SchedResult<RunSummary> {
        let mut steps = 0;
        while let Some((&(time, seq), _)) = self.agenda.first_key_value() {
            if time > limit {
                break;
            }
            if steps == self.max_steps {
                log::warn!(
                    "[driver] Step bound {} reached at {}; stopping",
                    self.max_steps,
                    self.now
                );
                return Ok(RunSummary { steps, now: self.now, exhausted: true });
            }
            let Some(wakeup) = self.agenda.remove(&(time, seq)) else {
                break;
            };
            self.now = time;
            steps += 1;

            match wakeup {
                Wakeup::Request { task, deadline } => {
                    let next = self.scheduler.schedule(task, time, deadline)?;
                    if self.scheduler.last_task_finished() {
                        log::trace!("[driver] Task {} finished at {}", task, time);
                        self.completions.push(Completion { task, time });
                    } else if !next.is_infinite() {
                        self.post(time + next, Wakeup::Request { task, deadline });
                    }
                }
                Wakeup::Tick => {
                    let next = self.scheduler.reschedule(time)?;
                    if !next.is_infinite() {
                        self.post(time + next, Wakeup::Tick);
                    }
                }
            }
        }
        Ok(RunSummary { steps, now: self.now, exhausted: false })
    }

    /// End the run
    pub fn finish(&mut self) -> SchedResult<()> {
        self.scheduler.wrapup()
    }

    /// Completions observed so far, in order
    pub fn completions(&self) -> &[Completion] {
        &self.completions
    }

    /// Time of the first completion of `task`, if any
    pub fn completion_time(&self, task: TaskId) -> Option<Instant> {
        self.completions.iter().find(|c| c.task == task).map(|c| c.time)
    }

    /// Pending wake-ups
    pub fn pending(&self) -> usize {
        self.agenda.len()
    }

    /// The driven scheduler
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    /// The driven scheduler (mutable)
    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Give back the scheduler
    pub fn into_inner(self) -> S {
        self.scheduler
    }

    fn post(&mut self, at: Instant, wakeup: Wakeup) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.agenda.insert((at, seq), wakeup);
    }
}

/// Relative time to the next wake-up a set of schedulers asked for
pub fn earliest(durations: impl IntoIterator<Item = Duration>) -> Duration {
    durations.into_iter().min().unwrap_or(Duration::INFINITY)
}

//! # Scheduler Traits
//!
//! Defines the protocol every resource scheduler implements.

use super::{Lifecycle, SchedulerCore};
use crate::events::{EventKind, EventMask, EventSink, ListenerId};
use crate::metrics::SchedulerMetrics;
use crate::task::{TaskConfig, TaskId};
use crate::time::{Duration, Instant};
use crate::SchedResult;
use alloc::boxed::Box;
use alloc::vec::Vec;
use static_assertions::assert_obj_safe;

/// The resource scheduler protocol
///
/// A driver calls [`initialize`](Self::initialize) once per run, then
/// [`schedule`](Self::schedule) whenever a task wants to run and
/// [`reschedule`](Self::reschedule) when a previously returned relative
/// time has elapsed, and finally [`wrapup`](Self::wrapup). Every
/// scheduling call returns the relative time after which the scheduler
/// wants to be invoked again.
///
/// Policies provide [`dispatch`](Self::dispatch); the rest of the
/// protocol is shared and lives on [`SchedulerCore`].
pub trait ResourceScheduler {
    /// Shared bookkeeping
    fn core(&self) -> &SchedulerCore;

    /// Shared bookkeeping (mutable)
    fn core_mut(&mut self) -> &mut SchedulerCore;

    /// Get the scheduler name
    fn name(&self) -> &str {
        self.core().name()
    }

    /// Register or replace a task's configuration
    fn configure(&mut self, task: TaskId, config: TaskConfig) -> SchedResult<()> {
        self.core_mut().configure(task, config)
    }

    /// Configuration held for a task
    fn task_config(&self, task: TaskId) -> Option<&TaskConfig> {
        self.core().task_config(task)
    }

    /// Start a simulation run: reset all per-task state and discover the
    /// enabled tasks
    fn initialize(&mut self) -> SchedResult<()> {
        self.core_mut().initialize()
    }

    /// Start a simulation run from a complete configuration table
    ///
    /// The table replaces every configuration registered so far.
    fn initialize_with(&mut self, configs: Vec<(TaskId, TaskConfig)>) -> SchedResult<()> {
        self.core_mut().replace_configs(configs);
        self.initialize()
    }

    /// A task requests to run at `now`
    ///
    /// The deadline is passed through to the policy; none of the bundled
    /// policies enforce it.
    fn schedule(&mut self, task: TaskId, now: Instant, deadline: Instant) -> SchedResult<Duration> {
        let core = self.core_mut();
        core.ensure_running("schedule")?;
        core.ensure_registered(task)?;
        core.metrics_mut().record_request();
        let execution_time = core.execution_time(task);
        core.emit_self(now, Some(EventKind::Start));
        core.emit_self(now, Some(EventKind::Stop));

        let next = self.dispatch(task, now, deadline, execution_time)?;
        Ok(next.unwrap_or(Duration::INFINITY))
    }

    /// No new request arrived but earlier work may be pending
    fn reschedule(&mut self, _now: Instant) -> SchedResult<Duration> {
        self.core().ensure_running("reschedule")?;
        Ok(Duration::INFINITY)
    }

    /// Dispatch primitive of the policy
    ///
    /// Returns `None` when the policy has no opinion on the next
    /// invocation. Composite schedulers call this directly on their
    /// children.
    fn dispatch(
        &mut self,
        _task: TaskId,
        _now: Instant,
        _deadline: Instant,
        _execution_time: Duration,
    ) -> SchedResult<Option<Duration>> {
        self.core_mut().set_last_finished(false);
        Ok(None)
    }

    /// Remaining execution time of a task, `None` if not running here
    fn remaining_time(&self, task: TaskId) -> Option<Duration> {
        self.core().remaining_time(task)
    }

    /// Did the most recent dispatch complete the requested task?
    fn last_task_finished(&self) -> bool {
        self.core().last_finished()
    }

    /// Finish the run
    fn wrapup(&mut self) -> SchedResult<()> {
        self.core_mut().wrapup()
    }

    /// Attach an event sink receiving the kinds in `mask`
    fn add_listener(&mut self, sink: Box<dyn EventSink>, mask: EventMask) -> ListenerId {
        self.core_mut().add_listener(sink, mask)
    }

    /// Detach an event sink
    fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.core_mut().remove_listener(id)
    }

    /// Activity counters for the current run
    fn metrics(&self) -> &SchedulerMetrics {
        self.core().metrics()
    }

    /// Current lifecycle state
    fn lifecycle(&self) -> Lifecycle {
        self.core().lifecycle()
    }
}

assert_obj_safe!(ResourceScheduler);

/// Scheduler with no dispatch policy
///
/// Accepts requests and never asks to be invoked again. Useful as a
/// placeholder resource and as the reference for the shared protocol.
#[derive(Debug)]
pub struct PassiveScheduler {
    core: SchedulerCore,
}

impl PassiveScheduler {
    /// Create a passive scheduler
    pub fn new(name: &str) -> Self {
        Self { core: SchedulerCore::new(name) }
    }
}

impl ResourceScheduler for PassiveScheduler {
    fn core(&self) -> &SchedulerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SchedulerCore {
        &mut self.core
    }
}

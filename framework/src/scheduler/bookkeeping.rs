//! # Scheduler Bookkeeping
//!
//! State every resource scheduler carries regardless of policy: task
//! configuration, the discovered task set, remaining times, timestamps,
//! lifecycle, event sinks and metrics.

use super::Lifecycle;
use crate::events::{EventBus, EventKind, EventMask, EventSink, ListenerId, ScheduleEvent};
use crate::metrics::SchedulerMetrics;
use crate::priority::Priority;
use crate::task::{TaskConfig, TaskId};
use crate::time::{Duration, Instant};
use crate::{SchedError, SchedResult};
use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;

/// Per-task state known to one scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TaskState {
    /// Validated nominal execution time
    execution_time: Duration,
    /// `None` while the task is not running on this scheduler
    remaining: Option<Duration>,
    /// When `remaining` was last brought up to date
    last_scheduled: Option<Instant>,
}

/// Shared scheduler state
#[derive(Debug)]
pub struct SchedulerCore {
    /// Scheduler name (diagnostics and events)
    name: String,
    /// Configuration in registration order
    configs: Vec<(TaskId, TaskConfig)>,
    /// Tasks discovered at the last `initialize`, in registration order
    tasks: Vec<TaskId>,
    /// State of discovered tasks
    states: HashMap<TaskId, TaskState>,
    /// Did the most recent dispatch complete the requested task?
    last_finished: bool,
    /// Latest environment time observed this run
    clock: Option<Instant>,
    /// Lifecycle state
    lifecycle: Lifecycle,
    /// Attached sinks
    events: EventBus,
    /// Activity counters
    metrics: SchedulerMetrics,
}

impl SchedulerCore {
    /// Create bookkeeping for a scheduler with no configured tasks
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            configs: Vec::new(),
            tasks: Vec::new(),
            states: HashMap::new(),
            last_finished: false,
            clock: None,
            lifecycle: Lifecycle::Configured,
            events: EventBus::new(),
            metrics: SchedulerMetrics::new(),
        }
    }

    /// Scheduler name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current lifecycle state
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Register or replace the configuration of a task
    ///
    /// Invalid values are rejected here, before any simulation time
    /// passes. The change takes effect at the next `initialize`.
    pub fn configure(&mut self, task: TaskId, config: TaskConfig) -> SchedResult<()> {
        config.validate(task)?;
        match self.configs.iter_mut().find(|(id, _)| *id == task) {
            Some((_, existing)) => *existing = config,
            None => self.configs.push((task, config)),
        }
        Ok(())
    }

    /// Configuration of a task, if any
    pub fn task_config(&self, task: TaskId) -> Option<&TaskConfig> {
        self.configs.iter().find(|(id, _)| *id == task).map(|(_, c)| c)
    }

    /// Replace the whole configuration table
    ///
    /// Entries are not checked here; the next `initialize` rejects the
    /// table if any of them is invalid.
    pub fn replace_configs(&mut self, configs: Vec<(TaskId, TaskConfig)>) {
        self.configs = configs;
    }

    /// Reset all per-run state and discover the enabled tasks
    ///
    /// Fails without touching the previous run's state if any
    /// configuration is invalid.
    pub fn initialize(&mut self) -> SchedResult<()> {
        let mut tasks = Vec::new();
        let mut states = HashMap::new();
        for (task, config) in &self.configs {
            let execution_time = config.validate(*task)?;
            if !config.enabled {
                continue;
            }
            tasks.push(*task);
            states.insert(
                *task,
                TaskState { execution_time, remaining: None, last_scheduled: None },
            );
        }

        self.tasks = tasks;
        self.states = states;
        self.last_finished = false;
        self.clock = None;
        self.lifecycle = Lifecycle::Running;
        self.metrics.reset();

        self.events.initialize(&self.name, &self.tasks);
        for task in &self.tasks {
            self.events.emit(&self.name, ScheduleEvent::task(*task, Instant::ZERO, None));
        }

        log::info!("[{}] Initialized with {} enabled tasks", self.name, self.tasks.len());
        Ok(())
    }

    /// Finish the run
    pub fn wrapup(&mut self) -> SchedResult<()> {
        self.ensure_running("wrap up")?;
        let time = self.clock.unwrap_or(Instant::ZERO);
        for task in &self.tasks {
            self.events.emit(&self.name, ScheduleEvent::task(*task, time, None));
        }
        self.lifecycle = Lifecycle::WrappedUp;
        log::info!(
            "[{}] Wrapped up: {} requests, {} completions, {} preemptions",
            self.name,
            self.metrics.requests(),
            self.metrics.completions(),
            self.metrics.preemptions()
        );
        Ok(())
    }

    /// Fail unless the scheduler is between `initialize` and `wrapup`
    pub fn ensure_running(&self, operation: &'static str) -> SchedResult<()> {
        if self.lifecycle == Lifecycle::Running {
            Ok(())
        } else {
            Err(SchedError::IllegalState {
                scheduler: self.name.clone(),
                state: self.lifecycle,
                operation,
            })
        }
    }

    /// Fail unless the task was discovered at `initialize`
    pub fn ensure_registered(&self, task: TaskId) -> SchedResult<()> {
        if self.states.contains_key(&task) {
            Ok(())
        } else {
            Err(SchedError::UnregisteredTask { scheduler: self.name.clone(), task })
        }
    }

    /// Record a new environment time, rejecting regressions
    pub fn advance_clock(&mut self, now: Instant) -> SchedResult<()> {
        match self.clock {
            Some(last) if now < last => Err(SchedError::TemporalOrdering {
                scheduler: self.name.clone(),
                last,
                now,
            }),
            _ => {
                self.clock = Some(now);
                Ok(())
            }
        }
    }

    /// Latest environment time observed this run
    pub fn clock(&self) -> Option<Instant> {
        self.clock
    }

    /// Tasks discovered at the last `initialize`
    pub fn tasks(&self) -> &[TaskId] {
        &self.tasks
    }

    /// Is the task discovered on this scheduler?
    pub fn is_registered(&self, task: TaskId) -> bool {
        self.states.contains_key(&task)
    }

    /// Validated execution time of a task (zero if unknown)
    pub fn execution_time(&self, task: TaskId) -> Duration {
        self.states.get(&task).map(|s| s.execution_time).unwrap_or(Duration::ZERO)
    }

    /// Effective priority of a task
    pub fn priority(&self, task: TaskId) -> Priority {
        self.task_config(task)
            .map(TaskConfig::effective_priority)
            .unwrap_or(Priority::LOWEST)
    }

    /// Remaining execution time, `None` if not running here
    pub fn remaining_time(&self, task: TaskId) -> Option<Duration> {
        self.states.get(&task).and_then(|s| s.remaining)
    }

    /// Update the remaining execution time
    ///
    /// A task that is not registered gets a state entry on the fly; the
    /// composite schedulers forward requests straight to a child's
    /// dispatch primitive.
    pub fn set_remaining_time(&mut self, task: TaskId, remaining: Option<Duration>) {
        self.state_mut(task).remaining = remaining;
    }

    /// Timestamp of the last remaining-time update
    pub fn last_scheduled(&self, task: TaskId) -> Option<Instant> {
        self.states.get(&task).and_then(|s| s.last_scheduled)
    }

    /// Refresh the timestamp of a task
    pub fn set_last_scheduled(&mut self, task: TaskId, now: Instant) {
        self.state_mut(task).last_scheduled = Some(now);
    }

    /// Did the most recent dispatch complete the requested task?
    pub fn last_finished(&self) -> bool {
        self.last_finished
    }

    /// Set the completion flag
    pub fn set_last_finished(&mut self, finished: bool) {
        self.last_finished = finished;
    }

    /// Emit an event about a task
    pub fn emit_task(&mut self, task: TaskId, time: Instant, kind: Option<EventKind>) {
        self.events.emit(&self.name, ScheduleEvent::task(task, time, kind));
    }

    /// Emit an event about the scheduler itself
    pub fn emit_self(&mut self, time: Instant, kind: Option<EventKind>) {
        self.events.emit(&self.name, ScheduleEvent::scheduler(time, kind));
    }

    /// Attach a sink
    pub fn add_listener(&mut self, sink: Box<dyn EventSink>, mask: EventMask) -> ListenerId {
        self.events.add(sink, mask, &self.name, &self.tasks)
    }

    /// Detach a sink
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.events.remove(id)
    }

    /// Activity counters
    pub fn metrics(&self) -> &SchedulerMetrics {
        &self.metrics
    }

    /// Activity counters (mutable)
    pub fn metrics_mut(&mut self) -> &mut SchedulerMetrics {
        &mut self.metrics
    }

    fn state_mut(&mut self, task: TaskId) -> &mut TaskState {
        self.states.entry(task).or_insert(TaskState {
            execution_time: Duration::ZERO,
            remaining: None,
            last_scheduled: None,
        })
    }
}

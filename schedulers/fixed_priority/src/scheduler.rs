//! # Fixed-Priority Scheduler Implementation

use crate::FixedPriorityConfig;
use simsched_framework::scheduler::{ResourceScheduler, RunStack, SchedulerCore};
use simsched_framework::{Duration, EventKind, Instant, SchedResult, TaskId};

/// Fixed-Priority Scheduler
///
/// Manages exactly one resource. The task on top of the run stack
/// executes; tasks below it were preempted and resume, with the remaining
/// time they had, once everything above them has completed.
#[derive(Debug)]
pub struct FixedPriorityScheduler {
    /// Shared bookkeeping
    core: SchedulerCore,
    /// Configuration
    config: FixedPriorityConfig,
    /// Tasks holding the resource, executing one on top
    stack: RunStack,
}

impl FixedPriorityScheduler {
    /// Create a new scheduler
    pub fn new(name: &str, config: FixedPriorityConfig) -> Self {
        Self {
            core: SchedulerCore::new(name),
            config,
            stack: RunStack::new(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &FixedPriorityConfig {
        &self.config
    }

    /// The executing task, if any
    pub fn running(&self) -> Option<TaskId> {
        self.stack.top()
    }

    /// All tasks holding the resource, bottom (oldest) first
    pub fn run_stack(&self) -> &RunStack {
        &self.stack
    }

    /// Charge elapsed time to the executing task
    ///
    /// Only the top of the stack is charged. Every entry gets its
    /// timestamp refreshed, so a preempted task's remaining time is
    /// frozen while it is buried.
    fn charge_elapsed(&mut self, now: Instant) -> SchedResult<Option<(TaskId, Duration)>> {
        self.core.advance_clock(now)?;
        let Some(top) = self.stack.top() else {
            return Ok(None);
        };

        let remaining = self.core.remaining_time(top).unwrap_or(Duration::ZERO);
        let elapsed = self
            .core
            .last_scheduled(top)
            .and_then(|last| now.checked_duration_since(last))
            .unwrap_or(Duration::ZERO);
        let remaining = remaining.saturating_sub(elapsed);
        log::trace!(
            "[{}] Charged {} to task {}, {} left",
            self.core.name(),
            elapsed,
            top,
            remaining
        );

        self.core.set_remaining_time(top, Some(remaining));
        for task in self.stack.iter() {
            self.core.set_last_scheduled(task, now);
        }
        Ok(Some((top, remaining)))
    }

    /// Put a task on the resource with its full execution time
    fn start(&mut self, task: TaskId, now: Instant, execution_time: Duration) {
        self.stack.push(task);
        self.core.set_remaining_time(task, Some(execution_time));
        self.core.set_last_scheduled(task, now);
        self.core.emit_task(task, now, Some(EventKind::Start));
        self.core.metrics_mut().record_dispatch();
        log::debug!(
            "[{}] Started task {} (priority {}) for {}",
            self.core.name(),
            task,
            self.core.priority(task),
            execution_time
        );
    }

    /// Pop the finished top task and resume the one below it
    fn complete_top(&mut self, now: Instant) {
        let Some(task) = self.stack.pop() else {
            return;
        };
        self.core.set_remaining_time(task, None);
        self.core.set_last_scheduled(task, now);
        self.core.emit_task(task, now, Some(EventKind::Stop));
        self.core.metrics_mut().record_completion();
        log::debug!("[{}] Task {} completed at {}", self.core.name(), task, now);

        if let Some(resumed) = self.stack.top() {
            self.core.set_last_scheduled(resumed, now);
            self.core.emit_task(resumed, now, Some(EventKind::Start));
            self.core.metrics_mut().record_resumption();
            log::debug!(
                "[{}] Resumed task {} with {} left",
                self.core.name(),
                resumed,
                self.core.remaining_time(resumed).unwrap_or(Duration::ZERO)
            );
        }
    }
}

impl ResourceScheduler for FixedPriorityScheduler {
    fn core(&self) -> &SchedulerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SchedulerCore {
        &mut self.core
    }

    fn initialize(&mut self) -> SchedResult<()> {
        self.stack.clear();
        self.core.initialize()
    }

    fn reschedule(&mut self, now: Instant) -> SchedResult<Duration> {
        self.core.ensure_running("reschedule")?;
        self.core.advance_clock(now)?;
        if self.stack.is_empty() {
            return Ok(Duration::INFINITY);
        }
        // A top task charged down to zero stays on the stack until its own
        // request arrives; zero tells the driver to deliver it now.
        Ok(self
            .charge_elapsed(now)?
            .map(|(_, remaining)| remaining)
            .unwrap_or(Duration::INFINITY))
    }

    fn dispatch(
        &mut self,
        task: TaskId,
        now: Instant,
        _deadline: Instant,
        execution_time: Duration,
    ) -> SchedResult<Option<Duration>> {
        self.core.set_last_finished(false);

        let next = match self.charge_elapsed(now)? {
            None => {
                self.start(task, now, execution_time);
                execution_time
            }
            Some((running, remaining)) if running == task => remaining,
            // The executing task is due; it must finish before anything else
            // is decided.
            Some((_, remaining)) if remaining.is_zero() => return Ok(Some(Duration::ZERO)),
            Some((running, remaining)) => {
                let urgent = self.core.priority(task).is_more_urgent_than(self.core.priority(running));
                if self.config.preemptive && urgent && !self.stack.contains(task) {
                    self.core.emit_task(running, now, Some(EventKind::Preempted));
                    self.core.metrics_mut().record_preemption();
                    log::debug!(
                        "[{}] Task {} preempts task {} ({} left)",
                        self.core.name(),
                        task,
                        running,
                        remaining
                    );
                    self.start(task, now, execution_time);
                    execution_time
                } else {
                    self.core.metrics_mut().record_refusal();
                    log::trace!(
                        "[{}] Task {} waits for task {} ({} left)",
                        self.core.name(),
                        task,
                        running,
                        remaining
                    );
                    return Ok(Some(remaining));
                }
            }
        };

        if next.is_zero() && self.stack.top() == Some(task) {
            self.complete_top(now);
            self.core.set_last_finished(true);
        }
        Ok(Some(next))
    }
}

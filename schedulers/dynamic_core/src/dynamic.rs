//! # Dynamic Core Assignment Scheduler Implementation

use crate::DynamicCoreConfig;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;
use simsched_framework::driver::earliest;
use simsched_framework::scheduler::{ResourceScheduler, SchedulerCore};
use simsched_framework::{ConfigError, Duration, Instant, SchedResult, TaskConfig, TaskId};

/// A child scheduler and what it last told us
struct Resource {
    /// The child
    scheduler: Box<dyn ResourceScheduler>,
    /// Relative time the child last returned; `None` when it has nothing
    /// pending
    last_reported: Option<Duration>,
}

impl Resource {
    /// Free to take a new task
    ///
    /// A child that reported zero may still hold a task charged down to
    /// zero that has not been completed yet.
    fn is_idle(&self, tasks: &[TaskId]) -> bool {
        self.last_reported.map_or(true, Duration::is_zero)
            && tasks.iter().all(|t| self.scheduler.remaining_time(*t).is_none())
    }

    fn record(&mut self, next: Duration) {
        self.last_reported = if next.is_infinite() { None } else { Some(next) };
    }
}

/// Dynamic Core Assignment Scheduler
///
/// Dispatches tasks across a fixed set of child schedulers. A task that
/// is resident on a child stays there until it completes; new tasks go
/// to the first idle child in registration order; when every child is
/// busy the request is turned away and the earliest time a child frees
/// up is returned.
pub struct DynamicCoreAssignmentScheduler {
    /// Shared bookkeeping
    core: SchedulerCore,
    /// Configuration
    config: DynamicCoreConfig,
    /// Children, in registration order
    resources: Vec<Resource>,
}

impl DynamicCoreAssignmentScheduler {
    /// Create a new scheduler over `children`
    pub fn new(
        name: &str,
        config: DynamicCoreConfig,
        children: Vec<Box<dyn ResourceScheduler>>,
    ) -> SchedResult<Self> {
        if children.is_empty() {
            return Err(ConfigError::NoResources { scheduler: name.into() }.into());
        }
        let resources = children
            .into_iter()
            .map(|scheduler| Resource { scheduler, last_reported: None })
            .collect();
        Ok(Self {
            core: SchedulerCore::new(name),
            config,
            resources,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &DynamicCoreConfig {
        &self.config
    }

    /// Number of child schedulers
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Child scheduler by index
    pub fn resource(&self, index: usize) -> Option<&dyn ResourceScheduler> {
        self.resources.get(index).map(|r| r.scheduler.as_ref())
    }

    /// Child scheduler by index (mutable)
    pub fn resource_mut(&mut self, index: usize) -> Option<&mut (dyn ResourceScheduler + 'static)> {
        self.resources.get_mut(index).map(|r| r.scheduler.as_mut())
    }

    /// Relative time a child last returned (`None` = nothing pending)
    pub fn last_reported(&self, index: usize) -> Option<Duration> {
        self.resources.get(index).and_then(|r| r.last_reported)
    }

    /// Index of the child a task is resident on
    pub fn resource_of(&self, task: TaskId) -> Option<usize> {
        self.resources
            .iter()
            .position(|r| r.scheduler.remaining_time(task).is_some())
    }

    /// Forward a request to one child and record its answer
    fn forward(
        &mut self,
        index: usize,
        task: TaskId,
        now: Instant,
        deadline: Instant,
        execution_time: Duration,
    ) -> SchedResult<Duration> {
        let resource = &mut self.resources[index];
        let next = resource
            .scheduler
            .dispatch(task, now, deadline, execution_time)?
            .unwrap_or(Duration::INFINITY);
        resource.record(next);
        let finished = resource.scheduler.last_task_finished();

        self.core.set_last_finished(finished);
        if finished {
            self.core.metrics_mut().record_completion();
        }
        Ok(next)
    }
}

impl ResourceScheduler for DynamicCoreAssignmentScheduler {
    fn core(&self) -> &SchedulerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SchedulerCore {
        &mut self.core
    }

    fn initialize(&mut self) -> SchedResult<()> {
        self.core.initialize()?;

        let shared: Vec<(TaskId, TaskConfig)> = if self.config.propagate_tasks {
            self.core
                .tasks()
                .iter()
                .filter_map(|task| self.core.task_config(*task).map(|c| (*task, c.clone())))
                .collect()
        } else {
            Vec::new()
        };

        for resource in &mut self.resources {
            for (task, config) in &shared {
                if resource.scheduler.task_config(*task).is_none() {
                    resource.scheduler.configure(*task, config.clone())?;
                }
            }
            resource.scheduler.initialize()?;
            resource.last_reported = None;
        }
        log::info!(
            "[{}] Dispatching across {} resources",
            self.core.name(),
            self.resources.len()
        );
        Ok(())
    }

    fn reschedule(&mut self, now: Instant) -> SchedResult<Duration> {
        self.core.ensure_running("reschedule")?;
        self.core.advance_clock(now)?;
        for resource in &mut self.resources {
            let next = resource.scheduler.reschedule(now)?;
            resource.record(next);
        }
        Ok(earliest(self.resources.iter().filter_map(|r| r.last_reported)))
    }

    fn dispatch(
        &mut self,
        task: TaskId,
        now: Instant,
        deadline: Instant,
        execution_time: Duration,
    ) -> SchedResult<Option<Duration>> {
        self.core.set_last_finished(false);
        self.core.advance_clock(now)?;

        // A resident task never migrates
        if let Some(index) = self.resource_of(task) {
            log::trace!("[{}] Task {} stays on resource {}", self.core.name(), task, index);
            return self.forward(index, task, now, deadline, execution_time).map(Some);
        }

        let tasks = self.core.tasks();
        if let Some(index) = self.resources.iter().position(|r| r.is_idle(tasks)) {
            log::debug!(
                "[{}] Assigned task {} to resource {} ({})",
                self.core.name(),
                task,
                index,
                self.resources[index].scheduler.name()
            );
            self.core.metrics_mut().record_dispatch();
            return self.forward(index, task, now, deadline, execution_time).map(Some);
        }

        let next = earliest(self.resources.iter().filter_map(|r| r.last_reported));
        self.core.metrics_mut().record_refusal();
        log::debug!(
            "[{}] All resources busy; task {} retries in {}",
            self.core.name(),
            task,
            next
        );
        Ok(Some(next))
    }

    fn remaining_time(&self, task: TaskId) -> Option<Duration> {
        self.resources
            .iter()
            .find_map(|r| r.scheduler.remaining_time(task))
    }

    fn wrapup(&mut self) -> SchedResult<()> {
        self.core.wrapup()?;
        for resource in &mut self.resources {
            resource.scheduler.wrapup()?;
        }
        Ok(())
    }
}

impl fmt::Debug for DynamicCoreAssignmentScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let children: Vec<&str> = self.resources.iter().map(|r| r.scheduler.name()).collect();
        f.debug_struct("DynamicCoreAssignmentScheduler")
            .field("name", &self.core.name())
            .field("config", &self.config)
            .field("resources", &children)
            .finish()
    }
}

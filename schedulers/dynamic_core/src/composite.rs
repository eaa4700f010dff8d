//! # Port-Based Composite Resource Scheduler
//!
//! Instead of deciding itself, this scheduler hands each request to an
//! inner model through a named request port. The inner model drains its
//! port with [`CompositeResourceScheduler::take_requests`] and reports
//! back through [`CompositeResourceScheduler::complete`].

use crate::CompositeConfig;
use alloc::collections::VecDeque;
use alloc::string::String;
use alloc::vec::Vec;
use hashbrown::HashMap;
use simsched_framework::scheduler::{ResourceScheduler, SchedulerCore};
use simsched_framework::{
    ConfigError, Duration, EventKind, Instant, SchedError, SchedResult, TaskId,
};

/// A request handed to the inner model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceRequest {
    /// Requesting task
    pub task: TaskId,
    /// Execution time the task asked for
    pub execution_time: Duration,
    /// Time of the request
    pub time: Instant,
}

#[derive(Debug)]
struct RequestPort {
    name: String,
    queue: VecDeque<ResourceRequest>,
}

/// Composite Resource Scheduler
#[derive(Debug)]
pub struct CompositeResourceScheduler {
    /// Shared bookkeeping
    core: SchedulerCore,
    /// Configuration
    config: CompositeConfig,
    /// Declared request ports
    ports: Vec<RequestPort>,
    /// Port each task sends its requests to
    routes: HashMap<TaskId, String>,
    /// Tasks handed to the inner model and not yet reported complete
    executing: Vec<TaskId>,
    /// Time of each task's last forwarded request
    last_request: HashMap<TaskId, Instant>,
}

impl CompositeResourceScheduler {
    /// Create a new scheduler with no request ports
    pub fn new(name: &str, config: CompositeConfig) -> Self {
        Self {
            core: SchedulerCore::new(name),
            config,
            ports: Vec::new(),
            routes: HashMap::new(),
            executing: Vec::new(),
            last_request: HashMap::new(),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &CompositeConfig {
        &self.config
    }

    /// Declare a request port; declaring an existing name again is a no-op
    pub fn add_request_port(&mut self, name: &str) {
        if self.port_index(name).is_none() {
            self.ports.push(RequestPort { name: name.into(), queue: VecDeque::new() });
        }
    }

    /// Route a task's requests to the named port
    ///
    /// The port does not have to be declared yet; the route is checked
    /// when the task is first scheduled.
    pub fn set_request_port(&mut self, task: TaskId, port: &str) {
        self.routes.insert(task, port.into());
    }

    /// Port a task is routed to
    pub fn request_port(&self, task: TaskId) -> Option<&str> {
        self.routes.get(&task).map(String::as_str)
    }

    /// Drain every request waiting on a port
    pub fn take_requests(&mut self, port: &str) -> Vec<ResourceRequest> {
        match self.port_index(port) {
            Some(index) => self.ports[index].queue.drain(..).collect(),
            None => Vec::new(),
        }
    }

    /// Requests not yet taken by the inner model, over all ports
    pub fn pending_requests(&self) -> usize {
        self.ports.iter().map(|p| p.queue.len()).sum()
    }

    /// True while the task is handed to the inner model
    pub fn is_waiting_for_resource(&self, task: TaskId) -> bool {
        self.executing.contains(&task)
    }

    /// The inner model finished a task
    ///
    /// Returns false if the task was not executing.
    pub fn complete(&mut self, task: TaskId, now: Instant) -> SchedResult<bool> {
        self.core.ensure_running("complete")?;
        let Some(index) = self.executing.iter().position(|t| *t == task) else {
            return Ok(false);
        };
        self.executing.remove(index);
        self.core.emit_task(task, now, Some(EventKind::Stop));
        self.core.set_last_finished(true);
        self.core.metrics_mut().record_completion();
        log::debug!("[{}] Task {} completed at {}", self.core.name(), task, now);
        Ok(true)
    }

    fn port_index(&self, name: &str) -> Option<usize> {
        self.ports.iter().position(|p| p.name == name)
    }

    fn route(&self, task: TaskId) -> SchedResult<usize> {
        let scheduler = || String::from(self.core.name());
        let port = self
            .routes
            .get(&task)
            .ok_or_else(|| SchedError::from(ConfigError::MissingRequestPort { scheduler: scheduler(), task }))?;
        self.port_index(port).ok_or_else(|| {
            ConfigError::UnknownRequestPort { scheduler: scheduler(), task, port: port.clone() }.into()
        })
    }
}

impl ResourceScheduler for CompositeResourceScheduler {
    fn core(&self) -> &SchedulerCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut SchedulerCore {
        &mut self.core
    }

    fn initialize(&mut self) -> SchedResult<()> {
        for port in &mut self.ports {
            port.queue.clear();
        }
        self.executing.clear();
        self.last_request.clear();
        self.core.initialize()
    }

    fn reschedule(&mut self, _now: Instant) -> SchedResult<Duration> {
        self.core.ensure_running("reschedule")?;
        if self.pending_requests() > 0 {
            Ok(Duration::ZERO)
        } else {
            Ok(Duration::INFINITY)
        }
    }

    fn dispatch(
        &mut self,
        task: TaskId,
        now: Instant,
        _deadline: Instant,
        execution_time: Duration,
    ) -> SchedResult<Option<Duration>> {
        self.core.set_last_finished(false);

        let repeated = self.last_request.get(&task) == Some(&now);
        let forward = !self.executing.contains(&task) || (self.config.just_monitor && !repeated);
        if forward {
            let index = self.route(task)?;
            self.last_request.insert(task, now);
            self.core.emit_task(task, now, Some(EventKind::Start));
            self.ports[index].queue.push_back(ResourceRequest { task, execution_time, time: now });
            if !self.executing.contains(&task) {
                self.executing.push(task);
            }
            self.core.metrics_mut().record_dispatch();
            log::debug!(
                "[{}] Forwarded task {} to port {}",
                self.core.name(),
                task,
                self.ports[index].name
            );
        }

        if self.config.just_monitor {
            self.core.set_last_finished(true);
            Ok(Some(Duration::ZERO))
        } else {
            // Completion is unknown until the inner model reports it
            Ok(Some(Duration::INFINITY))
        }
    }

    fn remaining_time(&self, task: TaskId) -> Option<Duration> {
        if !self.config.just_monitor && self.executing.contains(&task) {
            Some(Duration::INFINITY)
        } else {
            None
        }
    }
}

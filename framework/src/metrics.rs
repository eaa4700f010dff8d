//! # Scheduler Metrics
//!
//! Counters for scheduler activity over one simulation run.

/// Scheduler metrics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerMetrics {
    /// Scheduling requests received
    requests: u64,
    /// Tasks started on a resource
    dispatches: u64,
    /// Tasks suspended by a more urgent task
    preemptions: u64,
    /// Preempted tasks resumed
    resumptions: u64,
    /// Tasks run to completion
    completions: u64,
    /// Requests turned away because no resource was free
    refusals: u64,
}

impl SchedulerMetrics {
    /// Create new metrics
    pub const fn new() -> Self {
        Self {
            requests: 0,
            dispatches: 0,
            preemptions: 0,
            resumptions: 0,
            completions: 0,
            refusals: 0,
        }
    }

    /// Record a scheduling request
    pub fn record_request(&mut self) {
        self.requests += 1;
    }

    /// Record a task start
    pub fn record_dispatch(&mut self) {
        self.dispatches += 1;
    }

    /// Record a preemption
    pub fn record_preemption(&mut self) {
        self.preemptions += 1;
    }

    /// Record a resumption
    pub fn record_resumption(&mut self) {
        self.resumptions += 1;
    }

    /// Record a completion
    pub fn record_completion(&mut self) {
        self.completions += 1;
    }

    /// Record a refused request
    pub fn record_refusal(&mut self) {
        self.refusals += 1;
    }

    /// Get total requests
    pub fn requests(&self) -> u64 {
        self.requests
    }

    /// Get total dispatches
    pub fn dispatches(&self) -> u64 {
        self.dispatches
    }

    /// Get total preemptions
    pub fn preemptions(&self) -> u64 {
        self.preemptions
    }

    /// Get total resumptions
    pub fn resumptions(&self) -> u64 {
        self.resumptions
    }

    /// Get total completions
    pub fn completions(&self) -> u64 {
        self.completions
    }

    /// Get total refusals
    pub fn refusals(&self) -> u64 {
        self.refusals
    }

    /// Reset all metrics
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

//! # SimSched Framework
//!
//! The framework models time-shared execution of discrete tasks on shared
//! execution resources ("cores") over simulated time. It provides:
//! - Simulation time values
//! - Task identity and per-task configuration
//! - The resource scheduler protocol and its shared bookkeeping
//! - Observability events and sinks
//! - A reference driver loop
//!
//! ## Key Principle
//!
//! This crate provides the FRAMEWORK, not the policies.
//! Fixed-priority dispatch and multi-core assignment live in their own
//! crates and plug in through [`scheduler::ResourceScheduler`].

#![no_std]
#![deny(unsafe_code)]
#![warn(missing_docs)]

extern crate alloc;

pub mod time;
pub mod task;
pub mod priority;
pub mod events;
pub mod metrics;
pub mod scheduler;
pub mod driver;


use alloc::string::String;
use core::fmt;

pub use events::{EventKind, EventLog, EventMask, EventSink, EventSource, ListenerId, ScheduleEvent};
pub use priority::Priority;
pub use scheduler::{Lifecycle, ResourceScheduler, RunStack, SchedulerCore};
pub use task::{TaskConfig, TaskId};
pub use time::{Duration, Instant};

/// Scheduling result type
pub type SchedResult<T> = Result<T, SchedError>;

/// Static configuration faults
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A task declares a negative execution time
    NegativeExecutionTime {
        /// Offending task
        task: TaskId,
        /// Declared value in ticks
        value: i64,
    },
    /// A task has no request port mapping in a port-based composite
    MissingRequestPort {
        /// Scheduler name
        scheduler: String,
        /// Offending task
        task: TaskId,
    },
    /// A task is mapped to a port the composite never declared
    UnknownRequestPort {
        /// Scheduler name
        scheduler: String,
        /// Offending task
        task: TaskId,
        /// Port name from the mapping
        port: String,
    },
    /// A composite scheduler was built without children
    NoResources {
        /// Scheduler name
        scheduler: String,
    },
}

/// Scheduling errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedError {
    /// Invalid static configuration
    Configuration(ConfigError),
    /// Operation invoked in the wrong lifecycle state
    IllegalState {
        /// Scheduler name
        scheduler: String,
        /// State the scheduler was in
        state: Lifecycle,
        /// Rejected operation
        operation: &'static str,
    },
    /// Request for a task that was not enabled at initialization
    UnregisteredTask {
        /// Scheduler name
        scheduler: String,
        /// Offending task
        task: TaskId,
    },
    /// Environment time went backwards
    TemporalOrdering {
        /// Scheduler name
        scheduler: String,
        /// Latest time seen by the scheduler
        last: Instant,
        /// Time of the rejected call
        now: Instant,
    },
}

impl From<ConfigError> for SchedError {
    fn from(err: ConfigError) -> Self {
        SchedError::Configuration(err)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::NegativeExecutionTime { task, value } => {
                write!(f, "task {} declares negative execution time {}", task, value)
            }
            ConfigError::MissingRequestPort { scheduler, task } => {
                write!(f, "{}: task {} does not have a registered request port", scheduler, task)
            }
            ConfigError::UnknownRequestPort { scheduler, task, port } => {
                write!(f, "{}: no request port named '{}' (mapped from task {})", scheduler, port, task)
            }
            ConfigError::NoResources { scheduler } => {
                write!(f, "{}: composite scheduler has no resources", scheduler)
            }
        }
    }
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedError::Configuration(err) => write!(f, "configuration error: {}", err),
            SchedError::IllegalState { scheduler, state, operation } => {
                write!(f, "{}: cannot {} while {:?}", scheduler, operation, state)
            }
            SchedError::UnregisteredTask { scheduler, task } => {
                write!(f, "{}: task {} is not enabled for this scheduler", scheduler, task)
            }
            SchedError::TemporalOrdering { scheduler, last, now } => {
                write!(f, "{}: environment time regressed from {} to {}", scheduler, last, now)
            }
        }
    }
}

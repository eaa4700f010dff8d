//! # Tasks
//!
//! Task identity and the per-scheduler task configuration that replaces
//! attribute lookup on the task itself.

use crate::time::Duration;
use crate::{ConfigError, Priority};
use alloc::string::String;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for schedulable tasks
///
/// Schedulers only ever reference tasks through this handle; they never
/// own the work itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(u64);

impl TaskId {
    /// Allocate a fresh task ID
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Create from raw value
    pub const fn from_raw(value: u64) -> Self {
        Self(value)
    }

    /// Get the raw ID value
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Scheduling parameters one scheduler holds for one task
///
/// The same task may be configured differently on every scheduler it is
/// registered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskConfig {
    /// Whether the scheduler manages this task at all
    pub enabled: bool,
    /// Nominal execution time of one complete run, in ticks
    ///
    /// Kept signed so that a bad value survives until validation and is
    /// reported instead of wrapping.
    pub execution_time: i64,
    /// Explicit priority, if any
    pub priority: Option<i32>,
    /// Name used in diagnostics
    pub name: String,
}

impl TaskConfig {
    /// Enabled task with zero execution time and no priority
    pub fn new() -> Self {
        Self {
            enabled: true,
            execution_time: 0,
            priority: None,
            name: String::new(),
        }
    }

    /// Set the execution time in ticks
    pub fn with_execution_time(mut self, ticks: i64) -> Self {
        self.execution_time = ticks;
        self
    }

    /// Set an explicit priority (lower is more urgent)
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Set the diagnostic name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Hide the task from the scheduler
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Check the configuration and return the execution time
    pub fn validate(&self, task: TaskId) -> Result<Duration, ConfigError> {
        Duration::try_from_signed(self.execution_time).ok_or(
            ConfigError::NegativeExecutionTime { task, value: self.execution_time },
        )
    }

    /// Effective priority, with the lowest sentinel when none was given
    pub fn effective_priority(&self) -> Priority {
        self.priority.map(Priority::new).unwrap_or(Priority::LOWEST)
    }
}

impl Default for TaskConfig {
    fn default() -> Self {
        Self::new()
    }
}

//! # Scheduler Framework
//!
//! This module defines the resource scheduler FRAMEWORK, not a specific
//! policy. Concrete policies embed a [`SchedulerCore`] for the shared
//! bookkeeping and implement [`ResourceScheduler::dispatch`].

pub mod traits;
pub mod bookkeeping;
pub mod stack;

pub use bookkeeping::SchedulerCore;
pub use stack::RunStack;
pub use traits::*;

/// Lifecycle of a scheduler across simulation runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Created and configured, no run started yet
    Configured,
    /// Between `initialize` and `wrapup`
    Running,
    /// Run finished; only `initialize` is accepted
    WrappedUp,
}

//! # Fixed-Priority Scheduler
//!
//! Single-resource scheduler that always runs the most urgent admitted
//! task.
//!
//! ## Features
//! - Fixed numeric priorities (lower is more urgent)
//! - Optional preemption with nested resumption through a run stack
//! - First-come-first-served among equal priorities
//!
//! ## Usage
//!
//! Configure tasks on the scheduler, then hand it to a driver (or call
//! the [`ResourceScheduler`](simsched_framework::ResourceScheduler)
//! protocol directly).

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

mod config;
mod scheduler;

#[cfg(test)]
mod tests;

pub use config::FixedPriorityConfig;
pub use scheduler::FixedPriorityScheduler;

/// Create a preemptive scheduler
pub fn create_scheduler(name: &str) -> FixedPriorityScheduler {
    FixedPriorityScheduler::new(name, FixedPriorityConfig::default())
}

/// Create a scheduler with custom config
pub fn create_scheduler_with_config(name: &str, config: FixedPriorityConfig) -> FixedPriorityScheduler {
    FixedPriorityScheduler::new(name, config)
}

//! # Composite Resource Schedulers
//!
//! Schedulers that own no resource themselves and dispatch across other
//! schedulers.
//!
//! ## Features
//! - [`DynamicCoreAssignmentScheduler`]: affinity-preserving assignment of
//!   tasks to a fixed set of child schedulers ("cores")
//! - [`CompositeResourceScheduler`]: routes requests into an inner model
//!   through named request ports and learns about completion from it
//!
//! ## Usage
//!
//! Build the children first (any [`ResourceScheduler`] will do), hand
//! them to the composite, configure tasks on the composite, and drive the
//! composite like any other scheduler.
//!
//! [`ResourceScheduler`]: simsched_framework::ResourceScheduler

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

mod config;
mod composite;
mod dynamic;


pub use composite::{CompositeResourceScheduler, ResourceRequest};
pub use config::{CompositeConfig, DynamicCoreConfig};
pub use dynamic::DynamicCoreAssignmentScheduler;

//! # Composite Scheduler Configuration

/// Configuration for the dynamic core assignment scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicCoreConfig {
    /// Register the composite's tasks with every child lacking its own
    /// configuration for them at initialization
    pub propagate_tasks: bool,
}

impl DynamicCoreConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self { propagate_tasks: true }
    }

    /// Children keep exactly the tasks they were configured with
    pub fn isolated() -> Self {
        Self { propagate_tasks: false }
    }
}

impl Default for DynamicCoreConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the port-based composite scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeConfig {
    /// Forward requests but report tasks as finished immediately, so the
    /// inner model only observes the traffic
    pub just_monitor: bool,
}

impl CompositeConfig {
    /// Create default configuration
    pub fn new() -> Self {
        Self { just_monitor: false }
    }

    /// Monitor-only configuration
    pub fn monitor_only() -> Self {
        Self { just_monitor: true }
    }
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self::new()
    }
}

//! # Fixed-Priority Scheduler Configuration

/// Configuration for the fixed-priority scheduler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedPriorityConfig {
    /// May a more urgent arrival displace the running task?
    pub preemptive: bool,
}

impl FixedPriorityConfig {
    /// Create default configuration (preemptive)
    pub fn new() -> Self {
        Self { preemptive: true }
    }

    /// Run-to-completion configuration
    pub fn non_preemptive() -> Self {
        Self { preemptive: false }
    }
}

impl Default for FixedPriorityConfig {
    fn default() -> Self {
        Self::new()
    }
}

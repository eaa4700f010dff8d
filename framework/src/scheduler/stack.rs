//! # Run Stack
//!
//! LIFO structure of the tasks currently holding a single resource. The
//! top entry executes; entries below it were preempted and resume in
//! reverse order of suspension.

use crate::task::TaskId;
use alloc::vec::Vec;

/// Run stack of a single resource
#[derive(Debug, Clone, Default)]
pub struct RunStack {
    entries: Vec<TaskId>,
}

impl RunStack {
    /// Create an empty stack
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Put a task on top (it now executes)
    pub fn push(&mut self, task: TaskId) {
        self.entries.push(task);
    }

    /// Remove and return the executing task
    pub fn pop(&mut self) -> Option<TaskId> {
        self.entries.pop()
    }

    /// The executing task
    pub fn top(&self) -> Option<TaskId> {
        self.entries.last().copied()
    }

    /// Is the task anywhere on the stack?
    pub fn contains(&self, task: TaskId) -> bool {
        self.entries.contains(&task)
    }

    /// Iterate from the bottom (oldest) to the top
    pub fn iter(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.entries.iter().copied()
    }

    /// Check if the stack is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of tasks holding the resource
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

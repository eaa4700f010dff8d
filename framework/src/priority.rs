//! # Priority Management
//!
//! Fixed task priorities for priority-based policies.

use core::cmp::Ordering;
use core::fmt;

/// Task priority
///
/// Lower numbers are more urgent. Ordering follows urgency, so the
/// greater of two priorities is the one that should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Priority(i32);

impl Priority {
    /// Most urgent priority
    pub const HIGHEST: Self = Self(i32::MIN);

    /// Least urgent priority, given to tasks with no explicit priority
    pub const LOWEST: Self = Self(i32::MAX);

    /// Create a priority from its numeric value
    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    /// Get the numeric value
    pub const fn value(self) -> i32 {
        self.0
    }

    /// Strict urgency test; equal priorities are never more urgent
    pub fn is_more_urgent_than(self, other: Priority) -> bool {
        self.0 < other.0
    }
}

impl PartialOrd for Priority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Priority {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lower number = higher priority
        other.0.cmp(&self.0)
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::LOWEST
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::LOWEST {
            write!(f, "lowest")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lower_number_is_more_urgent() {
        assert!(Priority::new(1).is_more_urgent_than(Priority::new(5)));
        assert!(!Priority::new(5).is_more_urgent_than(Priority::new(1)));
        assert!(Priority::new(1) > Priority::new(5));
    }

    #[test]
    fn equal_priorities_do_not_outrank() {
        assert!(!Priority::new(4).is_more_urgent_than(Priority::new(4)));
    }

    #[test]
    fn any_explicit_priority_beats_lowest() {
        assert!(Priority::new(i32::MAX - 1).is_more_urgent_than(Priority::LOWEST));
        assert!(Priority::HIGHEST.is_more_urgent_than(Priority::new(0)));
    }
}

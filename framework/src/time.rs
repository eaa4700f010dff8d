//! # Simulation Time
//!
//! Fixed-point simulation time. One tick is the smallest representable
//! step; conversions from [`core::time::Duration`] treat a tick as one
//! nanosecond. The all-ones tick count is reserved for infinity.

use core::fmt;
use core::ops::{Add, AddAssign};

const INFINITE_TICKS: u64 = u64::MAX;

/// An absolute point in simulation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Instant(u64);

/// A relative span of simulation time
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration(u64);

impl Instant {
    /// Start of every simulation run
    pub const ZERO: Self = Self(0);

    /// A point that is never reached (used for "no deadline")
    pub const INFINITY: Self = Self(INFINITE_TICKS);

    /// Create from a raw tick count
    pub const fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Get the raw tick count
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Is this the infinity sentinel?
    pub const fn is_infinite(self) -> bool {
        self.0 == INFINITE_TICKS
    }

    /// Time elapsed since `earlier`, or `None` if `earlier` is later than `self`
    pub fn checked_duration_since(self, earlier: Instant) -> Option<Duration> {
        if self.is_infinite() {
            return Some(Duration::INFINITY);
        }
        self.0.checked_sub(earlier.0).map(Duration)
    }
}

impl Duration {
    /// No time at all
    pub const ZERO: Self = Self(0);

    /// Unbounded span ("nothing pending")
    pub const INFINITY: Self = Self(INFINITE_TICKS);

    /// Create from a raw tick count
    pub const fn from_ticks(ticks: u64) -> Self {
        Self(ticks)
    }

    /// Create from a signed tick count, rejecting negative values
    pub fn try_from_signed(ticks: i64) -> Option<Self> {
        u64::try_from(ticks).ok().map(Self)
    }

    /// Get the raw tick count
    pub const fn ticks(self) -> u64 {
        self.0
    }

    /// Is this span empty?
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Is this the infinity sentinel?
    pub const fn is_infinite(self) -> bool {
        self.0 == INFINITE_TICKS
    }

    /// Subtract, clamping at zero. Infinity minus anything finite stays infinite.
    pub fn saturating_sub(self, rhs: Duration) -> Duration {
        if self.is_infinite() {
            return self;
        }
        Duration(self.0.saturating_sub(rhs.0))
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    fn add(self, rhs: Duration) -> Instant {
        if self.is_infinite() || rhs.is_infinite() {
            return Instant::INFINITY;
        }
        // Finite sums that overflow are clamped onto the sentinel too.
        Instant(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign<Duration> for Instant {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl Add for Duration {
    type Output = Duration;

    fn add(self, rhs: Duration) -> Duration {
        Duration(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Duration {
    fn add_assign(&mut self, rhs: Duration) {
        *self = *self + rhs;
    }
}

impl From<core::time::Duration> for Duration {
    fn from(d: core::time::Duration) -> Self {
        Duration(u64::try_from(d.as_nanos()).unwrap_or(INFINITE_TICKS))
    }
}

impl fmt::Display for Instant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            write!(f, "t=inf")
        } else {
            write!(f, "t={}", self.0)
        }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_infinite() {
            write!(f, "inf")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

//! Monotonic tick counter used throughout the scheduler.
//!
//! Grounded on the teacher's `time::Instant` newtype (`src/time/mod.rs`):
//! the scheduler never calls a wall-clock API directly, it only ever reads
//! `Tick` values handed to it by the [`crate::env::SchedEnv`] collaborator.

use core::fmt;
use core::ops::{Add, AddAssign};

/// A monotonically increasing tick count. Wraps a bare `u64` rather than
/// exposing one directly so the scheduler's arithmetic (aging deadlines,
/// quantum expiry) can't be confused with an unrelated integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    /// Ticks elapsed since `earlier`, saturating at 0 if `earlier` is later
    /// than `self` (should not happen with a monotonic source, but the
    /// contract violations here are the caller's to assert on, not ours).
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add<u64> for Tick {
    type Output = Tick;
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0.saturating_add(rhs))
    }
}

impl AddAssign<u64> for Tick {
    fn add_assign(&mut self, rhs: u64) {
        self.0 = self.0.saturating_add(rhs);
    }
}

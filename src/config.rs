//! Tunables for the scheduler, colocated the way the teacher colocates its
//! own constants with the component that consumes them
//! (`time::TimeSlice::calculate_quantum` / `calculate_priority_factor`).

use crate::errors::{SchedError, SchedResult};

/// Tunable thresholds for the three-band feedback policy.
///
/// The defaults match the values named throughout the scheduler's
/// contract (band floors 50/100, quantum 100, aging threshold 1500,
/// aging increment 10, priority ceiling 149). They are overridable via the
/// builder methods below so tests can exercise aging or quantum edges
/// without simulating thousands of ticks; scenarios that test the literal
/// constants still run against `SchedConfig::default()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedConfig {
    pub l2_band_floor: u8,
    pub l1_band_floor: u8,
    pub priority_ceiling: u8,
    pub l3_quantum: u64,
    pub aging_threshold: u64,
    pub aging_increment: u8,
}

impl Default for SchedConfig {
    fn default() -> Self {
        Self {
            l2_band_floor: 50,
            l1_band_floor: 100,
            priority_ceiling: 149,
            l3_quantum: 100,
            aging_threshold: 1500,
            aging_increment: 10,
        }
    }
}

impl SchedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_l3_quantum(mut self, quantum: u64) -> Self {
        self.l3_quantum = quantum;
        self
    }

    pub fn with_aging_threshold(mut self, threshold: u64) -> Self {
        self.aging_threshold = threshold;
        self
    }

    pub fn with_aging_increment(mut self, increment: u8) -> Self {
        self.aging_increment = increment;
        self
    }

    pub fn validate(&self) -> SchedResult<()> {
        if self.l3_quantum == 0 {
            return Err(SchedError::InvalidQuantum);
        }
        if self.aging_threshold == 0 {
            return Err(SchedError::InvalidAgingThreshold);
        }
        if !(self.l2_band_floor < self.l1_band_floor && self.l1_band_floor <= self.priority_ceiling) {
            return Err(SchedError::InvalidBandBounds);
        }
        Ok(())
    }
}

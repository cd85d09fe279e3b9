//! Error handling for the scheduler core.
//!
//! Almost every one of the scheduler's failure modes is a contract
//! violation — interrupts enabled on entry, admitting a thread id already
//! known to the scheduler, a double destroy, a corrupted stack-overflow
//! sentinel — and those stay hard `assert!` panics exactly as the rest of
//! this crate's invariants demand; the scheduler does not attempt recovery
//! from them. `SchedError` exists only for the one condition the contract
//! is silent on and that a caller can reasonably recover from: a malformed
//! [`crate::config::SchedConfig`].

use core::fmt;

/// Result type for scheduler construction.
pub type SchedResult<T> = Result<T, SchedError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedError {
    /// `SchedConfig` values violate `l2_band_floor < l1_band_floor <= priority_ceiling`.
    InvalidBandBounds,
    /// `l3_quantum` was zero.
    InvalidQuantum,
    /// `aging_threshold` was zero.
    InvalidAgingThreshold,
}

impl fmt::Display for SchedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedError::InvalidBandBounds => write!(
                f,
                "scheduler config bands must satisfy l2_band_floor < l1_band_floor <= priority_ceiling"
            ),
            SchedError::InvalidQuantum => write!(f, "l3_quantum must be nonzero"),
            SchedError::InvalidAgingThreshold => write!(f, "aging_threshold must be nonzero"),
        }
    }
}

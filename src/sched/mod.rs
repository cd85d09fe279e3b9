//! The multilevel feedback scheduler: ready-set, aging engine, and the
//! placement/selection/preemption/dispatch core.

pub mod aging;
pub mod ready_set;
pub mod scheduler;

pub use ready_set::{Band, ReadySet};
pub use scheduler::{SchedStats, Scheduler, SwitchReason};

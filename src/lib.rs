#![no_std]
#![deny(unsafe_op_in_unsafe_fn)]
#![forbid(unreachable_pub)]

//! A multilevel feedback thread scheduler core for a uniprocessor
//! instructional operating-system kernel.
//!
//! This crate decides which runnable thread next receives the CPU, when a
//! running thread should be preempted, and how the priorities of waiting
//! threads age over time so that no runnable thread is indefinitely
//! starved. It is invoked from interrupt-disabled contexts and cooperates
//! with a low-level context-switch primitive and a timer ("alarm") that
//! drives preemption, both reached through the [`env::SchedEnv`] trait.
//!
//! Thread creation/teardown mechanics, user-address-space save/restore,
//! timer interrupt generation, and the machine-dependent register-swap
//! primitive are out of scope: they are referenced only through the
//! abstract interfaces in [`env`].
//!
//! # Quick start
//!
//! ```ignore
//! use mlfq_sched::config::SchedConfig;
//! use mlfq_sched::env::TestEnv;
//! use mlfq_sched::sched::{Scheduler, SwitchReason};
//! use mlfq_sched::thread::{ThreadDescriptor, ThreadId};
//!
//! let mut scheduler = Scheduler::new(TestEnv::new(), SchedConfig::default()).unwrap();
//! scheduler.ready_to_run(Box::new(ThreadDescriptor::new(ThreadId::new(1), 30, 0.0)));
//! let next = scheduler.find_next_to_run().unwrap();
//! scheduler.run(next, SwitchReason::Yield);
//! ```
//!
//! # Architecture
//!
//! - [`thread::ThreadDescriptor`]: the scheduler-visible fields of a thread.
//! - [`sched::ReadySet`]: the three-band ready queue (L1/L2/L3).
//! - [`sched::Scheduler`]: placement, selection, preemption and dispatch.
//! - [`env::SchedEnv`]: the tick source, alarm, machine switch, and trace sink.
//! - [`trace`]: the stable, compatibility-sensitive trace event format.

pub mod config;
pub mod env;
pub mod errors;
pub mod sched;
pub mod thread;
pub mod time;
pub mod trace;

#[cfg(test)]
extern crate std;

extern crate alloc;

#[cfg(test)]
mod tests;

// Panic handler for bare-metal hosts. Test and std-shim builds use the
// host's own handler instead.
#[cfg(all(not(test), not(feature = "std-shim")))]
use core::panic::PanicInfo;

#[cfg(all(not(test), not(feature = "std-shim")))]
#[panic_handler]
fn panic(_info: &PanicInfo) -> ! {
    loop {}
}

// ============================================================================
// Public API
// ============================================================================

pub use config::SchedConfig;
pub use env::{AddressSpace, SchedEnv, StackGuard, TestEnv, ThreadHooks, UserRegisters};
pub use errors::{SchedError, SchedResult};
pub use sched::{Band, ReadySet, SchedStats, Scheduler, SwitchReason};
pub use thread::{ThreadDescriptor, ThreadId, ThreadStatus};
pub use time::Tick;
pub use trace::{CollectingSink, NullSink, TraceEvent, TraceSink};

//! Abstract collaborators the scheduler core is driven by, mirroring the
//! way the teacher isolates hardware behind its `arch::Arch` trait
//! (`src/arch/mod.rs`). Thread creation/teardown, address-space
//! management, interrupt/timer generation and the machine register-swap
//! primitive all live behind these traits; the scheduler core never
//! implements them itself.

extern crate alloc;
use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::thread::ThreadDescriptor;
use crate::time::Tick;
use crate::trace::{CollectingSink, TraceEvent, TraceSink};

/// Per-thread hook for saving/restoring the user register file. Present
/// only on threads that own a user address space.
pub trait UserRegisters: Send {
    fn save(&mut self);
    fn restore(&mut self);
}

/// Per-thread hook for saving/restoring address-space state (page tables,
/// TLB tag, whatever the target MMU needs). Present only on threads that
/// own a user address space.
pub trait AddressSpace: Send {
    fn save(&mut self);
    fn restore(&mut self);
}

/// Per-thread kernel-stack overflow sentinel. A thread with no guard
/// installed is treated as always intact.
pub trait StackGuard: Send {
    fn check_overflow(&self) -> bool;
}

/// Everything the scheduler core needs from the kernel it is linked into:
/// the tick source, the interrupt-level query used only in assertions, the
/// quantum alarm, the machine-level context switch, and the trace sink.
///
/// Unlike the teacher's `Arch`, whose methods are free functions on a
/// zero-sized type (one CPU target, no per-instance state), `SchedEnv`
/// methods take `&mut self`: a test harness commonly needs several
/// independent `Scheduler`s, each with its own simulated clock and its own
/// recorded trace, so the collaborator has to be an owned instance rather
/// than a static.
pub trait SchedEnv {
    fn now_ticks(&self) -> Tick;

    /// Used only in assertions (spec.md §6); never consulted for control flow.
    fn interrupts_enabled(&self) -> bool;

    fn set_alarm_enabled(&mut self, enabled: bool);

    /// Swap kernel stacks and callee-saved registers. In a real kernel this
    /// suspends the caller and returns only when `old` is next dispatched;
    /// a host-side test double can simply return immediately.
    fn machine_switch(&mut self, old: &mut ThreadDescriptor, next: &mut ThreadDescriptor);

    fn trace(&mut self, event: TraceEvent);
}

/// A [`SchedEnv`] for tests: a manually-advanced tick counter, a recorded
/// alarm-enabled history, a no-op machine switch, and a collecting trace
/// sink. Plays the role the teacher's `NoOpArch` plays for hosted testing.
pub struct TestEnv {
    now: Tick,
    interrupts_enabled: bool,
    alarm_enabled: bool,
    alarm_history: Vec<bool>,
    sink: CollectingSink,
}

impl TestEnv {
    pub fn new() -> Self {
        Self {
            now: Tick::ZERO,
            interrupts_enabled: false,
            alarm_enabled: false,
            alarm_history: Vec::new(),
            sink: CollectingSink::new(),
        }
    }

    pub fn set_now(&mut self, tick: Tick) {
        self.now = tick;
    }

    pub fn advance(&mut self, ticks: u64) {
        self.now += ticks;
    }

    pub fn set_interrupts_enabled(&mut self, enabled: bool) {
        self.interrupts_enabled = enabled;
    }

    pub fn alarm_enabled(&self) -> bool {
        self.alarm_enabled
    }

    pub fn alarm_history(&self) -> &[bool] {
        &self.alarm_history
    }

    pub fn trace_lines(&self) -> &[alloc::string::String] {
        self.sink.lines()
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl SchedEnv for TestEnv {
    fn now_ticks(&self) -> Tick {
        self.now
    }

    fn interrupts_enabled(&self) -> bool {
        self.interrupts_enabled
    }

    fn set_alarm_enabled(&mut self, enabled: bool) {
        self.alarm_enabled = enabled;
        self.alarm_history.push(enabled);
    }

    fn machine_switch(&mut self, _old: &mut ThreadDescriptor, _next: &mut ThreadDescriptor) {}

    fn trace(&mut self, event: TraceEvent) {
        self.sink.emit(event);
    }
}

/// Boxed collaborator hooks a [`ThreadDescriptor`] may optionally carry.
/// Grouped here rather than inline in `thread.rs` since they are the
/// external-interface half of the thread descriptor, not its scheduling
/// state.
pub struct ThreadHooks {
    pub user_regs: Option<Box<dyn UserRegisters>>,
    pub space: Option<Box<dyn AddressSpace>>,
    pub stack_guard: Option<Box<dyn StackGuard>>,
}

impl ThreadHooks {
    pub fn none() -> Self {
        Self {
            user_regs: None,
            space: None,
            stack_guard: None,
        }
    }
}

impl Default for ThreadHooks {
    fn default() -> Self {
        Self::none()
    }
}

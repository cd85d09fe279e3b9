//! Thread descriptor: the scheduler-visible fields of a kernel thread.
//!
//! Grounded on the teacher's `ThreadId`/`ThreadState` (this file, previously
//! `Thread`/`ThreadInner`): the identity and state-machine shape carries
//! over, but the scheduling fields (predicted burst, accumulated burst,
//! dispatch/wait bookkeeping) are new, and the atomics-heavy
//! `ArcLite`-shared-ownership design is dropped in favor of a single owning
//! `Box<ThreadDescriptor>` moved between containers (see `sched::ready_set`)
//! — the ownership-transfer model the scheduler's design notes call for.

use core::fmt;
use core::num::NonZeroUsize;

use crate::env::ThreadHooks;
use crate::time::Tick;

/// Stable integer identity for a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ThreadId(NonZeroUsize);

impl ThreadId {
    /// # Panics
    /// Panics if `id` is zero; zero is reserved as "no thread".
    pub fn new(id: usize) -> Self {
        Self(NonZeroUsize::new(id).expect("thread id must be nonzero"))
    }

    pub fn get(self) -> usize {
        self.0.get()
    }
}

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadStatus {
    New,
    Ready,
    Running,
    Blocked,
    Terminated,
}

/// The scheduler-visible state of one thread. Owned, at any moment, by
/// exactly one of: a `Scheduler`'s ready-set band, its `current` slot, its
/// `to_be_destroyed` slot, or a caller holding a blocked thread outside the
/// scheduler's purview.
pub struct ThreadDescriptor {
    pub id: ThreadId,
    pub priority: u8,
    /// `T`: exponentially smoothed estimate of the thread's next CPU burst.
    pub predicted_burst: f64,
    /// `tempTick`: ticks consumed since the thread last started running.
    pub accum_burst: u64,
    pub last_dispatch_tick: Tick,
    pub wait_start_tick: Tick,
    pub status: ThreadStatus,
    pub hooks: ThreadHooks,
}

impl ThreadDescriptor {
    pub fn new(id: ThreadId, priority: u8, predicted_burst: f64) -> Self {
        Self {
            id,
            priority,
            predicted_burst: predicted_burst.max(0.0),
            accum_burst: 0,
            last_dispatch_tick: Tick::ZERO,
            wait_start_tick: Tick::ZERO,
            status: ThreadStatus::New,
            hooks: ThreadHooks::none(),
        }
    }

    pub fn with_hooks(mut self, hooks: ThreadHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Sentinel check on the thread's kernel stack. A thread with no guard
    /// installed is treated as always intact (host-side tests commonly
    /// don't need one).
    pub fn check_overflow(&self) -> bool {
        match self.hooks.stack_guard.as_ref() {
            Some(guard) => guard.check_overflow(),
            None => true,
        }
    }

    pub fn owns_address_space(&self) -> bool {
        self.hooks.space.is_some()
    }

    pub fn save_user_state(&mut self) {
        if let Some(regs) = self.hooks.user_regs.as_mut() {
            regs.save();
        }
        if let Some(space) = self.hooks.space.as_mut() {
            space.save();
        }
    }

    pub fn restore_user_state(&mut self) {
        if let Some(regs) = self.hooks.user_regs.as_mut() {
            regs.restore();
        }
        if let Some(space) = self.hooks.space.as_mut() {
            space.restore();
        }
    }
}

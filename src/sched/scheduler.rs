//! Placement, selection, preemption and dispatch: the scheduler's core.
//!
//! Grounded on `src/sched/trait_def.rs` (`Scheduler::enqueue`/`pick_next`)
//! and `src/sched/rr.rs::pick_next` for the placement/selection shape, and
//! on `src/kernel.rs` (`yield_now`, `start_first_thread`, its
//! `to_be_destroyed`-style one-slot handoff) for dispatch and reclamation.
//!
//! Rust ownership forces one deliberate departure from the source's
//! pointer-aliasing dispatch protocol: the original re-admits the
//! yielding/preempted thread to its ready queue *while it is still
//! referenced by `current`*, then has `run()` re-read `current` to do the
//! save-state/stack-check bookkeeping before finally overwriting the
//! `current` pointer. That transient double-reference has no Rust
//! equivalent without two live owners of the same `Box`. `run` here (named
//! [`Scheduler::run`] to match the external contract) instead performs the
//! predictor update, the save/overflow bookkeeping, *and* the requeue/
//! block/destroy decision for the outgoing thread all in one call, before
//! it ever hands ownership anywhere — see `DESIGN.md` for the full
//! rationale.

extern crate alloc;
use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::config::SchedConfig;
use crate::env::SchedEnv;
use crate::errors::SchedResult;
use crate::sched::aging::{age, Migration};
use crate::sched::ready_set::{Band, ReadySet};
use crate::thread::{ThreadDescriptor, ThreadId, ThreadStatus};
use crate::trace::TraceEvent;

/// The reason a `current` thread is giving up the CPU, passed to
/// [`Scheduler::run`]. The source's `run(next, finishing: bool)` folds
/// this into a single boolean plus an implicit, already-applied status
/// change on `current`; Rust's ownership model needs the caller to state
/// the outgoing thread's fate explicitly instead of mutating a status
/// field on a pointer the scheduler still holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchReason {
    /// Voluntary yield or an L1/L2 preemption: `old` is re-admitted to the
    /// ready set.
    Yield,
    /// L3 quantum expiry: equivalent to `Yield` for dispatch purposes, kept
    /// as a distinct variant so callers and traces can tell the two apart.
    Preempted,
    /// `old` is blocking on I/O or a synchronization primitive: not
    /// re-admitted; ownership is returned to the caller, who is
    /// responsible for storing it and calling [`Scheduler::ready_to_run`]
    /// again on wake-up.
    Block,
    /// `old` has finished; it becomes `to_be_destroyed`.
    Finish,
}

fn update_predictor(thread: &mut ThreadDescriptor) {
    let measured = thread.accum_burst as f64;
    thread.predicted_burst = (0.5 * measured + 0.5 * thread.predicted_burst).max(0.0);
}

/// `(total, l1_len, l2_len, l3_len)`, mirroring the teacher's
/// `RoundRobinScheduler::stats()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedStats {
    pub total: usize,
    pub l1: usize,
    pub l2: usize,
    pub l3: usize,
}

pub struct Scheduler<E: SchedEnv> {
    env: E,
    config: SchedConfig,
    ready: ReadySet,
    current: Option<Box<ThreadDescriptor>>,
    to_be_destroyed: Option<Box<ThreadDescriptor>>,
    enable_preempt_once: bool,
}

impl<E: SchedEnv> Scheduler<E> {
    pub fn new(env: E, config: SchedConfig) -> SchedResult<Self> {
        config.validate()?;
        Ok(Self {
            env,
            config,
            ready: ReadySet::new(),
            current: None,
            to_be_destroyed: None,
            enable_preempt_once: false,
        })
    }

    pub fn config(&self) -> &SchedConfig {
        &self.config
    }

    pub fn current(&self) -> Option<&ThreadDescriptor> {
        self.current.as_deref()
    }

    pub fn env(&self) -> &E {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        &mut self.env
    }

    fn contains_id(&self, id: ThreadId) -> bool {
        self.current.as_deref().map(|t| t.id) == Some(id)
            || self.to_be_destroyed.as_deref().map(|t| t.id) == Some(id)
            || self.ready.iter_in_band_order().any(|t| t.id == id)
    }

    fn place(&mut self, mut thread: Box<ThreadDescriptor>, now: crate::time::Tick, is_self_requeue: bool) {
        thread.status = ThreadStatus::Ready;
        thread.wait_start_tick = now;
        let id = thread.id;
        let band = self.ready.insert(thread, &self.config);
        self.env.trace(TraceEvent::Inserted { tick: now, id, band });
        if !is_self_requeue && matches!(band, Band::L1 | Band::L2) {
            self.enable_preempt_once = true;
        }
    }

    /// §4.1 Placement. Admits a brand-new or woken-up thread — never the
    /// thread currently occupying `current`; re-admission of the running
    /// thread happens inside [`Scheduler::run`] instead (see module docs).
    ///
    /// Preserves a literal, documented quirk of the source (spec.md §9
    /// open question): every call, regardless of which thread is being
    /// admitted, recomputes `current`'s predictor from `current`'s
    /// `accum_burst` if a thread is currently running. This looks like a
    /// bug — an unrelated admission perturbs the running thread's burst
    /// estimate — and is flagged as such, but is kept for behavioral
    /// fidelity rather than silently fixed.
    ///
    /// # Panics
    /// Panics if interrupts are enabled, or if `thread`'s id is already
    /// current, queued, or pending destruction — both are contract
    /// violations the scheduler does not attempt to recover from.
    pub fn ready_to_run(&mut self, thread: Box<ThreadDescriptor>) {
        assert!(
            !self.env.interrupts_enabled(),
            "scheduler entered with interrupts enabled"
        );
        assert!(
            !self.contains_id(thread.id),
            "thread {} is already known to the scheduler",
            thread.id
        );
        let now = self.env.now_ticks();
        if let Some(cur) = self.current.as_mut() {
            update_predictor(cur);
        }
        self.place(thread, now, false);
    }

    /// §4.2 Selection. Removes and returns the head of the highest
    /// non-empty band (L1 -> L2 -> L3), enabling the round-robin alarm iff
    /// the winner came from L3.
    pub fn find_next_to_run(&mut self) -> Option<Box<ThreadDescriptor>> {
        assert!(
            !self.env.interrupts_enabled(),
            "scheduler entered with interrupts enabled"
        );
        let now = self.env.now_ticks();
        let (thread, band) = self.ready.pop_highest()?;
        self.env.trace(TraceEvent::Removed { tick: now, id: thread.id, band });
        self.env.set_alarm_enabled(band == Band::L3);
        Some(thread)
    }

    /// §4.2 Selection, without removal. Used by the preemption policy.
    pub fn peek_next(&self) -> Option<&ThreadDescriptor> {
        assert!(
            !self.env.interrupts_enabled(),
            "scheduler entered with interrupts enabled"
        );
        self.ready.peek_highest().map(|(t, _)| t)
    }

    /// §4.3(b). Consumes `enable_preempt_once` into a yes/no decision iff
    /// it evaluates true; if it evaluates false the flag is left set (it
    /// is cleared unconditionally on the next dispatch regardless, per
    /// spec.md §4.3) so a later, more urgent arrival still gets to trigger
    /// it.
    pub fn preemption_check(&mut self) -> bool {
        assert!(
            !self.env.interrupts_enabled(),
            "scheduler entered with interrupts enabled"
        );
        if !self.enable_preempt_once {
            return false;
        }
        let Some(current) = self.current.as_ref() else {
            return false;
        };
        let Some((candidate, candidate_band)) = self.ready.peek_highest() else {
            return false;
        };
        let current_band = Band::for_priority(current.priority, &self.config);
        let should_preempt = match current_band {
            Band::L3 => matches!(candidate_band, Band::L1 | Band::L2),
            Band::L2 => candidate_band == Band::L1,
            Band::L1 => {
                candidate_band == Band::L1 && candidate.predicted_burst < current.predicted_burst
            }
        };
        if should_preempt {
            self.enable_preempt_once = false;
        }
        should_preempt
    }

    /// §4.3(a) / §4.4. Advances the simulated clock by one tick: bumps
    /// `current`'s `accum_burst`, runs the aging pass, and reports whether
    /// an L3 quantum has expired (the caller is then expected to call
    /// [`Scheduler::find_next_to_run`] and [`Scheduler::run`] with
    /// [`SwitchReason::Preempted`]).
    pub fn tick(&mut self) -> bool {
        assert!(
            !self.env.interrupts_enabled(),
            "scheduler entered with interrupts enabled"
        );
        let now = self.env.now_ticks();
        if let Some(cur) = self.current.as_mut() {
            cur.accum_burst += 1;
        }
        self.run_aging(now);
        match self.current.as_ref() {
            Some(cur) if Band::for_priority(cur.priority, &self.config) == Band::L3 => {
                cur.accum_burst >= self.config.l3_quantum
            }
            _ => false,
        }
    }

    fn run_aging(&mut self, now: crate::time::Tick) {
        let migrations: Vec<Migration> = age(&mut self.ready, now, &self.config);
        for m in migrations {
            self.env.trace(TraceEvent::Removed { tick: now, id: m.id, band: m.from });
            self.env.trace(TraceEvent::Inserted { tick: now, id: m.id, band: m.to });
            // An aging-driven migration into L1/L2 is the same kind of
            // "arrival" event §4.3(b) reacts to for ordinary admissions;
            // without this, a thread aged up into L2 would never get a
            // chance to preempt an L3 `current` (spec.md §8 scenario 6).
            if matches!(m.to, Band::L1 | Band::L2) {
                self.enable_preempt_once = true;
            }
        }
    }

    /// Applies the outgoing-thread bookkeeping [`Scheduler::run`] performs
    /// on `current` (predictor update, user-state save, overflow check,
    /// the `Replaced` trace) and re-admits it to the ready set, without
    /// selecting a replacement. A no-op if nothing is current.
    ///
    /// Exists for the one dispatch shape `run` cannot express on its own:
    /// preempting `current` when it may be the *only* ready-adjacent
    /// thread, so the replacement has to be chosen by
    /// [`Scheduler::find_next_to_run`] *after* `current` is back in the
    /// ready set (spec.md §8 scenario 5 — a sole L3 thread re-selects
    /// itself every quantum). Callers should follow this with
    /// `find_next_to_run` and `run`.
    pub fn requeue_current(&mut self) {
        assert!(
            !self.env.interrupts_enabled(),
            "scheduler entered with interrupts enabled"
        );
        let now = self.env.now_ticks();
        let Some(mut old) = self.current.take() else {
            return;
        };
        update_predictor(&mut old);
        if old.owns_address_space() {
            old.save_user_state();
        }
        assert!(
            old.check_overflow(),
            "stack overflow sentinel corrupted for thread {}",
            old.id
        );
        self.env.trace(TraceEvent::Replaced {
            tick: now,
            id: old.id,
            ran_ticks: old.accum_burst,
        });
        self.place(old, now, true);
    }

    /// §4.5 Dispatch. See module docs for how this departs from the
    /// source's pointer-aliasing protocol. Returns ownership of the
    /// outgoing thread back to the caller only for [`SwitchReason::Block`]
    /// (blocked threads are outside the ready set's purview); `None`
    /// otherwise.
    pub fn run(&mut self, next: Box<ThreadDescriptor>, reason: SwitchReason) -> Option<Box<ThreadDescriptor>> {
        assert!(
            !self.env.interrupts_enabled(),
            "scheduler entered with interrupts enabled"
        );

        // Reclaim whatever the *previous* Finish left behind. Doing this
        // here, before `old` is taken, is what makes a finished thread
        // survive until the next dispatch rather than being destroyed
        // within the same call that terminated it.
        self.check_to_be_destroyed();

        let now = self.env.now_ticks();
        let mut next = next;
        let mut old = self.current.take();

        if let Some(old_thread) = old.as_mut() {
            // Predictor update happens for every reason that takes the CPU
            // away from `old_thread`, block included (spec.md §9 open
            // question, preserved literally).
            update_predictor(old_thread);

            if old_thread.owns_address_space() {
                old_thread.save_user_state();
            }
            assert!(
                old_thread.check_overflow(),
                "stack overflow sentinel corrupted for thread {}",
                old_thread.id
            );

            self.env.trace(TraceEvent::Replaced {
                tick: now,
                id: old_thread.id,
                ran_ticks: old_thread.accum_burst,
            });
        }

        next.status = ThreadStatus::Running;
        next.last_dispatch_tick = now;
        next.accum_burst = 0;

        if let Some(old_thread) = old.as_mut() {
            self.env.machine_switch(old_thread, &mut next);
        }

        self.env.trace(TraceEvent::Selected { tick: now, id: next.id });
        self.current = Some(next);

        let handed_back = match reason {
            SwitchReason::Finish => {
                assert!(self.to_be_destroyed.is_none(), "double destroy");
                if let Some(mut t) = old {
                    t.status = ThreadStatus::Terminated;
                    self.to_be_destroyed = Some(t);
                }
                None
            }
            SwitchReason::Block => old.map(|mut t| {
                t.status = ThreadStatus::Blocked;
                t
            }),
            SwitchReason::Yield | SwitchReason::Preempted => {
                if let Some(t) = old {
                    self.place(t, now, true);
                }
                None
            }
        };

        self.enable_preempt_once = false;
        if let Some(cur) = self.current.as_mut() {
            if cur.owns_address_space() {
                cur.restore_user_state();
            }
        }

        handed_back
    }

    /// §4.6 Reclamation. Idempotent.
    pub fn check_to_be_destroyed(&mut self) {
        assert!(
            !self.env.interrupts_enabled(),
            "scheduler entered with interrupts enabled"
        );
        self.to_be_destroyed = None;
    }

    pub fn stats(&self) -> SchedStats {
        SchedStats {
            total: self.ready.len() + self.current.is_some() as usize,
            l1: self.ready.band_len(Band::L1),
            l2: self.ready.band_len(Band::L2),
            l3: self.ready.band_len(Band::L3),
        }
    }

    /// Debug dump of the ready set in order L1, L2, L3, each entry
    /// rendered with [`TraceEvent::Debug`] and routed through the same
    /// trace sink as the four stable events, but in a format that is
    /// explicitly not part of the stable, compatibility-sensitive contract
    /// those four use.
    pub fn print(&mut self) {
        for t in self.ready.iter_in_band_order() {
            let band = Band::for_priority(t.priority, &self.config);
            self.env.trace(TraceEvent::Debug {
                id: t.id,
                band,
                priority: t.priority,
                predicted_burst: t.predicted_burst,
                accum_burst: t.accum_burst,
            });
        }
    }
}

//! Priority aging: the sole starvation-prevention mechanism, run
//! periodically over every thread in the ready set.
//!
//! No direct teacher analogue (the teacher's round-robin scheduler has no
//! notion of priority decay); grounded on the aging sketch in
//! `other_examples/..._michaelmillar-from-zero-to-systems_process-scheduler`
//! (`age_processes`), adapted from a single flat "boost to queue 0" rule to
//! per-band migration against this scheduler's three distinct orderings.

extern crate alloc;
use alloc::vec::Vec;

use crate::config::SchedConfig;
use crate::sched::ready_set::{Band, ReadySet};
use crate::thread::ThreadId;
use crate::time::Tick;

/// A thread whose band changed as a result of this aging pass, reported so
/// the caller can emit the paired remove/insert trace events. Same-band
/// priority bumps (e.g. 60 -> 70, still L2) are applied but not reported
/// here, since the thread never left its queue from an external
/// observer's point of view.
pub struct Migration {
    pub id: ThreadId,
    pub from: Band,
    pub to: Band,
}

/// Ages every thread currently in `ready`. A thread ages iff it has waited
/// at least `config.aging_threshold` ticks since its `wait_start_tick`;
/// aging never touches `current` or blocked threads because neither is
/// ever present in `ready`.
pub fn age(ready: &mut ReadySet, now: Tick, config: &SchedConfig) -> Vec<Migration> {
    let mut migrations = Vec::new();
    let drained = ready.drain_all();

    for mut thread in drained {
        let from = Band::for_priority(thread.priority, config);

        if now.since(thread.wait_start_tick) >= config.aging_threshold {
            thread.priority = thread
                .priority
                .saturating_add(config.aging_increment)
                .min(config.priority_ceiling);
            thread.wait_start_tick = now;
        }

        let to = Band::for_priority(thread.priority, config);
        let id = thread.id;
        ready.insert(thread, config);

        if to != from {
            migrations.push(Migration { id, from, to });
        }
    }

    migrations
}

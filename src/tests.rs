//! Top-level scenario and invariant tests, exercising the scheduler the
//! way a driver loop would rather than unit-testing one module in
//! isolation. Grounded on the teacher's `tests/integration.rs` style of
//! running a `RoundRobinScheduler` end to end rather than poking at its
//! internals.

use alloc::boxed::Box;

use crate::config::SchedConfig;
use crate::env::TestEnv;
use crate::sched::{Band, Scheduler, SwitchReason};
use crate::thread::{ThreadDescriptor, ThreadId};
use crate::time::Tick;

fn sched() -> Scheduler<TestEnv> {
    Scheduler::new(TestEnv::new(), SchedConfig::default()).unwrap()
}

fn thread(id: usize, priority: u8, predicted_burst: f64) -> Box<ThreadDescriptor> {
    Box::new(ThreadDescriptor::new(ThreadId::new(id), priority, predicted_burst))
}

// ---------------------------------------------------------------------
// Scenario 1: strict FIFO within L3.
// ---------------------------------------------------------------------

#[test]
fn scenario_l3_is_fifo_regardless_of_priority() {
    let mut s = sched();
    s.ready_to_run(thread(1, 30, 0.0));
    s.ready_to_run(thread(2, 40, 0.0));
    s.ready_to_run(thread(3, 20, 0.0));

    let order: alloc::vec::Vec<usize> = (0..3)
        .map(|_| s.find_next_to_run().unwrap().id.get())
        .collect();
    assert_eq!(order, alloc::vec![1, 2, 3]);
}

// ---------------------------------------------------------------------
// Scenario 2: L2 selects by descending priority.
// ---------------------------------------------------------------------

#[test]
fn scenario_l2_selects_highest_priority_first() {
    let mut s = sched();
    s.ready_to_run(thread(1, 60, 0.0));
    s.ready_to_run(thread(2, 80, 0.0));
    s.ready_to_run(thread(3, 70, 0.0));

    let order: alloc::vec::Vec<usize> = (0..3)
        .map(|_| s.find_next_to_run().unwrap().id.get())
        .collect();
    assert_eq!(order, alloc::vec![2, 3, 1]);
}

// ---------------------------------------------------------------------
// Scenario 3: L1 selects shortest predicted burst first, and a yield
// recomputes the predictor before re-admission.
// ---------------------------------------------------------------------

#[test]
fn scenario_l1_selects_shortest_predicted_burst_first() {
    let mut s = sched();
    s.ready_to_run(thread(1, 120, 50.0));
    s.ready_to_run(thread(2, 130, 10.0));
    s.ready_to_run(thread(3, 100, 30.0));

    let order: alloc::vec::Vec<usize> = (0..3)
        .map(|_| s.find_next_to_run().unwrap().id.get())
        .collect();
    assert_eq!(order, alloc::vec![2, 3, 1]);
}

#[test]
fn scenario_l1_yield_recomputes_predictor_and_repositions() {
    let mut s = sched();
    // C and D stay in L1 while A is dispatched and yields.
    s.ready_to_run(thread(3, 110, 30.0)); // C
    s.ready_to_run(thread(4, 110, 40.0)); // D

    let a = thread(1, 120, 50.0);
    assert!(s.run(a, SwitchReason::Yield).is_none()); // first dispatch, A becomes current

    for _ in 0..20 {
        s.tick();
    }
    assert_eq!(s.current().unwrap().accum_burst, 20);

    // A yields; C (lowest predicted burst, 30) is dispatched next.
    let c = s.find_next_to_run().unwrap();
    assert_eq!(c.id, ThreadId::new(3));
    assert!(s.run(c, SwitchReason::Yield).is_none());

    // A's predictor is now 0.5*20 + 0.5*50 = 35, landing it between D (40)
    // and where C used to sit.
    let next = s.find_next_to_run().unwrap();
    assert_eq!(next.id, ThreadId::new(1));
    assert!((next.predicted_burst - 35.0).abs() < f64::EPSILON);
    let after = s.find_next_to_run().unwrap();
    assert_eq!(after.id, ThreadId::new(4));
}

// ---------------------------------------------------------------------
// Scenario 4: preemption by a higher-band arrival.
// ---------------------------------------------------------------------

#[test]
fn scenario_higher_band_arrival_preempts_current() {
    let mut s = sched();
    let a = thread(1, 20, 0.0); // L3
    assert!(s.run(a, SwitchReason::Yield).is_none());

    s.env_mut().set_now(Tick(200));
    s.ready_to_run(thread(2, 90, 0.0)); // L2 arrival

    assert!(s.preemption_check(), "L2 arrival must preempt an L3 current");

    let next = s.find_next_to_run().unwrap();
    assert_eq!(next.id, ThreadId::new(2));
    s.run(next, SwitchReason::Preempted);

    assert_eq!(s.current().unwrap().id, ThreadId::new(2));
    // A is back in the ready set, still L3.
    let requeued = s.find_next_to_run().unwrap();
    assert_eq!(requeued.id, ThreadId::new(1));
}

// ---------------------------------------------------------------------
// Scenario 5: L3 quantum expiry re-selects a sole thread immediately.
// ---------------------------------------------------------------------

#[test]
fn scenario_l3_quantum_expiry_reselects_sole_thread() {
    let mut s = sched();
    let a = thread(1, 10, 0.0);
    assert!(s.run(a, SwitchReason::Yield).is_none());

    let mut expired = false;
    for _ in 0..100 {
        expired = s.tick();
    }
    assert!(expired, "accum_burst should reach the default quantum of 100");

    // No other candidate exists yet: find_next_to_run would see an empty
    // ready set until `current` is requeued.
    s.requeue_current();
    let next = s.find_next_to_run().unwrap();
    assert_eq!(next.id, ThreadId::new(1));
    s.run(next, SwitchReason::Preempted);
    assert_eq!(s.current().unwrap().id, ThreadId::new(1));
    assert_eq!(s.current().unwrap().accum_burst, 0);
}

// ---------------------------------------------------------------------
// Scenario 6: aging crosses band boundaries over time.
//
// Note: with the default config (increment 10, threshold 1500), a thread
// admitted at priority 10 needs four aging passes to reach priority 50
// and cross L3 -> L2 (10 -> 20 -> 30 -> 40 -> 50), landing exactly at
// t=6000. This scheduler does *not* let that L2 thread preempt an L1
// `current`, since L1 strictly dominates L2 at selection time and no
// trigger rule allows an L2 arrival to interrupt L1 (see DESIGN.md); only
// the band-crossing timeline itself is asserted here.
// ---------------------------------------------------------------------

#[test]
fn scenario_aging_crosses_band_boundaries_over_time() {
    let mut s = sched();
    let h = thread(1, 140, 0.0); // L1, stays current throughout
    assert!(s.run(h, SwitchReason::Yield).is_none());

    s.ready_to_run(thread(2, 10, 0.0)); // L3

    let checkpoints = [(1500u64, 20u8), (3000, 30), (4500, 40), (6000, 50)];
    for (now, expected_priority) in checkpoints {
        s.env_mut().set_now(Tick(now));
        s.tick();
        let (head, _) = (s.peek_next().unwrap(), ());
        assert_eq!(head.priority, expected_priority);
    }

    let (head, band) = (s.peek_next().unwrap(), Band::L2);
    assert_eq!(Band::for_priority(head.priority, s.config()), band);
}

// ---------------------------------------------------------------------
// Cross-cutting invariants (spec.md §8).
// ---------------------------------------------------------------------

#[test]
fn invariant_at_most_one_running_thread_outside_the_ready_set() {
    let mut s = sched();
    s.ready_to_run(thread(1, 10, 0.0));
    s.ready_to_run(thread(2, 20, 0.0));
    let first = s.find_next_to_run().unwrap();
    s.run(first, SwitchReason::Yield);

    assert!(s.current().is_some());
    // The running thread never also appears in the ready set.
    let current_id = s.current().unwrap().id;
    let mut remaining = alloc::vec::Vec::new();
    while let Some(t) = s.find_next_to_run() {
        remaining.push(t.id);
    }
    assert!(!remaining.contains(&current_id));
}

#[test]
fn invariant_queue_membership_matches_priority_band() {
    let mut s = sched();
    s.ready_to_run(thread(1, 10, 0.0)); // L3
    s.ready_to_run(thread(2, 60, 0.0)); // L2
    s.ready_to_run(thread(3, 120, 0.0)); // L1
    let stats = s.stats();
    assert_eq!(stats.l1, 1);
    assert_eq!(stats.l2, 1);
    assert_eq!(stats.l3, 1);
}

#[test]
fn invariant_selection_always_prefers_l1_then_l2_then_l3() {
    let mut s = sched();
    s.ready_to_run(thread(1, 10, 0.0));
    s.ready_to_run(thread(2, 60, 0.0));
    s.ready_to_run(thread(3, 120, 5.0));

    assert_eq!(s.find_next_to_run().unwrap().id, ThreadId::new(3));
    assert_eq!(s.find_next_to_run().unwrap().id, ThreadId::new(2));
    assert_eq!(s.find_next_to_run().unwrap().id, ThreadId::new(1));
}

#[test]
fn invariant_to_be_destroyed_is_reclaimed_by_the_next_dispatch() {
    let mut s = sched();
    let a = thread(1, 10, 0.0);
    assert!(s.run(a, SwitchReason::Yield).is_none());

    // A finishes; B is dispatched. A now occupies `to_be_destroyed`.
    let b = thread(2, 10, 0.0);
    assert!(s.run(b, SwitchReason::Finish).is_none());

    // B finishes too. If A's slot hadn't been reclaimed by this second
    // dispatch, the "double destroy" assertion inside `run` would fire.
    let c = thread(3, 10, 0.0);
    assert!(s.run(c, SwitchReason::Finish).is_none());

    s.check_to_be_destroyed();
}

#[test]
fn invariant_no_ready_thread_waits_past_the_aging_threshold_at_its_old_priority() {
    let mut s = sched();
    s.ready_to_run(thread(1, 10, 0.0));
    s.env_mut().set_now(Tick(1500));
    s.tick();
    assert!(s.peek_next().unwrap().priority > 10);
}

#[test]
fn invariant_blocked_thread_is_excluded_from_aging_and_selection() {
    let mut s = sched();
    let a = thread(1, 10, 0.0);
    assert!(s.run(a, SwitchReason::Yield).is_none());

    s.env_mut().set_now(Tick(1500));
    let b = thread(2, 20, 0.0);
    let blocked = s.run(b, SwitchReason::Block).unwrap();
    assert_eq!(blocked.id, ThreadId::new(1));
    assert_eq!(blocked.status, crate::thread::ThreadStatus::Blocked);
    // The blocked thread never re-appears via selection until the caller
    // explicitly re-admits it.
    assert!(s.find_next_to_run().is_none());
}

// ---------------------------------------------------------------------
// Property-style test: a hand-rolled linear-congruential generator
// instead of an external crate, matching the teacher's dependency
// footprint.
// ---------------------------------------------------------------------

struct SimpleRng {
    state: u64,
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    fn gen_range(&mut self, min: u64, max: u64) -> u64 {
        min + (self.next_u64() % (max - min))
    }
}

#[test]
fn property_admitted_threads_are_always_selected_exactly_once() {
    let mut rng = SimpleRng::new(0x5eed_1234);
    for trial in 0..50u64 {
        let mut s = sched();
        let count = rng.gen_range(1, 20) as usize;
        for i in 0..count {
            let priority = rng.gen_range(0, 150) as u8;
            let burst = rng.gen_range(0, 200) as f64;
            s.ready_to_run(thread(trial as usize * 100 + i + 1, priority, burst));
        }

        let mut seen = alloc::collections::BTreeSet::new();
        while let Some(t) = s.find_next_to_run() {
            assert!(seen.insert(t.id), "thread {} selected twice", t.id);
        }
        assert_eq!(seen.len(), count, "every admitted thread must be selected exactly once");
    }
}

// ---------------------------------------------------------------------
// Stable trace format (spec.md §6).
// ---------------------------------------------------------------------

#[test]
fn trace_events_use_the_stable_text_format() {
    let mut s = sched();
    s.ready_to_run(thread(1, 10, 0.0));
    let t = s.find_next_to_run().unwrap();
    s.run(t, SwitchReason::Yield);

    let lines = s.env().trace_lines();
    assert!(lines
        .iter()
        .any(|l| l == "Tick 0: Thread 1 is inserted into queue L3"));
    assert!(lines
        .iter()
        .any(|l| l == "Tick 0: Thread 1 is removed from queue L3"));
    assert!(lines
        .iter()
        .any(|l| l == "Tick 0: Thread 1 is now selected for execution"));
}

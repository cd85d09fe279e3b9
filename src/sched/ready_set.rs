//! The three-band ready set: L1/L2/L3 and their ordering disciplines.
//!
//! Grounded on the teacher's `CpuRunQueue` (`src/sched/rr.rs`), which keeps
//! one `VecDeque` per priority level; generalized here to three *distinct*
//! ordering disciplines (sorted-by-burst, sorted-by-priority, strict FIFO)
//! instead of four same-discipline FIFO levels. Sort-on-insert with a
//! stable sort is deliberate (spec.md §9): queues are short in the
//! instructional setting, and Rust's sort is stable, so admission order is
//! preserved among equal keys without a separate sequence counter.

extern crate alloc;
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use crate::config::SchedConfig;
use crate::thread::ThreadDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    L1,
    L2,
    L3,
}

impl Band {
    pub fn for_priority(priority: u8, config: &SchedConfig) -> Band {
        if priority >= config.l1_band_floor {
            Band::L1
        } else if priority >= config.l2_band_floor {
            Band::L2
        } else {
            Band::L3
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = match self {
            Band::L1 => 1,
            Band::L2 => 2,
            Band::L3 => 3,
        };
        write!(f, "L{}", n)
    }
}

/// The three disjoint ready queues. Every `READY` thread lies in exactly
/// one, chosen by `Band::for_priority`.
#[derive(Default)]
pub struct ReadySet {
    l1: Vec<Box<ThreadDescriptor>>,
    l2: Vec<Box<ThreadDescriptor>>,
    l3: Vec<Box<ThreadDescriptor>>,
}

impl ReadySet {
    pub fn new() -> Self {
        Self {
            l1: Vec::new(),
            l2: Vec::new(),
            l3: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.l1.is_empty() && self.l2.is_empty() && self.l3.is_empty()
    }

    pub fn len(&self) -> usize {
        self.l1.len() + self.l2.len() + self.l3.len()
    }

    pub fn band_len(&self, band: Band) -> usize {
        match band {
            Band::L1 => self.l1.len(),
            Band::L2 => self.l2.len(),
            Band::L3 => self.l3.len(),
        }
    }

    /// Places `thread` according to its priority and re-sorts that band.
    /// Returns the band it landed in.
    pub fn insert(&mut self, thread: Box<ThreadDescriptor>, config: &SchedConfig) -> Band {
        let band = Band::for_priority(thread.priority, config);
        match band {
            Band::L1 => {
                self.l1.push(thread);
                self.l1
                    .sort_by(|a, b| a.predicted_burst.partial_cmp(&b.predicted_burst).unwrap());
            }
            Band::L2 => {
                self.l2.push(thread);
                self.l2.sort_by(|a, b| b.priority.cmp(&a.priority));
            }
            Band::L3 => {
                self.l3.push(thread);
            }
        }
        band
    }

    /// Removes and returns the head of the highest non-empty band, in
    /// order L1 -> L2 -> L3.
    pub fn pop_highest(&mut self) -> Option<(Box<ThreadDescriptor>, Band)> {
        if !self.l1.is_empty() {
            Some((self.l1.remove(0), Band::L1))
        } else if !self.l2.is_empty() {
            Some((self.l2.remove(0), Band::L2))
        } else if !self.l3.is_empty() {
            Some((self.l3.remove(0), Band::L3))
        } else {
            None
        }
    }

    pub fn peek_highest(&self) -> Option<(&ThreadDescriptor, Band)> {
        if let Some(t) = self.l1.first() {
            Some((t, Band::L1))
        } else if let Some(t) = self.l2.first() {
            Some((t, Band::L2))
        } else {
            self.l3.first().map(|t| (t, Band::L3))
        }
    }

    /// Drains every band for the aging pass. Order across bands is
    /// irrelevant since each drained thread is re-inserted individually.
    pub fn drain_all(&mut self) -> Vec<Box<ThreadDescriptor>> {
        let mut all = Vec::with_capacity(self.len());
        all.extend(self.l1.drain(..));
        all.extend(self.l2.drain(..));
        all.extend(self.l3.drain(..));
        all
    }

    /// Debug dump in order L1, L2, L3 as `(id, priority, predicted_burst,
    /// accum_burst)` tuples, for `Scheduler::print`.
    pub fn iter_in_band_order(&self) -> impl Iterator<Item = &Box<ThreadDescriptor>> {
        self.l1.iter().chain(self.l2.iter()).chain(self.l3.iter())
    }
}

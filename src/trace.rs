//! Stable, compatibility-sensitive trace events emitted by the scheduler.
//!
//! The four event shapes below are the only externally observable strings
//! the scheduler core produces; their `Display` output is exactly the
//! stable text format tests are allowed to match against. Unlike the
//! teacher crate's `pl011_println!`, which writes straight to a global
//! UART stream, events here are always routed through an injected
//! [`TraceSink`] so the scheduler core never touches global I/O.

use core::fmt;

extern crate alloc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::sched::Band;
use crate::thread::ThreadId;
use crate::time::Tick;

/// One of the four stable trace events named in the scheduler's contract,
/// plus [`TraceEvent::Debug`], a ready-set dump line used only by
/// [`crate::sched::Scheduler::print`]. `Debug`'s text is deliberately not
/// part of the stable format: it exists for human inspection, not for
/// tests or tooling to match against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceEvent {
    Inserted { tick: Tick, id: ThreadId, band: Band },
    Removed { tick: Tick, id: ThreadId, band: Band },
    Selected { tick: Tick, id: ThreadId },
    Replaced { tick: Tick, id: ThreadId, ran_ticks: u64 },
    Debug {
        id: ThreadId,
        band: Band,
        priority: u8,
        predicted_burst: f64,
        accum_burst: u64,
    },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceEvent::Inserted { tick, id, band } => write!(
                f,
                "Tick {}: Thread {} is inserted into queue {}",
                tick, id, band
            ),
            TraceEvent::Removed { tick, id, band } => write!(
                f,
                "Tick {}: Thread {} is removed from queue {}",
                tick, id, band
            ),
            TraceEvent::Selected { tick, id } => {
                write!(f, "Tick {}: Thread {} is now selected for execution", tick, id)
            }
            TraceEvent::Replaced { tick, id, ran_ticks } => write!(
                f,
                "Tick {}: Thread {} is replaced, and it has executed {} ticks",
                tick, id, ran_ticks
            ),
            TraceEvent::Debug {
                id,
                band,
                priority,
                predicted_burst,
                accum_burst,
            } => write!(
                f,
                "thread {} [{}] priority={} predicted={:.1} accum={}",
                id, band, priority, predicted_burst, accum_burst
            ),
        }
    }
}

/// Collaborator that the scheduler routes every [`TraceEvent`] through.
///
/// This is the injection point called for in spec's design notes on
/// "trace printf coupling" — a real kernel would implement this over its
/// serial console; tests implement it over a buffer.
pub trait TraceSink {
    fn emit(&mut self, event: TraceEvent);
}

/// A [`TraceSink`] that drops every event. Useful when a caller genuinely
/// does not want the scheduler's debug trace, analogous to the teacher's
/// `NoOpArch`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn emit(&mut self, _event: TraceEvent) {}
}

/// A [`TraceSink`] that records every event's rendered text, for tests
/// that assert on the stable trace format.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    lines: Vec<String>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}

impl TraceSink for CollectingSink {
    fn emit(&mut self, event: TraceEvent) {
        self.lines.push(alloc::format!("{}", event));
    }
}

//! Timing and sleep logs
//!
//! Filled on the write path, read only after the run. A `WriterLog` belongs
//! to exactly one writer task; the analog and digital logs inside it grow
//! in lockstep with the sections that writer dispatched.

use std::time::Duration;

/// Timing record for one write call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteSectionInfo {
    /// Units the section was fanned out to
    pub unit_count: i64,
    /// Timestamp of the (first) section written
    pub timestamp: i64,
    /// Wall time of the sink call including the fan-out join
    pub duration: Duration,
    /// Sections covered by the call (1, or the list length in batch mode)
    pub section_count: i64,
    /// Records covered by the call
    pub point_count: i64,
}

/// Append-only log of write timings.
#[derive(Debug, Clone, Default)]
pub struct TimingLog {
    entries: Vec<WriteSectionInfo>,
}

impl TimingLog {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record(&mut self, info: WriteSectionInfo) {
        self.entries.push(info);
    }

    pub fn entries(&self) -> &[WriteSectionInfo] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Append-only log of per-iteration sleep durations.
#[derive(Debug, Clone, Default)]
pub struct SleepLog {
    entries: Vec<Duration>,
}

impl SleepLog {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record(&mut self, slept: Duration) {
        self.entries.push(slept);
    }

    pub fn entries(&self) -> &[Duration] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The full set of logs owned by one writer task.
#[derive(Debug, Clone, Default)]
pub struct WriterLog {
    pub analog: TimingLog,
    pub digital: TimingLog,
    pub sleep: SleepLog,
}

impl WriterLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sections written across both kinds
    pub fn section_count(&self) -> i64 {
        let sum = |log: &TimingLog| log.entries().iter().map(|e| e.section_count).sum::<i64>();
        sum(&self.analog) + sum(&self.digital)
    }
}

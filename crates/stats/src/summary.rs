//! End-of-run reductions
//!
//! Quantiles use the empirical-CDF choice: for sorted length-`n` data and
//! probability `p`, the value at index `min(n-1, floor(p*n))`, so `p=0`
//! selects the first element and `p=1` the last.

use std::time::Duration;

use tracing::warn;

use crate::log::{SleepLog, TimingLog, WriteSectionInfo};

/// Empirical quantile over ascending-sorted data.
pub fn quantile(sorted: &[Duration], p: f64) -> Option<Duration> {
    if sorted.is_empty() {
        return None;
    }
    let idx = ((p * sorted.len() as f64).floor() as usize).min(sorted.len() - 1);
    Some(sorted[idx])
}

/// Sum/avg/percentile reduction of a set of durations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationSummary {
    pub count: usize,
    pub total: Duration,
    pub avg: Duration,
    pub p0: Duration,
    pub p50: Duration,
    pub p95: Duration,
    pub p99: Duration,
    pub p100: Duration,
}

impl DurationSummary {
    /// Reduce `durations`; `None` when empty.
    pub fn compute(durations: &[Duration]) -> Option<Self> {
        if durations.is_empty() {
            return None;
        }

        let mut sorted = durations.to_vec();
        sorted.sort_unstable();

        let count = sorted.len();
        let total: Duration = sorted.iter().sum();

        Some(Self {
            count,
            total,
            avg: total / count as u32,
            p0: quantile(&sorted, 0.0).unwrap_or_default(),
            p50: quantile(&sorted, 0.50).unwrap_or_default(),
            p95: quantile(&sorted, 0.95).unwrap_or_default(),
            p99: quantile(&sorted, 0.99).unwrap_or_default(),
            p100: quantile(&sorted, 1.0).unwrap_or_default(),
        })
    }

    pub fn from_sleep(log: &SleepLog) -> Option<Self> {
        Self::compute(log.entries())
    }
}

/// Reduction of one timing log: write-call durations plus section and point
/// totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingSummary {
    pub sections: i64,
    pub points: i64,
    pub durations: DurationSummary,
}

impl TimingSummary {
    pub fn compute(log: &TimingLog) -> Option<Self> {
        let durations: Vec<Duration> = log.entries().iter().map(|e| e.duration).collect();
        Some(Self {
            sections: log.entries().iter().map(|e| e.section_count).sum(),
            points: log.entries().iter().map(|e| e.point_count).sum(),
            durations: DurationSummary::compute(&durations)?,
        })
    }
}

/// Index-paired view of the analog and digital logs for presentation:
/// the i-th digital entry is merged into the i-th analog entry. Entries
/// beyond the shorter log are omitted; a length divergence is reported
/// once since it usually means the two source files drifted.
pub fn pair_sections(analog: &TimingLog, digital: &TimingLog) -> Vec<WriteSectionInfo> {
    if analog.len() != digital.len() && !analog.is_empty() && !digital.is_empty() {
        warn!(
            analog_entries = analog.len(),
            digital_entries = digital.len(),
            "analog/digital timing logs diverge, pairing truncated to the shorter"
        );
    }

    analog
        .entries()
        .iter()
        .zip(digital.entries())
        .map(|(a, d)| WriteSectionInfo {
            unit_count: a.unit_count,
            timestamp: a.timestamp,
            duration: a.duration + d.duration,
            section_count: a.section_count + d.section_count,
            point_count: a.point_count + d.point_count,
        })
        .collect()
}

/// Wall-clock decomposition of one writer's run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteTimes {
    pub all: Duration,
    pub write: Duration,
    pub sleep: Duration,
}

impl WriteTimes {
    /// Time not spent writing or sleeping (scheduling, channel waits)
    pub fn other(&self) -> Duration {
        self.all.saturating_sub(self.write + self.sleep)
    }
}

#[cfg(test)]
#[path = "summary_test.rs"]
mod summary_test;

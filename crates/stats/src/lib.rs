//! RTDB Writer - Stats
//!
//! Append-only timing logs filled by the writers and reduced to percentile
//! summaries after the run. Each writer task owns its logs outright and
//! hands them back on join; consolidation happens in one place, after every
//! task has finished, so no log is ever shared between tasks.

mod log;
mod report;
mod summary;

pub use log::{SleepLog, TimingLog, WriteSectionInfo, WriterLog};
pub use report::{print_class_summary, print_run_times};
pub use summary::{DurationSummary, TimingSummary, WriteTimes, pair_sections, quantile};

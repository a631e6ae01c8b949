//! RTDB Writer - Pipeline
//!
//! The write schedulers. Both consume [`SectionPair`] channels filled by
//! the source readers and push sections into the sink dispatcher; they
//! differ in pacing:
//!
//! - [`FastDrainWriter`] drains its channels as fast as the sink accepts.
//! - [`PeriodicWriter`] paces iterations at a target period, with an
//!   optional overload-protection warm-up phase and an optional batched
//!   "fast cache" mode.
//!
//! Writers own their timing logs and hand them back in a report when they
//! finish; nothing is shared while the run is hot. Cancellation is
//! cooperative: at each loop head the writer checks the token, and on
//! cancel it drains and discards whatever is still buffered so the readers
//! unblock and exit.
//!
//! [`SectionPair`]: rtdb_protocol::SectionPair

mod fast_drain;
mod periodic;

use std::time::Duration;

use rtdb_protocol::SectionPair;
use tokio::sync::mpsc;
use tracing::debug;

pub use fast_drain::{DrainReport, FastDrainWriter};
pub use periodic::{PeriodicConfig, PeriodicReport, PeriodicWriter};

/// Overload-protection warm-up window
pub const OVERLOAD_WRITE_WINDOW: Duration = Duration::from_millis(2000);

/// Iteration period during the warm-up window
pub const OVERLOAD_WRITE_PERIOD: Duration = Duration::from_millis(50);

/// Steady-state period for fast points
pub const FAST_WRITE_PERIOD: Duration = Duration::from_millis(1);

/// Steady-state period for normal points
pub const NORMAL_WRITE_PERIOD: Duration = Duration::from_millis(400);

/// Sections per kind gathered into one list call in fast-cache mode
pub const FAST_CACHE_CHUNK: usize = 100;

/// Which plugin call family a writer targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteTarget {
    Realtime,
    History,
}

/// Input class of a section channel; selects the `is_fast` wire bit and
/// the timing logs a write lands in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamClass {
    Fast,
    Normal,
}

/// Close a section channel and throw away whatever was still buffered.
///
/// Closing first unblocks any reader waiting on a full channel; the reader
/// then observes the cancellation token and exits on its own.
pub(crate) fn drain_and_discard(rx: &mut mpsc::Receiver<SectionPair>) {
    rx.close();
    let mut discarded = 0usize;
    while rx.try_recv().is_ok() {
        discarded += 1;
    }
    if discarded > 0 {
        debug!(discarded, "discarded buffered sections on cancel");
    }
}

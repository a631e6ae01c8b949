//! Fast-drain writer
//!
//! Select-loop over the fast and normal section channels, forwarding every
//! pair to the sink as soon as it arrives. Within one pair the analog side
//! is written before the digital side; across the two channels arrival
//! order decides.

use rtdb_protocol::SectionPair;
use rtdb_sink::SinkDispatcher;
use rtdb_stats::{WriteSectionInfo, WriteTimes, WriterLog};
use tokio::sync::mpsc;
use tokio::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{StreamClass, WriteTarget, drain_and_discard};

/// Logs and wall-clock totals handed back when the drain finishes.
#[derive(Debug, Default)]
pub struct DrainReport {
    pub fast: WriterLog,
    pub normal: WriterLog,
    pub times: WriteTimes,
}

/// Writer that drains one or two section channels as fast as possible.
///
/// A class with no input is represented by a pre-closed channel; the loop
/// marks that side drained on its first poll.
pub struct FastDrainWriter {
    dispatcher: SinkDispatcher,
    target: WriteTarget,
    cancel: CancellationToken,
    fast_log: WriterLog,
    normal_log: WriterLog,
    write_sum: Duration,
}

impl FastDrainWriter {
    pub fn new(dispatcher: SinkDispatcher, target: WriteTarget, cancel: CancellationToken) -> Self {
        Self {
            dispatcher,
            target,
            cancel,
            fast_log: WriterLog::new(),
            normal_log: WriterLog::new(),
            write_sum: Duration::ZERO,
        }
    }

    /// Drain both channels to completion, or until cancelled.
    ///
    /// On every exit path each received section has either been written or
    /// explicitly discarded.
    pub async fn run(
        mut self,
        mut fast: mpsc::Receiver<SectionPair>,
        mut normal: mpsc::Receiver<SectionPair>,
    ) -> DrainReport {
        let started = Instant::now();
        let mut fast_open = true;
        let mut normal_open = true;

        debug!(target = ?self.target, "fast-drain writer starting");

        while fast_open || normal_open {
            tokio::select! {
                pair = fast.recv(), if fast_open => match pair {
                    Some(pair) => self.write_pair(pair, StreamClass::Fast).await,
                    None => fast_open = false,
                },
                pair = normal.recv(), if normal_open => match pair {
                    Some(pair) => self.write_pair(pair, StreamClass::Normal).await,
                    None => normal_open = false,
                },
                _ = self.cancel.cancelled() => {
                    drain_and_discard(&mut fast);
                    drain_and_discard(&mut normal);
                    break;
                }
            }
        }

        let times = WriteTimes {
            all: started.elapsed(),
            write: self.write_sum,
            sleep: Duration::ZERO,
        };
        info!(
            fast_sections = self.fast_log.section_count(),
            normal_sections = self.normal_log.section_count(),
            total = ?times.all,
            "fast-drain writer finished"
        );

        DrainReport {
            fast: self.fast_log,
            normal: self.normal_log,
            times,
        }
    }

    /// Write the analog side then the digital side of one pair, timing each
    /// sink call separately.
    async fn write_pair(&mut self, pair: SectionPair, class: StreamClass) {
        let unit_count = self.dispatcher.unit_count();
        let is_fast = class == StreamClass::Fast;

        let mut analog_entry = None;
        if let Some(section) = pair.analog {
            let timestamp = section.timestamp;
            let point_count = section.len() as i64;
            let start = Instant::now();
            match self.target {
                WriteTarget::Realtime => self.dispatcher.write_rt_analog(section, is_fast).await,
                WriteTarget::History => self.dispatcher.write_his_analog(section).await,
            }
            let duration = start.elapsed();
            self.write_sum += duration;
            analog_entry = Some(WriteSectionInfo {
                unit_count,
                timestamp,
                duration,
                section_count: 1,
                point_count,
            });
        }

        let mut digital_entry = None;
        if let Some(section) = pair.digital {
            let timestamp = section.timestamp;
            let point_count = section.len() as i64;
            let start = Instant::now();
            match self.target {
                WriteTarget::Realtime => self.dispatcher.write_rt_digital(section, is_fast).await,
                WriteTarget::History => self.dispatcher.write_his_digital(section).await,
            }
            let duration = start.elapsed();
            self.write_sum += duration;
            digital_entry = Some(WriteSectionInfo {
                unit_count,
                timestamp,
                duration,
                section_count: 1,
                point_count,
            });
        }

        let log = match class {
            StreamClass::Fast => &mut self.fast_log,
            StreamClass::Normal => &mut self.normal_log,
        };
        if let Some(entry) = analog_entry {
            log.analog.record(entry);
        }
        if let Some(entry) = digital_entry {
            log.digital.record(entry);
        }
    }
}

#[cfg(test)]
#[path = "fast_drain_test.rs"]
mod fast_drain_test;

//! Periodic writer
//!
//! Paces one section pair per iteration at a target period. The iteration
//! budget is `period`; whatever the write didn't use is slept off and
//! logged. Two-phase cadence: while the warm-up window lasts, iterations
//! target the overload-protection period instead of the steady period. The
//! warm-up is measured in intended period-sum, not wall clock, so a slow
//! sink does not stretch it.
//!
//! In fast-cache mode the writer gathers up to [`FAST_CACHE_CHUNK`]
//! sections per kind and issues one list call per kind per iteration, with
//! an iteration period of `FAST_CACHE_CHUNK * steady_period`.

use rtdb_protocol::{AnalogSection, DigitalSection, SectionPair};
use rtdb_sink::SinkDispatcher;
use rtdb_stats::{WriteSectionInfo, WriteTimes, WriterLog};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::time::{Duration, Instant, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::{
    FAST_CACHE_CHUNK, NORMAL_WRITE_PERIOD, OVERLOAD_WRITE_PERIOD, OVERLOAD_WRITE_WINDOW,
    WriteTarget, drain_and_discard,
};

/// Cadence and routing parameters of one periodic writer.
#[derive(Debug, Clone, Copy)]
pub struct PeriodicConfig {
    /// Warm-up length as a sum of intended periods; zero disables warm-up
    pub overload_window: Duration,
    /// Iteration period during warm-up
    pub overload_period: Duration,
    /// Steady-state iteration period
    pub steady_period: Duration,
    /// Wire bit and log selection
    pub is_fast: bool,
    /// Realtime or history call family
    pub target: WriteTarget,
    /// Fast-cache batching
    pub batch: bool,
}

impl PeriodicConfig {
    /// Fast realtime points: 1 ms cadence, no warm-up.
    pub fn fast(batch: bool) -> Self {
        Self {
            overload_window: Duration::ZERO,
            overload_period: Duration::ZERO,
            steady_period: crate::FAST_WRITE_PERIOD,
            is_fast: true,
            target: WriteTarget::Realtime,
            batch,
        }
    }

    /// Normal realtime points: 400 ms cadence, warm-up optional.
    pub fn normal(overload_protection: bool) -> Self {
        let (window, period) = if overload_protection {
            (OVERLOAD_WRITE_WINDOW, OVERLOAD_WRITE_PERIOD)
        } else {
            (Duration::ZERO, Duration::ZERO)
        };
        Self {
            overload_window: window,
            overload_period: period,
            steady_period: NORMAL_WRITE_PERIOD,
            is_fast: false,
            target: WriteTarget::Realtime,
            batch: false,
        }
    }

    /// History points: normal cadence against the history call family.
    pub fn history() -> Self {
        Self {
            target: WriteTarget::History,
            ..Self::normal(false)
        }
    }
}

/// Logs and wall-clock totals handed back when the writer finishes.
#[derive(Debug, Default)]
pub struct PeriodicReport {
    pub log: WriterLog,
    pub times: WriteTimes,
}

/// Paced writer over one section-pair channel.
pub struct PeriodicWriter {
    dispatcher: SinkDispatcher,
    config: PeriodicConfig,
    cancel: CancellationToken,
    log: WriterLog,
    write_sum: Duration,
    sleep_sum: Duration,
}

impl PeriodicWriter {
    pub fn new(
        dispatcher: SinkDispatcher,
        config: PeriodicConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            dispatcher,
            config,
            cancel,
            log: WriterLog::new(),
            write_sum: Duration::ZERO,
            sleep_sum: Duration::ZERO,
        }
    }

    /// Write until the channel closes or the run is cancelled.
    pub async fn run(mut self, mut rx: mpsc::Receiver<SectionPair>) -> PeriodicReport {
        let started = Instant::now();
        debug!(config = ?self.config, "periodic writer starting");

        if self.config.batch {
            self.run_batched(&mut rx).await;
        } else {
            self.run_paced(&mut rx).await;
        }

        let times = WriteTimes {
            all: started.elapsed(),
            write: self.write_sum,
            sleep: self.sleep_sum,
        };
        info!(
            sections = self.log.section_count(),
            total = ?times.all,
            write = ?times.write,
            slept = ?times.sleep,
            "periodic writer finished"
        );

        PeriodicReport {
            log: self.log,
            times,
        }
    }

    /// One pair per iteration. The receive blocks: an empty channel parks
    /// the writer instead of spinning, and a closed channel terminates it.
    async fn run_paced(&mut self, rx: &mut mpsc::Receiver<SectionPair>) {
        let mut warmup_spent = Duration::ZERO;

        loop {
            if self.cancel.is_cancelled() {
                drain_and_discard(rx);
                return;
            }

            let pair = tokio::select! {
                pair = rx.recv() => match pair {
                    Some(pair) => pair,
                    None => return,
                },
                _ = self.cancel.cancelled() => {
                    drain_and_discard(rx);
                    return;
                }
            };

            let write_duration = self.write_pair(pair).await;

            let period = if warmup_spent < self.config.overload_window {
                warmup_spent += self.config.overload_period;
                self.config.overload_period
            } else {
                self.config.steady_period
            };

            let sleep_duration = period.saturating_sub(write_duration);
            self.log.sleep.record(sleep_duration);
            self.sleep_sum += sleep_duration;
            if !sleep_duration.is_zero() {
                sleep(sleep_duration).await;
            }
        }
    }

    /// Fast-cache mode: gather up to a chunk of sections per kind, one list
    /// call per kind per iteration.
    async fn run_batched(&mut self, rx: &mut mpsc::Receiver<SectionPair>) {
        let period = self.config.steady_period * FAST_CACHE_CHUNK as u32;

        loop {
            if self.cancel.is_cancelled() {
                drain_and_discard(rx);
                return;
            }

            // Block for the first pair of the iteration
            let first = tokio::select! {
                pair = rx.recv() => match pair {
                    Some(pair) => pair,
                    None => return,
                },
                _ = self.cancel.cancelled() => {
                    drain_and_discard(rx);
                    return;
                }
            };

            let mut analogs: Vec<AnalogSection> = Vec::new();
            let mut digitals: Vec<DigitalSection> = Vec::new();
            let mut closed = false;
            push_pair(first, &mut analogs, &mut digitals);

            // Top up without blocking
            while analogs.len() < FAST_CACHE_CHUNK && digitals.len() < FAST_CACHE_CHUNK {
                match rx.try_recv() {
                    Ok(pair) => push_pair(pair, &mut analogs, &mut digitals),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        closed = true;
                        break;
                    }
                }
            }

            let write_duration = self.write_lists(analogs, digitals).await;

            if closed {
                // input exhausted mid-fill: the gathered tail is written,
                // nothing left to pace
                return;
            }

            let sleep_duration = period.saturating_sub(write_duration);
            self.log.sleep.record(sleep_duration);
            self.sleep_sum += sleep_duration;
            if !sleep_duration.is_zero() {
                sleep(sleep_duration).await;
            }
        }
    }

    /// Write analog then digital, one entry per kind.
    async fn write_pair(&mut self, pair: SectionPair) -> Duration {
        let unit_count = self.dispatcher.unit_count();
        let is_fast = self.config.is_fast;
        let mut total = Duration::ZERO;

        let mut analog_entry = None;
        if let Some(section) = pair.analog {
            let timestamp = section.timestamp;
            let point_count = section.len() as i64;
            let start = Instant::now();
            match self.config.target {
                WriteTarget::Realtime => self.dispatcher.write_rt_analog(section, is_fast).await,
                WriteTarget::History => self.dispatcher.write_his_analog(section).await,
            }
            let duration = start.elapsed();
            total += duration;
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
            match self.config.target {
                WriteTarget::Realtime => self.dispatcher.write_rt_digital(section, is_fast).await,
                WriteTarget::History => self.dispatcher.write_his_digital(section).await,
            }
            let duration = start.elapsed();
            total += duration;
            digital_entry = Some(WriteSectionInfo {
                unit_count,
                timestamp,
                duration,
                section_count: 1,
                point_count,
            });
        }

        self.write_sum += total;
        if let Some(entry) = analog_entry {
            self.log.analog.record(entry);
        }
        if let Some(entry) = digital_entry {
            self.log.digital.record(entry);
        }
        total
    }

    /// Issue one list call per non-empty kind.
    async fn write_lists(
        &mut self,
        analogs: Vec<AnalogSection>,
        digitals: Vec<DigitalSection>,
    ) -> Duration {
        let unit_count = self.dispatcher.unit_count();
        let mut total = Duration::ZERO;

        if !analogs.is_empty() {
            let entry_base = (
                analogs[0].timestamp,
                analogs.len() as i64,
                analogs.iter().map(|s| s.len() as i64).sum::<i64>(),
            );
            let start = Instant::now();
            self.dispatcher.write_rt_analog_list(analogs).await;
            let duration = start.elapsed();
            total += duration;
            self.log.analog.record(WriteSectionInfo {
                unit_count,
                timestamp: entry_base.0,
                duration,
                section_count: entry_base.1,
                point_count: entry_base.2,
            });
        }

        if !digitals.is_empty() {
            let entry_base = (
                digitals[0].timestamp,
                digitals.len() as i64,
                digitals.iter().map(|s| s.len() as i64).sum::<i64>(),
            );
            let start = Instant::now();
            self.dispatcher.write_rt_digital_list(digitals).await;
            let duration = start.elapsed();
            total += duration;
            self.log.digital.record(WriteSectionInfo {
                unit_count,
                timestamp: entry_base.0,
                duration,
                section_count: entry_base.1,
                point_count: entry_base.2,
            });
        }

        self.write_sum += total;
        total
    }
}

fn push_pair(pair: SectionPair, analogs: &mut Vec<AnalogSection>, digitals: &mut Vec<DigitalSection>) {
    if let Some(section) = pair.analog {
        analogs.push(section);
    }
    if let Some(section) = pair.digital {
        digitals.push(section);
    }
}

#[cfg(test)]
#[path = "periodic_test.rs"]
mod periodic_test;

//! Report rendering
//!
//! The summary is the product of a benchmark run, so it goes to stdout
//! directly rather than through the log stream.

use crate::log::WriterLog;
use crate::summary::{DurationSummary, TimingSummary, WriteTimes, pair_sections};

fn print_timing_line(label: &str, kind: &str, summary: &TimingSummary) {
    let d = &summary.durations;
    println!(
        "{label:<8} | {kind:<7} | sections: {:>8} | points: {:>10} | total: {:>12?} | avg: {:>10?} | p0: {:>10?} | p50: {:>10?} | p95: {:>10?} | p99: {:>10?} | p100: {:>10?}",
        summary.sections, summary.points, d.total, d.avg, d.p0, d.p50, d.p95, d.p99, d.p100,
    );
}

/// Print the per-kind summaries, the paired view, and the sleep summary for
/// one writer's logs.
pub fn print_class_summary(label: &str, log: &WriterLog) {
    if let Some(summary) = TimingSummary::compute(&log.analog) {
        print_timing_line(label, "analog", &summary);
    }
    if let Some(summary) = TimingSummary::compute(&log.digital) {
        print_timing_line(label, "digital", &summary);
    }

    let paired = pair_sections(&log.analog, &log.digital);
    if !paired.is_empty() {
        let durations: Vec<_> = paired.iter().map(|e| e.duration).collect();
        if let Some(d) = DurationSummary::compute(&durations) {
            let sections: i64 = paired.iter().map(|e| e.section_count).sum();
            let points: i64 = paired.iter().map(|e| e.point_count).sum();
            println!(
                "{label:<8} | paired  | sections: {:>8} | points: {:>10} | total: {:>12?} | avg: {:>10?} | p50: {:>10?} | p99: {:>10?}",
                sections, points, d.total, d.avg, d.p50, d.p99,
            );
        }
    }

    if let Some(d) = DurationSummary::from_sleep(&log.sleep) {
        println!(
            "{label:<8} | sleep   | count: {:>11} | total: {:>12?} | avg: {:>10?} | p0: {:>10?} | p50: {:>10?} | p99: {:>10?} | p100: {:>10?}",
            d.count, d.total, d.avg, d.p0, d.p50, d.p99, d.p100,
        );
    }
}

/// Print the wall-clock decomposition of one writer's run.
pub fn print_run_times(label: &str, times: &WriteTimes) {
    println!(
        "{label:<8} | total: {:?} | write: {:?} | sleep: {:?} | other: {:?}",
        times.all,
        times.write,
        times.sleep,
        times.other(),
    );
}

//! Tests for the periodic writer
//!
//! Cadence tests run on the paused clock: sink calls take zero virtual
//! time, so sleep entries equal the intended period exactly and wall-clock
//! assertions are deterministic.

use std::sync::Arc;
use std::time::Duration;

use rtdb_protocol::{Analog, AnalogSection, Digital, DigitalSection, SectionPair};
use rtdb_sink::SinkDispatcher;
use rtdb_sink::testing::{RecordingSink, SinkCall};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::WriteTarget;
use crate::periodic::{PeriodicConfig, PeriodicWriter};

fn dispatcher(sink: Arc<RecordingSink>) -> SinkDispatcher {
    SinkDispatcher::new(sink, 0x7E57, 1, None).unwrap()
}

fn pair(ts: i64, analog_points: usize, digital_points: usize) -> SectionPair {
    SectionPair {
        analog: (analog_points > 0).then(|| {
            AnalogSection::new(ts, vec![Analog::default(); analog_points])
        }),
        digital: (digital_points > 0).then(|| {
            DigitalSection::new(ts, vec![Digital::default(); digital_points])
        }),
    }
}

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn steady_config(period: Duration) -> PeriodicConfig {
    PeriodicConfig {
        overload_window: Duration::ZERO,
        overload_period: Duration::ZERO,
        steady_period: period,
        is_fast: false,
        target: WriteTarget::Realtime,
        batch: false,
    }
}

#[tokio::test(start_paused = true)]
async fn test_steady_cadence_holds_the_period() {
    let sink = Arc::new(RecordingSink::new());
    let writer = PeriodicWriter::new(
        dispatcher(Arc::clone(&sink)),
        steady_config(ms(400)),
        CancellationToken::new(),
    );

    let (tx, rx) = mpsc::channel(8);
    for ts in 1..=5 {
        tx.send(pair(ts, 2, 0)).await.unwrap();
    }
    drop(tx);

    let report = writer.run(rx).await;

    assert_eq!(report.log.analog.len(), 5);
    assert_eq!(report.log.sleep.len(), 5);
    for &slept in report.log.sleep.entries() {
        assert_eq!(slept, ms(400));
    }
    // five 400 ms iterations, comfortably past the 4-period lower bound
    assert!(report.times.all >= ms(1600));
    assert_eq!(report.times.sleep, ms(2000));
}

#[tokio::test(start_paused = true)]
async fn test_overload_warm_up_switches_to_steady_period() {
    let sink = Arc::new(RecordingSink::new());
    let config = PeriodicConfig {
        overload_window: ms(200),
        overload_period: ms(50),
        steady_period: ms(400),
        is_fast: false,
        target: WriteTarget::Realtime,
        batch: false,
    };
    let writer = PeriodicWriter::new(
        dispatcher(Arc::clone(&sink)),
        config,
        CancellationToken::new(),
    );

    let (tx, rx) = mpsc::channel(8);
    for ts in 1..=6 {
        tx.send(pair(ts, 1, 0)).await.unwrap();
    }
    drop(tx);

    let report = writer.run(rx).await;

    // 200 ms window / 50 ms period = 4 warm-up iterations, then steady
    let slept: Vec<Duration> = report.log.sleep.entries().to_vec();
    assert_eq!(slept, vec![ms(50), ms(50), ms(50), ms(50), ms(400), ms(400)]);
}

#[tokio::test(start_paused = true)]
async fn test_disabled_warm_up_starts_steady() {
    let sink = Arc::new(RecordingSink::new());
    let writer = PeriodicWriter::new(
        dispatcher(Arc::clone(&sink)),
        PeriodicConfig::normal(false),
        CancellationToken::new(),
    );

    let (tx, rx) = mpsc::channel(8);
    tx.send(pair(1, 1, 1)).await.unwrap();
    drop(tx);

    let report = writer.run(rx).await;
    assert_eq!(report.log.sleep.entries(), &[ms(400)]);
}

#[tokio::test(start_paused = true)]
async fn test_history_config_uses_his_calls() {
    let sink = Arc::new(RecordingSink::new());
    let writer = PeriodicWriter::new(
        dispatcher(Arc::clone(&sink)),
        PeriodicConfig::history(),
        CancellationToken::new(),
    );

    let (tx, rx) = mpsc::channel(8);
    tx.send(pair(1, 1, 1)).await.unwrap();
    drop(tx);

    writer.run(rx).await;

    let calls = sink.calls();
    assert!(matches!(calls[0], SinkCall::HisAnalog { .. }));
    assert!(matches!(calls[1], SinkCall::HisDigital { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_batch_mode_chunks_at_one_hundred_sections() {
    let sink = Arc::new(RecordingSink::new());
    let writer = PeriodicWriter::new(
        dispatcher(Arc::clone(&sink)),
        PeriodicConfig::fast(true),
        CancellationToken::new(),
    );

    let (tx, rx) = mpsc::channel(256);
    for ts in 0..250 {
        tx.send(pair(ts, 2, 0)).await.unwrap();
    }
    drop(tx);

    let report = writer.run(rx).await;

    let list_lens: Vec<usize> = sink
        .calls()
        .iter()
        .map(|call| {
            let SinkCall::RtAnalogList { sections, .. } = call else {
                panic!("expected RtAnalogList, got {call:?}");
            };
            sections.len()
        })
        .collect();
    assert_eq!(list_lens, vec![100, 100, 50]);

    let entries = report.log.analog.entries();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].section_count, 100);
    assert_eq!(entries[0].point_count, 200);
    assert_eq!(entries[2].section_count, 50);

    // the final, channel-closing fill writes without a trailing sleep
    assert_eq!(report.log.sleep.len(), 2);
    for &slept in report.log.sleep.entries() {
        // 100 sections per iteration at the 1 ms fast period
        assert_eq!(slept, ms(100));
    }
}

#[tokio::test(start_paused = true)]
async fn test_batch_mode_writes_both_kinds_per_iteration() {
    let sink = Arc::new(RecordingSink::new());
    let writer = PeriodicWriter::new(
        dispatcher(Arc::clone(&sink)),
        PeriodicConfig::fast(true),
        CancellationToken::new(),
    );

    let (tx, rx) = mpsc::channel(16);
    for ts in 0..3 {
        tx.send(pair(ts, 1, 1)).await.unwrap();
    }
    drop(tx);

    let report = writer.run(rx).await;

    let calls = sink.calls();
    assert_eq!(calls.len(), 2);
    let SinkCall::RtAnalogList { sections, .. } = &calls[0] else {
        panic!("expected RtAnalogList first");
    };
    assert_eq!(sections.len(), 3);
    let SinkCall::RtDigitalList { sections, .. } = &calls[1] else {
        panic!("expected RtDigitalList second");
    };
    assert_eq!(sections.len(), 3);

    assert_eq!(report.log.analog.entries()[0].section_count, 3);
    assert_eq!(report.log.digital.entries()[0].section_count, 3);
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_drains_and_returns() {
    let sink = Arc::new(RecordingSink::new());
    let cancel = CancellationToken::new();
    let writer = PeriodicWriter::new(
        dispatcher(Arc::clone(&sink)),
        steady_config(ms(400)),
        cancel.clone(),
    );

    // sender stays open: only the cancel can end the run
    let (tx, rx) = mpsc::channel(64);
    for ts in 0..10 {
        tx.send(pair(ts, 1, 0)).await.unwrap();
    }
    cancel.cancel();

    let report = writer.run(rx).await;

    assert!(report.log.analog.len() <= 10);
    assert!(tx.send(pair(99, 1, 0)).await.is_err());
}

#[tokio::test(start_paused = true)]
async fn test_closed_empty_channel_terminates_without_calls() {
    let sink = Arc::new(RecordingSink::new());
    let writer = PeriodicWriter::new(
        dispatcher(Arc::clone(&sink)),
        steady_config(ms(400)),
        CancellationToken::new(),
    );

    let (tx, rx) = mpsc::channel::<SectionPair>(1);
    drop(tx);

    let report = writer.run(rx).await;

    assert_eq!(sink.call_count(), 0);
    assert!(report.log.analog.is_empty());
    assert!(report.log.sleep.is_empty());
}

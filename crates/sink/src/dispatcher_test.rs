//! Tests for the per-unit fan-out dispatcher

use std::sync::Arc;

use rtdb_protocol::{Analog, AnalogSection, Digital, DigitalSection, GlobalId, StaticDigital};

use crate::dispatcher::{SinkDispatcher, StaticKind};
use crate::error::SinkError;
use crate::randomize::UnitOffset;
use crate::testing::{RecordingSink, SinkCall};

const MAGIC: u32 = 0xCAFE;

fn analog_section(timestamp: i64, values: &[f64]) -> AnalogSection {
    let records = values
        .iter()
        .enumerate()
        .map(|(i, &av)| Analog {
            p_num: i as i32 + 1,
            av,
            ..Default::default()
        })
        .collect();
    AnalogSection::new(timestamp, records)
}

fn dispatcher(
    sink: Arc<RecordingSink>,
    unit_count: i64,
    randomize: bool,
) -> SinkDispatcher {
    SinkDispatcher::new(
        sink,
        MAGIC,
        unit_count,
        randomize.then(|| Arc::new(UnitOffset) as Arc<dyn crate::Randomize>),
    )
    .unwrap()
}

#[tokio::test]
async fn test_single_unit_is_one_call_with_stamped_ids() {
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = dispatcher(Arc::clone(&sink), 1, false);

    dispatcher
        .write_rt_analog(analog_section(100, &[1.0, 2.0, 3.0]), true)
        .await;

    let calls = sink.calls();
    assert_eq!(calls.len(), 1);
    let SinkCall::RtAnalog {
        magic,
        unit_id,
        section,
        is_fast,
    } = &calls[0]
    else {
        panic!("expected RtAnalog, got {:?}", calls[0]);
    };
    assert_eq!(*magic, MAGIC);
    assert_eq!(*unit_id, 0);
    assert!(*is_fast);
    assert_eq!(section.timestamp, 100);
    assert_eq!(section.len(), 3);

    let id = GlobalId::decode(section.records[0].global_id);
    assert_eq!(id.magic, MAGIC);
    assert_eq!(id.unit_id, 0);
    assert!(id.is_analog);
    assert!(id.is_fast);
    assert!(id.is_realtime);
    assert_eq!(id.point_number, 1);
}

#[tokio::test]
async fn test_fan_out_across_four_units_with_randomize() {
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = dispatcher(Arc::clone(&sink), 4, true);

    let base = analog_section(100, &[1.0]);
    dispatcher.write_rt_analog(base.clone(), true).await;

    // exactly one call per unit; order across units is not guaranteed
    let mut seen: Vec<(u8, f64)> = sink
        .calls()
        .iter()
        .map(|call| {
            let SinkCall::RtAnalog {
                unit_id, section, ..
            } = call
            else {
                panic!("expected RtAnalog, got {call:?}");
            };
            (*unit_id, section.records[0].av)
        })
        .collect();
    seen.sort_by_key(|&(unit_id, _)| unit_id);

    assert_eq!(seen, vec![(0, 1.0), (1, 2.0), (2, 3.0), (3, 4.0)]);

    // the base section was copied, never mutated
    assert_eq!(base.records[0].av, 1.0);
    assert_eq!(base.records[0].global_id, 0);
}

#[tokio::test]
async fn test_randomize_disabled_leaves_values_alone() {
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = dispatcher(Arc::clone(&sink), 3, false);

    dispatcher.write_rt_analog(analog_section(7, &[5.5]), false).await;

    for call in sink.calls() {
        let SinkCall::RtAnalog { section, .. } = call else {
            panic!("expected RtAnalog");
        };
        assert_eq!(section.records[0].av, 5.5);
    }
}

#[tokio::test]
async fn test_digital_values_never_perturbed() {
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = dispatcher(Arc::clone(&sink), 2, true);

    let section = DigitalSection::new(
        50,
        vec![Digital {
            p_num: 9,
            dv: true,
            ..Default::default()
        }],
    );
    dispatcher.write_rt_digital(section, true).await;

    let calls = sink.calls();
    assert_eq!(calls.len(), 2);
    for call in calls {
        let SinkCall::RtDigital { section, .. } = call else {
            panic!("expected RtDigital");
        };
        assert!(section.records[0].dv);
        let id = GlobalId::decode(section.records[0].global_id);
        assert!(!id.is_analog);
        assert_eq!(id.point_number, 9);
    }
}

#[tokio::test]
async fn test_his_writes_clear_realtime_bit() {
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = dispatcher(Arc::clone(&sink), 1, false);

    dispatcher.write_his_analog(analog_section(10, &[1.0])).await;

    let calls = sink.calls();
    let SinkCall::HisAnalog { section, .. } = &calls[0] else {
        panic!("expected HisAnalog");
    };
    let id = GlobalId::decode(section.records[0].global_id);
    assert!(id.is_analog);
    assert!(!id.is_fast);
    assert!(!id.is_realtime);
}

#[tokio::test]
async fn test_list_write_stamps_every_section() {
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = dispatcher(Arc::clone(&sink), 2, true);

    let sections = vec![analog_section(1, &[1.0]), analog_section(2, &[2.0])];
    dispatcher.write_rt_analog_list(sections).await;

    let calls = sink.calls();
    assert_eq!(calls.len(), 2);
    for call in calls {
        let SinkCall::RtAnalogList {
            unit_id, sections, ..
        } = call
        else {
            panic!("expected RtAnalogList");
        };
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].timestamp, 1);
        assert_eq!(sections[1].timestamp, 2);
        for section in &sections {
            let id = GlobalId::decode(section.records[0].global_id);
            assert_eq!(id.unit_id, unit_id);
            assert!(id.is_fast);
            assert!(id.is_realtime);
            // fast-cache offsets apply per unit here too
            assert_eq!(
                section.records[0].av,
                section.timestamp as f64 + unit_id as f64
            );
        }
    }
}

#[tokio::test]
async fn test_static_kind_selects_global_id_bits() {
    for (kind, raw, is_fast, is_realtime) in [
        (StaticKind::FastRealtime, 0, true, true),
        (StaticKind::NormalRealtime, 1, false, true),
        (StaticKind::NormalHistory, 2, false, false),
    ] {
        let sink = Arc::new(RecordingSink::new());
        let dispatcher = dispatcher(Arc::clone(&sink), 1, false);

        let records = vec![StaticDigital {
            p_num: 3,
            ..Default::default()
        }];
        dispatcher.write_static_digital(records, kind).await;

        let calls = sink.calls();
        let SinkCall::StaticDigital { records, kind: raw_kind, .. } = &calls[0] else {
            panic!("expected StaticDigital");
        };
        assert_eq!(*raw_kind, raw);
        let id = GlobalId::decode(records[0].global_id);
        assert_eq!(id.is_fast, is_fast, "{kind:?}");
        assert_eq!(id.is_realtime, is_realtime, "{kind:?}");
        assert!(!id.is_analog);
    }
}

#[tokio::test]
async fn test_static_kind_try_from() {
    assert_eq!(StaticKind::try_from(0), Ok(StaticKind::FastRealtime));
    assert_eq!(StaticKind::try_from(2), Ok(StaticKind::NormalHistory));
    assert_eq!(StaticKind::try_from(3), Err(3));
}

#[tokio::test]
async fn test_login_guard_logs_out_on_drop() {
    let sink = Arc::new(RecordingSink::new());
    let dispatcher = dispatcher(Arc::clone(&sink), 1, false);

    {
        let _guard = dispatcher.login(Some("host=127.0.0.1")).unwrap();
    }

    assert_eq!(
        sink.calls(),
        vec![
            SinkCall::Login {
                param: Some("host=127.0.0.1".into())
            },
            SinkCall::Logout,
        ]
    );
}

#[tokio::test]
async fn test_login_failure_aborts() {
    let sink = Arc::new(RecordingSink::failing_login(-3));
    let dispatcher = dispatcher(Arc::clone(&sink), 1, false);

    let err = dispatcher.login(None).unwrap_err();
    assert!(matches!(err, SinkError::LoginFailed { code: -3 }));
    // no guard was created, so no logout happened
    assert_eq!(sink.call_count(), 1);
}

#[tokio::test]
async fn test_unit_count_bounds() {
    let sink = Arc::new(RecordingSink::new());
    assert!(SinkDispatcher::new(Arc::clone(&sink) as _, 0, 0, None).is_err());
    assert!(SinkDispatcher::new(Arc::clone(&sink) as _, 0, 257, None).is_err());
    assert!(SinkDispatcher::new(sink as _, 0, 256, None).is_ok());
}

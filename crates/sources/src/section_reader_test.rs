//! Tests for the section-grouping reader

use rtdb_protocol::{Analog, Digital, Section};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::section_reader::read_sections_from;

/// Run the reader over an in-memory byte stream and collect every section.
fn collect<T: rtdb_protocol::RowRecord>(input: &[u8]) -> Vec<Section<T>> {
    let (tx, mut rx) = mpsc::channel(64);
    read_sections_from(input, "test.csv", tx, CancellationToken::new());

    let mut sections = Vec::new();
    while let Ok(section) = rx.try_recv() {
        sections.push(section);
    }
    sections
}

#[test]
fn test_single_timestamp_file_yields_one_section() {
    let sections: Vec<Section<Analog>> = collect(
        b"100,1,1.0,0.0,1,0,0,0.0,0,A,0\n\
          100,2,2.0,0.0,1,0,0,0.0,0,A,0\n\
          100,3,3.0,0.0,1,0,0,0.0,0,A,0\n",
    );

    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].timestamp, 100);
    assert_eq!(sections[0].len(), 3);
}

#[test]
fn test_timestamp_change_closes_section() {
    let sections: Vec<Section<Analog>> = collect(
        b"100,1,1.0,0.0,1,0,0,0.0,0,A,0\n\
          100,2,2.0,0.0,1,0,0,0.0,0,A,0\n\
          200,3,3.0,0.0,1,0,0,0.0,0,A,0\n",
    );

    assert_eq!(sections.len(), 2);
    assert_eq!((sections[0].timestamp, sections[0].len()), (100, 2));
    assert_eq!((sections[1].timestamp, sections[1].len()), (200, 1));
}

#[test]
fn test_every_record_lands_in_its_timestamp_section_exactly_once() {
    let mut input = Vec::new();
    for ts in 1..=5i64 {
        for p in 0..4 {
            input.extend_from_slice(
                format!("{ts},{p},1,0,1,0,1,0,1,A,0\n").as_bytes(),
            );
        }
    }

    let sections: Vec<Section<Digital>> = collect(&input);

    assert_eq!(sections.len(), 5);
    for (i, section) in sections.iter().enumerate() {
        assert_eq!(section.timestamp, i as i64 + 1);
        assert_eq!(section.len(), 4);
        for record in &section.records {
            // section coherence: the record was parsed from a row with the
            // section's timestamp
            assert!(record.p_num < 4);
        }
        let nums: Vec<i32> = section.records.iter().map(|r| r.p_num).collect();
        assert_eq!(nums, vec![0, 1, 2, 3]);
    }
}

#[test]
fn test_header_tail_and_malformed_rows_are_skipped() {
    let sections: Vec<Section<Analog>> = collect(
        b"TIME,P_NUM,AV,AVR,Q,BF,FQ,FAI,MS,TEW,CST\n\
          100,1,1.0,0.0,1,0,0,0.0,0,A,0\n\
          100,notanumber,1.0,0.0,1,0,0,0.0,0,A,0\n\
          100,2,2.0,0.0,1,0,0,0.0,0,A,0\n\
          trailing,tail\n",
    );

    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].len(), 2);
    assert_eq!(sections[0].records[1].p_num, 2);
}

#[test]
fn test_cr_cr_line_terminators() {
    let sections: Vec<Section<Analog>> = collect(
        b"100,1,1.0,0.0,1,0,0,0.0,0,A,0\r\r\
          100,2,2.0,0.0,1,0,0,0.0,0,A,0\r\r\
          200,3,3.0,0.0,1,0,0,0.0,0,A,0\r",
    );

    assert_eq!(sections.len(), 2);
    assert_eq!(sections[0].len(), 2);
    assert_eq!(sections[1].len(), 1);
}

#[test]
fn test_cancelled_reader_emits_nothing_and_closes() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let (tx, mut rx) = mpsc::channel::<Section<Analog>>(64);
    read_sections_from(
        b"100,1,1.0,0.0,1,0,0,0.0,0,A,0\n".as_slice(),
        "test.csv",
        tx,
        cancel,
    );

    assert!(matches!(
        rx.try_recv(),
        Err(mpsc::error::TryRecvError::Disconnected)
    ));
}

#[test]
fn test_empty_file_emits_nothing() {
    let sections: Vec<Section<Analog>> = collect(b"");
    assert!(sections.is_empty());
}

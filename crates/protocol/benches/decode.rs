//! Benchmarks for the row decoder and GlobalId packing
//!
//! The decoder sits on the reader hot path (one call per CSV row), and
//! GlobalId::encode runs once per record per unit on every write.

use criterion::{Criterion, Throughput, black_box, criterion_group, criterion_main};
use csv::StringRecord;

use rtdb_protocol::{Analog, Digital, GlobalId, RowRecord};

fn analog_row() -> StringRecord {
    StringRecord::from(vec![
        "1700000000123", "10421", "219.874", "0.0", "1", "0", "0", "0.52", "0", "A", "0",
    ])
}

fn digital_row() -> StringRecord {
    StringRecord::from(vec![
        "1700000000123", "20017", "1", "0", "1", "0", "0", "0", "0", "B", "0",
    ])
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("row_decode");
    group.throughput(Throughput::Elements(1));

    let analog = analog_row();
    group.bench_function("analog", |b| {
        b.iter(|| black_box(Analog::decode(black_box(&analog))))
    });

    let digital = digital_row();
    group.bench_function("digital", |b| {
        b.iter(|| black_box(Digital::decode(black_box(&digital))))
    });

    group.finish();
}

fn bench_global_id(c: &mut Criterion) {
    let mut group = c.benchmark_group("global_id");
    group.throughput(Throughput::Elements(1));

    let id = GlobalId {
        magic: 0x5EED_0001,
        unit_id: 3,
        is_analog: true,
        is_fast: true,
        is_realtime: true,
        point_number: 10421,
    };

    group.bench_function("encode", |b| b.iter(|| black_box(black_box(id).encode())));

    let raw = id.encode();
    group.bench_function("decode", |b| {
        b.iter(|| black_box(GlobalId::decode(black_box(raw))))
    });

    group.finish();
}

criterion_group!(benches, bench_decode, bench_global_id);
criterion_main!(benches);

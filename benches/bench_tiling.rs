//! Tiling pipeline benchmarks.
//!
//! Tiling runs once per operator node at graph compile time, so the metric
//! that matters is plans per second across representative shapes.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use aicore_tiling::ops::{CastTiling, CircularPadTiling, CompareOp, CompareTiling};
use aicore_tiling::{partition, pipeline, DType, HardwareProfile, PadSpec, TensorShape};

const ELEM_SIZES: &[i64] = &[1024, 65536, 1 << 20, 1 << 24];

fn size_label(n: i64) -> String {
    match n {
        1024 => "1K".into(),
        65536 => "64K".into(),
        1048576 => "1M".into(),
        16777216 => "16M".into(),
        _ => format!("{n}"),
    }
}

fn bench_partition(c: &mut Criterion) {
    let mut group = c.benchmark_group("partition");
    for &n in ELEM_SIZES {
        group.bench_with_input(BenchmarkId::from_parameter(size_label(n)), &n, |b, &n| {
            b.iter(|| partition(black_box(n), 1, 48).unwrap());
        });
    }
    group.finish();
}

fn bench_elementwise_pipeline(c: &mut Criterion) {
    let profile = HardwareProfile::aiv48();
    let mut group = c.benchmark_group("pipeline/compare");
    for &n in ELEM_SIZES {
        let shape = TensorShape::new(&[n]).unwrap();
        let op = CompareTiling { lhs: shape, rhs: shape, dtype: DType::F16, op: CompareOp::Less };
        group.bench_with_input(BenchmarkId::from_parameter(size_label(n)), &op, |b, op| {
            b.iter(|| pipeline::run(black_box(&profile), op).unwrap());
        });
    }
    group.finish();
}

fn bench_pad_pipeline(c: &mut Criterion) {
    let profile = HardwareProfile::aiv64();
    let op = CircularPadTiling {
        input: TensorShape::new(&[3, 500, 500]).unwrap(),
        output: TensorShape::new(&[3, 502, 504]).unwrap(),
        pads: PadSpec::new(vec![(2, 2), (1, 1)]),
        dtype: DType::F16,
    };
    c.bench_function("pipeline/circular_pad_3x500x500", |b| {
        b.iter(|| pipeline::run(black_box(&profile), &op).unwrap());
    });
}

fn bench_serialize(c: &mut Criterion) {
    let profile = HardwareProfile::aiv48();
    let op = CastTiling {
        input: TensorShape::new(&[1 << 20]).unwrap(),
        src: DType::F16,
        dst: DType::F32,
    };
    let out = pipeline::run(&profile, &op).unwrap();
    let mut buf = vec![0u8; out.descriptor.byte_len()];
    c.bench_function("descriptor/serialize", |b| {
        b.iter(|| out.descriptor.serialize_into(black_box(&mut buf)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_partition,
    bench_elementwise_pipeline,
    bench_pad_pipeline,
    bench_serialize
);
criterion_main!(benches);

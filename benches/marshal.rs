//! Conversion benchmarks
//!
//! Measures the check and conversion paths for scalars and packed arrays.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gimarshal::interop::{
    argument_to_value, check_representable, value_to_argument, HostValue, Marshaller, MemoryRuntime,
    TypeInfo,
};

fn int_tuple(n: usize) -> HostValue {
    HostValue::tuple((0..n).map(|i| HostValue::from((i % 100 + 1) as i32)))
}

fn bench_scalars(c: &mut Criterion) {
    let runtime = MemoryRuntime::new();
    let mut group = c.benchmark_group("scalar");

    group.bench_function("check_int32", |b| {
        let value = HostValue::from(12345);
        b.iter(|| check_representable(&runtime, black_box(&value), &TypeInfo::Int32))
    });

    group.bench_function("round_trip_int64", |b| {
        let value = HostValue::from(-987654321i64);
        b.iter(|| {
            let argument = value_to_argument(&runtime, black_box(&value), &TypeInfo::Int64).unwrap();
            argument_to_value(&runtime, argument, &TypeInfo::Int64).unwrap()
        })
    });

    group.bench_function("round_trip_utf8", |b| {
        let value = HostValue::from("a moderately sized string");
        b.iter(|| {
            let argument = value_to_argument(&runtime, black_box(&value), &TypeInfo::Utf8).unwrap();
            argument_to_value(&runtime, argument, &TypeInfo::Utf8).unwrap()
        })
    });

    group.finish();
}

fn bench_arrays(c: &mut Criterion) {
    let runtime = MemoryRuntime::new();
    let marshaller = Marshaller::new(&runtime);
    let mut group = c.benchmark_group("array");

    for size in [4, 64, 1024].iter() {
        let value = int_tuple(*size);
        let ty = TypeInfo::array(TypeInfo::Int8);

        group.bench_with_input(BenchmarkId::new("check", size), &value, |b, value| {
            b.iter(|| check_representable(&runtime, black_box(value), &ty))
        });

        group.bench_with_input(BenchmarkId::new("pack", size), &value, |b, value| {
            b.iter(|| marshaller.to_array(black_box(value), &ty).unwrap())
        });

        let zt = TypeInfo::zero_terminated_array(TypeInfo::Int32);
        let packed = marshaller.to_array(&int_tuple(*size), &zt).unwrap();
        group.bench_with_input(BenchmarkId::new("unpack_zero_terminated", size), &packed, |b, packed| {
            b.iter(|| unsafe { marshaller.array_to_value(black_box(packed.as_ptr()), 0, &zt) }.unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_scalars, bench_arrays);
criterion_main!(benches);

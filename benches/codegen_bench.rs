use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use typewire::{compile_serializer, serialize, TypeExpr, Value};

fn record_type() -> TypeExpr {
    TypeExpr::mapping(
        TypeExpr::string(),
        TypeExpr::union([
            TypeExpr::int(),
            TypeExpr::string(),
            TypeExpr::sequence(TypeExpr::Bytes),
        ]),
    )
}

fn record_value(entries: usize) -> Value {
    Value::Map(
        (0..entries)
            .map(|i| {
                let value = match i % 3 {
                    0 => Value::Int(i as i64),
                    1 => Value::str(format!("value-{}", i)),
                    _ => Value::array(vec![Value::Bytes(vec![i as u8; 8])]),
                };
                (Value::str(format!("key-{}", i)), value)
            })
            .collect(),
    )
}

/// Benchmark building a routine, without running it
fn bench_compile(c: &mut Criterion) {
    let mut group = c.benchmark_group("compile");

    group.bench_function("primitive", |b| {
        b.iter(|| compile_serializer(black_box(&TypeExpr::int())).unwrap())
    });
    group.bench_function("record", |b| {
        b.iter(|| compile_serializer(black_box(&record_type())).unwrap())
    });

    group.finish();
}

/// Benchmark invoking one precompiled routine over growing inputs
fn bench_invoke(c: &mut Criterion) {
    let mut group = c.benchmark_group("invoke");
    let routine = compile_serializer(&record_type()).unwrap();

    for size in [10, 100, 1000].iter() {
        let value = record_value(*size);
        group.bench_with_input(BenchmarkId::new("record", size), size, |b, _| {
            b.iter(|| routine.invoke(black_box(value.clone())).unwrap())
        });
    }

    group.finish();
}

/// Benchmark the one-shot entry point (compile plus invoke) against the
/// untyped reflective path
fn bench_entry_points(c: &mut Criterion) {
    let mut group = c.benchmark_group("entry_points");
    let value = record_value(100);

    group.bench_function("typed", |b| {
        let ty = record_type();
        b.iter(|| serialize(black_box(&value), Some(&ty)).unwrap())
    });
    group.bench_function("blind", |b| {
        b.iter(|| serialize(black_box(&value), None).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_compile, bench_invoke, bench_entry_points);
criterion_main!(benches);

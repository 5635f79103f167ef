//! Performance benchmarks for the scalar function call path.
//!
//! Measures per-row cost of:
//! - Scalars: a two-argument integer function
//! - Variadics: a string prefix plus a growing integer tail
//! - Composites: STRUCT and MAP arguments
//! - Registry: lookup plus NULL checks on top of the marshaler
//!
//! ```bash
//! cargo bench --bench invoke_benchmarks
//! ```

use std::collections::HashMap;
use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use sqlfn::prelude::*;

#[derive(Record)]
struct Point {
    pub x: i64,
    pub y: i64,
}

fn bench_scalars(c: &mut Criterion) {
    let udf = ScalarUdf::build(|a: i32, b: i32| a + b).unwrap();
    let args = [Value::Integer(5), Value::Integer(10)];

    c.bench_function("invoke/add_ints", |b| {
        b.iter(|| udf.invoke(black_box(&args)))
    });

    let widened = [Value::BigInt(5), Value::Double(10.0)];
    c.bench_function("invoke/add_ints_cast", |b| {
        b.iter(|| udf.invoke(black_box(&widened)))
    });
}

fn bench_variadic(c: &mut Criterion) {
    let udf = ScalarUdf::build(|prefix: String, rest: Variadic<i64>| {
        format!("{prefix}: {}", rest.iter().sum::<i64>())
    })
    .unwrap();

    let mut group = c.benchmark_group("invoke/variadic");
    for tail in [0usize, 8, 64] {
        let mut args = vec![Value::from("sum")];
        args.extend((0..tail as i64).map(Value::BigInt));
        group.throughput(Throughput::Elements(args.len() as u64));
        group.bench_with_input(BenchmarkId::from_parameter(tail), &args, |b, args| {
            b.iter(|| udf.invoke(black_box(args)))
        });
    }
    group.finish();
}

fn bench_composites(c: &mut Criterion) {
    let record = ScalarUdf::build(|p: Point| Point { x: p.y, y: p.x }).unwrap();
    let row = [Value::Struct(StructValue::new().with("x", 1_i64).with("y", 2_i64))];
    c.bench_function("invoke/struct_swap", |b| {
        b.iter(|| record.invoke(black_box(&row)))
    });

    let map = ScalarUdf::build(|m: HashMap<String, i64>| m.values().sum::<i64>()).unwrap();
    let entries: MapValue = (0..32_i64).map(|i| (format!("k{i}"), i)).collect();
    let row = [Value::Map(entries)];
    c.bench_function("invoke/map_sum_32", |b| {
        b.iter(|| map.invoke(black_box(&row)))
    });
}

fn bench_registry(c: &mut Criterion) {
    let mut registry = FunctionRegistry::new();
    registry
        .register("add_ints", ScalarUdf::build(|a: i32, b: i32| a + b).unwrap())
        .unwrap();

    let rows: Vec<Vec<Value>> = (0..1024)
        .map(|i| {
            if i % 16 == 0 {
                vec![Value::Null, Value::Integer(i)]
            } else {
                vec![Value::Integer(i), Value::Integer(i)]
            }
        })
        .collect();

    let mut group = c.benchmark_group("registry");
    group.throughput(Throughput::Elements(rows.len() as u64));
    group.bench_function("call_rows_1024", |b| {
        b.iter(|| registry.call_rows("add_ints", black_box(&rows)))
    });
    group.finish();
}

criterion_group!(benches, bench_scalars, bench_variadic, bench_composites, bench_registry);
criterion_main!(benches);

//! Vector decoding benchmarks for quackcodec
//!
//! These benchmarks measure per-row and batch decoding of full-size chunks,
//! the encode path used by appenders, and row iteration over a multi-chunk
//! result.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::hint::black_box as hint_black_box;
use quackcodec::codec::ValueEncoder;
use quackcodec::config::STANDARD_VECTOR_SIZE;
use quackcodec::engine::memory::{ColumnBuffer, ColumnBuilder};
use quackcodec::{CodecConfig, LogicalType, MemoryEngine, Session, TypeId, Value, Vector};

fn column(ty: LogicalType, value_at: impl Fn(usize) -> Value) -> ColumnBuffer {
    let mut builder = ColumnBuilder::new(ty);
    for row in 0..STANDARD_VECTOR_SIZE {
        let value = if row % 10 == 0 { Value::Null } else { value_at(row) };
        builder.push_value(&value).unwrap();
    }
    builder.finish()
}

fn fixtures() -> Vec<(&'static str, ColumnBuffer)> {
    vec![
        ("bigint", column(LogicalType::BigInt, |r| Value::BigInt(r as i64))),
        ("double", column(LogicalType::Double, |r| Value::Double(r as f64 * 0.5))),
        (
            "varchar_inline",
            column(LogicalType::Varchar, |r| Value::Varchar(format!("v{}", r))),
        ),
        (
            "varchar_heap",
            column(LogicalType::Varchar, |r| {
                Value::Varchar(format!("a longer string value {}", r))
            }),
        ),
        (
            "timestamp",
            column(LogicalType::Timestamp, |r| {
                Value::from(format!("2024-01-01 00:00:{:02}", r % 60))
            }),
        ),
        (
            "hugeint",
            column(LogicalType::HugeInt, |r| {
                Value::HugeInt((r as i128 * (1i128 << 70)).into())
            }),
        ),
        (
            "list_integer",
            column(LogicalType::list(LogicalType::Integer), |r| {
                Value::List((0..(r % 5) as i32).map(Value::Integer).collect())
            }),
        ),
        (
            "struct",
            column(
                LogicalType::structure([("a", LogicalType::Integer), ("b", LogicalType::Varchar)]),
                |r| {
                    Value::Struct(vec![
                        ("a".into(), Value::Integer(r as i32)),
                        ("b".into(), Value::Varchar(format!("field {}", r))),
                    ])
                },
            ),
        ),
    ]
}

fn bench_vector_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("vector_decode");
    group.throughput(Throughput::Elements(STANDARD_VECTOR_SIZE as u64));
    let config = CodecConfig::default();

    for (name, buffer) in fixtures() {
        let vector = Vector::new(&buffer, STANDARD_VECTOR_SIZE, &config).unwrap();

        group.bench_with_input(BenchmarkId::new("per_row", name), &vector, |b, vector| {
            b.iter(|| {
                for row in 0..vector.len() {
                    hint_black_box(vector.value_at(black_box(row)).unwrap());
                }
            });
        });

        group.bench_with_input(BenchmarkId::new("batch", name), &vector, |b, vector| {
            b.iter(|| hint_black_box(vector.values().unwrap()));
        });
    }

    group.finish();
}

fn bench_encode(c: &mut Criterion) {
    let mut group = c.benchmark_group("encode");
    let encoder = ValueEncoder::default();

    let cases: Vec<(&str, Value, Option<TypeId>)> = vec![
        ("integer_inferred", Value::Integer(42), None),
        ("varchar_inferred", Value::from("hello, world"), None),
        ("timestamp_from_text", Value::from("2024-01-02 03:04:05.678"), Some(TypeId::Timestamp)),
        (
            "hugeint_wide",
            Value::HugeInt((1i128 << 100).into()),
            Some(TypeId::HugeInt),
        ),
    ];

    for (name, value, target) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), &value, |b, value| {
            b.iter(|| hint_black_box(encoder.encode(black_box(value), target).unwrap()));
        });
    }

    group.finish();
}

fn bench_row_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("row_iteration");
    let rows = 10_000;
    group.throughput(Throughput::Elements(rows as u64));

    let engine = MemoryEngine::new();
    engine
        .create_table("t", [("id", LogicalType::BigInt), ("name", LogicalType::Varchar)])
        .unwrap();
    let session = Session::new(engine);
    {
        let mut appender = session.appender(None, "t").unwrap();
        for i in 0..rows {
            appender
                .append_row(&[Value::BigInt(i), Value::Varchar(format!("name number {}", i))])
                .unwrap();
        }
        appender.flush().unwrap();
    }

    group.bench_function("select_all", |b| {
        b.iter(|| {
            let mut result = session.query("SELECT * FROM t").unwrap();
            let mut count = 0usize;
            for row in result.rows() {
                hint_black_box(row.unwrap());
                count += 1;
            }
            assert_eq!(count, rows as usize);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_vector_decode, bench_encode, bench_row_iteration);
criterion_main!(benches);

//! Parser throughput benchmarks.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use jolt_common::logger::Log;
use jolt_common::options::LoaderKind;
use jolt_common::refs::SourceIndex;
use jolt_parser::{ParseOptions, parse};

fn synthetic_module(functions: usize) -> String {
    let mut out = String::new();
    out.push_str("import {base} from './base';\n");
    for i in 0..functions {
        out.push_str(&format!(
            "export function handler{i}(request, response) {{\n  \
             const payload = {{ id: {i}, tags: ['a', 'b', 'c'] }};\n  \
             if (request.method === 'POST') return response.send(payload);\n  \
             return base(payload.id) + {i};\n}}\n"
        ));
    }
    out
}

fn bench_parse(c: &mut Criterion) {
    let small = synthetic_module(10);
    let large = synthetic_module(500);

    let mut group = c.benchmark_group("parse");
    group.throughput(criterion::Throughput::Bytes(small.len() as u64));
    group.bench_function("small", |b| {
        b.iter(|| {
            let log = Log::default();
            let options = ParseOptions {
                loader: LoaderKind::Js,
                ..ParseOptions::default()
            };
            black_box(parse(
                black_box(&small),
                "/bench.js",
                SourceIndex(0),
                options,
                &log,
            ))
        })
    });
    group.throughput(criterion::Throughput::Bytes(large.len() as u64));
    group.bench_function("large", |b| {
        b.iter(|| {
            let log = Log::default();
            let options = ParseOptions {
                loader: LoaderKind::Js,
                ..ParseOptions::default()
            };
            black_box(parse(
                black_box(&large),
                "/bench.js",
                SourceIndex(0),
                options,
                &log,
            ))
        })
    });
    group.finish();
}

criterion_group!(benches, bench_parse);
criterion_main!(benches);

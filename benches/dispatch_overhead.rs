//! Per-syscall dispatch benchmark
//!
//! `filter_syscall` runs on every syscall stop of every traced process, so
//! its cost is paid on the hot path. Configuration parsing runs once and is
//! measured separately.
//!
//! # Run Instructions
//!
//! ```bash
//! cargo bench --bench dispatch_overhead
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use sysqual::action::DecisionsOnly;
use sysqual::call::SyscallStop;
use sysqual::engine::{EngineBuilder, FilterEngine};
use sysqual::syscalls::Personalities;

fn build(clauses: &[&str]) -> FilterEngine {
    let mut builder = EngineBuilder::new(Personalities::native());
    for clause in clauses {
        builder
            .qualify(clause)
            .expect("benchmark clauses are valid");
    }
    builder.finish()
}

/// Benchmark: dispatch across configurations of growing size
fn bench_dispatch(c: &mut Criterion) {
    let configs: [(&str, &[&str]); 4] = [
        ("defaults", &[]),
        ("trace_class", &["trace=%file,%network"]),
        (
            "trace_raw_verbose",
            &["trace=%file", "trace=%desc", "raw=all", "verbose=!read"],
        ),
        (
            "with_injection",
            &[
                "trace=all",
                "fault=openat:error=ENOENT:when=3+",
                "inject=read:retval=0",
                "write=1,2",
            ],
        ),
    ];

    let mut group = c.benchmark_group("filter_syscall");
    group.throughput(Throughput::Elements(335));

    for (name, clauses) in configs {
        let mut engine = build(clauses);
        group.bench_with_input(BenchmarkId::from_parameter(name), &(), |b, _| {
            b.iter(|| {
                for number in 0..335u64 {
                    let mut call = SyscallStop::new(0, number).with_args([1, 0, 0, 0, 0, 0]);
                    engine.filter_syscall(&mut call, &mut DecisionsOnly);
                    black_box(call.qual);
                }
            });
        });
    }

    group.finish();
}

/// Benchmark: resolving qualifier clauses into an engine
fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("qualify");

    let cases = [
        ("names", "trace=open,close,read,write,openat,socket"),
        ("classes", "trace=%file,%network,%process"),
        ("regex", "trace=/^(open|stat|fstat)"),
        ("fault", "fault=openat:error=ENOENT:when=2+3"),
    ];

    for (name, clause) in cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), clause, |b, clause| {
            b.iter(|| {
                let mut builder = EngineBuilder::new(Personalities::native());
                builder.qualify(black_box(clause)).ok();
                black_box(builder.finish());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_dispatch, bench_parse);
criterion_main!(benches);

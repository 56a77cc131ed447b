//! Program build benchmark suite.
//!
//! Measures parsing and interpreting a realistic fallback program:
//! - Parse only
//! - Build from a parsed program
//! - Parse and build, with growing numbers of transport definitions
//!
//! Run with: cargo bench --bench build_program
//! Results saved to: target/criterion/

use std::hint::black_box;

use connect_strategy::{BuildOptions, Program, StrategyBuilder};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::{Value, json};

// ============================================================================
// Programs
// ============================================================================

fn default_program() -> Value {
    json!([
        [":def", "ws_options", {"hostUnencrypted": "ws.example.com:80", "hostEncrypted": "ws.example.com:443"}],
        [":def", "sockjs_options", {"hostUnencrypted": "sockjs.example.com:80", "hostEncrypted": "sockjs.example.com:443"}],
        [":def", "timeouts", {"loop": true, "timeout": 15000, "timeoutLimit": 60000}],

        [":def_transport", "ws", "ws", 3, ":ws_options"],
        [":def_transport", "wss", "ws", 3, ":ws_options"],
        [":def_transport", "sockjs", "sockjs", 1, ":sockjs_options"],

        [":def", "ws_loop", [":sequential", ":timeouts", ":ws"]],
        [":def", "wss_loop", [":sequential", ":timeouts", ":wss"]],
        [":def", "sockjs_loop", [":sequential", ":timeouts", ":sockjs"]],

        [":def", "ws_fallback", [":first_connected",
            ":ws_loop",
            [":delayed", 2000, ":sockjs_loop"]]],

        [":def", "strategy", [":cached", 1800000,
            [":if", [":is_supported", ":ws"], ":ws_fallback", ":sockjs_loop"]]]
    ])
}

fn wide_program(transports: usize) -> Value {
    let mut instructions = Vec::with_capacity(transports + 1);
    let mut refs = Vec::with_capacity(transports);

    for i in 0..transports {
        let name = format!("t{i}");
        let kind = if i % 2 == 0 { "ws" } else { "sockjs" };
        instructions.push(json!([":def_transport", name, kind, i, {"host": "example.com"}]));
        refs.push(json!(format!(":{name}")));
    }

    let mut race = vec![json!(":best_connected_ever")];
    race.extend(refs);
    instructions.push(json!([":def", "strategy", race]));

    Value::Array(instructions)
}

// ============================================================================
// Benchmark: Parse
// ============================================================================

fn bench_parse(c: &mut Criterion) {
    let text = default_program().to_string();

    c.bench_function("parse_default_program", |b| {
        b.iter(|| Program::from_json(black_box(&text)).expect("program"));
    });
}

// ============================================================================
// Benchmark: Build
// ============================================================================

fn bench_build(c: &mut Criterion) {
    let builder = StrategyBuilder::default();
    let program = Program::from_value(&default_program()).expect("program");
    let options = BuildOptions::new().with_key("bench").with_encrypted(true);

    c.bench_function("build_default_program", |b| {
        b.iter(|| builder.build(black_box(&program), &options).expect("strategy"));
    });
}

fn bench_build_wide(c: &mut Criterion) {
    let builder = StrategyBuilder::default();
    let options = BuildOptions::default();

    let mut group = c.benchmark_group("build_wide");
    for &count in &[4usize, 16, 64] {
        let text = wide_program(count).to_string();
        group.bench_with_input(BenchmarkId::from_parameter(count), &text, |b, text| {
            b.iter(|| {
                let program = Program::from_json(text).expect("program");
                builder.build(&program, &options).expect("strategy")
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_parse, bench_build, bench_build_wide);
criterion_main!(benches);

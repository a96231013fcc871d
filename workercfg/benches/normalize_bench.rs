use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use serde_json::{json, Value};
use std::path::Path;
use workercfg::normalize_and_validate_config;
use workercfg::path::{normalize, PathContext};

fn sample_config(env_count: usize) -> Value {
    let envs: serde_json::Map<String, Value> = (0..env_count)
        .map(|i| {
            (
                format!("env{i}"),
                json!({
                    "route": format!("env{i}.example.com/*"),
                    "vars": { "MODE": format!("env{i}") },
                    "kv_namespaces": [{ "binding": "CACHE", "id": format!("id{i}") }]
                }),
            )
        })
        .collect();
    json!({
        "name": "bench-worker",
        "main": "src/index.ts",
        "compatibility_date": "2022-05-01",
        "compatibility_flags": ["nodejs_compat"],
        "rules": [{ "type": "Text", "globs": ["**/*.txt"] }],
        "vars": { "MODE": "top", "API_HOST": "https://api.example.com" },
        "kv_namespaces": [{ "binding": "CACHE", "id": "top" }],
        "durable_objects": { "bindings": [{ "name": "DO", "class_name": "Counter" }] },
        "migrations": [{ "tag": "v1", "new_classes": ["Counter"] }],
        "wasm_modules": { "MOD": "mod.wasm" },
        "env": envs
    })
}

fn bench_normalize_config(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_config");
    let ctx = PathContext::new("/project", Some(Path::new("worker.toml")));

    group.bench_function("empty", |b| {
        let raw = json!({});
        b.iter(|| normalize_and_validate_config(black_box(&raw), None, None, &ctx));
    });

    for env_count in [1, 10, 100] {
        let raw = sample_config(env_count);

        group.bench_with_input(BenchmarkId::new("top_level", env_count), &raw, |b, raw| {
            b.iter(|| normalize_and_validate_config(black_box(raw), None, None, &ctx));
        });

        // Missing vars and bindings produce warnings on this path
        group.bench_with_input(BenchmarkId::new("named_env", env_count), &raw, |b, raw| {
            b.iter(|| normalize_and_validate_config(black_box(raw), None, Some("env0"), &ctx));
        });
    }

    group.finish();
}

fn bench_path_resolution(c: &mut Criterion) {
    let mut group = c.benchmark_group("path_resolution");
    let ctx = PathContext::new("/users/test/projects", Some(Path::new("app/worker.toml")));

    group.bench_function("resolve", |b| {
        b.iter(|| ctx.resolve(black_box("../shared/./src/index.ts")));
    });

    group.bench_function("relative_to_cwd", |b| {
        let resolved = ctx.resolve("wasm/mod.wasm");
        b.iter(|| ctx.relative_to_cwd(black_box(&resolved)));
    });

    group.bench_function("resolve_components", |b| {
        b.iter(|| normalize::resolve_components(black_box(Path::new("/a/b/../c/./d"))));
    });

    group.finish();
}

criterion_group!(benches, bench_normalize_config, bench_path_resolution);
criterion_main!(benches);

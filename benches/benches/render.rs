//! Benchmark template compilation, translation and rendering time.

use criterion::{criterion_group, criterion_main, Criterion};
use hypertag::{Engine, Map};

use benches::context;

criterion_main! { benches }
criterion_group! { benches, bench_compile, bench_translate, bench_render }

/// Benchmarks the time taken to analyse a template.
fn bench_compile(c: &mut Criterion) {
    let mut g = c.benchmark_group("compile");
    let engine = Engine::new();

    let users = benches::users();
    g.bench_function("users", |b| {
        b.iter(|| engine.compile(users.clone()).unwrap());
    });

    let nested = benches::nested(50);
    g.bench_function("nested", |b| {
        b.iter(|| engine.compile(nested.clone()).unwrap());
    });
}

/// Benchmarks the time taken to translate a template into a document.
fn bench_translate(c: &mut Criterion) {
    let mut g = c.benchmark_group("translate");
    let engine = Engine::new();

    let template = engine.compile(benches::nested(50)).unwrap();
    let ctx = Map::new();
    g.bench_function("nested", |b| {
        b.iter(|| template.translate(&ctx).unwrap());
    });
}

/// Benchmarks the time taken to render a template as a string.
fn bench_render(c: &mut Criterion) {
    let mut g = c.benchmark_group("render");
    let engine = Engine::new();

    let ctx = context::random(150);
    let template = engine.compile(benches::users()).unwrap();
    g.bench_function("users", |b| {
        b.iter(|| template.render(&ctx).unwrap());
    });

    let template = engine.compile(benches::nested(50)).unwrap();
    let doc = template.translate(&Map::new()).unwrap();
    g.bench_function("document", |b| {
        b.iter(|| doc.render().unwrap());
    });
}

//! Benchmarks for shader assembly and CPU-side compilation.
//!
//! Run with: `cargo bench`

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use glint::pragma;
use glint::shaders;
use glint::template;
use glint::{ShaderSuite, UserSlot};

fn bench_template_ops(c: &mut Criterion) {
    let mut group = c.benchmark_group("template");

    group.bench_function("split", |b| {
        b.iter(|| {
            black_box(
                template::split(shaders::SIMULATION_FS_TEMPLATE, shaders::SIMULATION_MARKER)
                    .unwrap(),
            )
        })
    });

    let split =
        template::split(shaders::SIMULATION_FS_TEMPLATE, shaders::SIMULATION_MARKER).unwrap();
    group.bench_function("assemble", |b| {
        b.iter(|| {
            black_box(template::assemble(
                &split.prefix,
                shaders::COMMON_UNIFORMS_WGSL,
                shaders::USER_DEFAULT_COMMON,
                shaders::USER_DEFAULT_SIMULATION,
                &split.postfix,
            ))
        })
    });

    group.finish();
}

fn bench_pragma_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("pragma");

    group.bench_function("parse_default_simulation", |b| {
        b.iter(|| black_box(pragma::parse(shaders::USER_DEFAULT_SIMULATION)))
    });

    group.bench_function("comment_out", |b| {
        b.iter(|| black_box(pragma::comment_out(shaders::USER_DEFAULT_SIMULATION)))
    });

    group.finish();
}

fn bench_suite(c: &mut Criterion) {
    let mut group = c.benchmark_group("suite");

    group.bench_function("reassemble_on_edit", |b| {
        let mut suite = ShaderSuite::new().unwrap();
        b.iter(|| {
            suite.set_user_source(
                UserSlot::Fragment,
                black_box("fn shade_fragment(v: VertexOutput) -> vec4<f32> { return v.color; }"),
            );
        })
    });

    // Full naga parse + validation of all three stages.
    group.bench_function("try_compile_defaults", |b| {
        let mut suite = ShaderSuite::new().unwrap();
        b.iter(|| {
            black_box(suite.try_compile().unwrap());
        })
    });

    group.finish();
}

criterion_group!(benches, bench_template_ops, bench_pragma_parse, bench_suite);
criterion_main!(benches);

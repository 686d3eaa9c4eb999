use std::rc::Rc;

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use glam::{Mat4, Vec3};
use proto_gl::core::platform::headless::HeadlessDriver;
use proto_gl::core::rendering::render_state::GlContext;
use proto_gl::core::rendering::shader::Shader;

const BUNDLE: &str = "#pragma begin:vertex\nV\n#pragma end:vertex\n#pragma begin:fragment\nF\n#pragma end:fragment";
const UNIFORM_COUNT: u64 = 16;

fn uniform_names() -> Vec<String> {
    (0..UNIFORM_COUNT).map(|i| format!("u_value_{i}")).collect()
}

fn shader_with_uniforms() -> Shader {
    let driver = uniform_names()
        .iter()
        .enumerate()
        .fold(HeadlessDriver::new(), |driver, (location, name)| {
            driver.with_uniform(name, location as u32)
        });
    let context = GlContext::new(Rc::new(driver));
    Shader::from_bundle_source(context, BUNDLE)
}

fn uniform_cache_benchmark(c: &mut Criterion) {
    let names = uniform_names();
    let mut group = c.benchmark_group("Uniform cache");
    group.throughput(Throughput::Elements(UNIFORM_COUNT));

    group.bench_function("Repeated values", |b| {
        let mut shader = shader_with_uniforms();
        let mvp = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        b.iter(|| {
            for name in names.iter() {
                shader.set_uniform_fmat4(name, &mvp, false);
            }
        })
    });

    group.bench_function("Changing values", |b| {
        let mut shader = shader_with_uniforms();
        let mut frame = 0.0f32;
        b.iter(|| {
            frame += 1.0;
            for name in names.iter() {
                shader.set_uniform_f32(name, frame);
            }
        })
    });

    group.finish();
}

criterion_group!(benches, uniform_cache_benchmark);
criterion_main!(benches);

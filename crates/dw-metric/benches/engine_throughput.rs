use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use dw_core::measure::{Device, ErrorKind, Field};
use dw_frames::Frame;
use dw_metric::MetricEngine;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn noisy_frame(rng: &mut StdRng, width: usize, height: usize) -> Frame {
    let data = (0..width * height * 3).map(|_| rng.gen_range(0.0f32..4.0)).collect();
    Frame::from_rgb(width, height, data).expect("frame shape")
}

fn bench_engine(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(7);
    let reference = noisy_frame(&mut rng, 320, 180);
    let candidate = noisy_frame(&mut rng, 320, 180);

    let mut group = c.benchmark_group("engine_throughput");
    for device in [Device::Cpu, Device::Parallel] {
        let engine = MetricEngine::new(device);
        group.bench_with_input(BenchmarkId::new("evaluate_frame", format!("{device:?}")), &engine, |b, engine| {
            b.iter(|| {
                engine
                    .evaluate_frame(&reference, &candidate, ErrorKind::RelMse, &Field::ALL, None)
                    .expect("bench frame")
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_engine);
criterion_main!(benches);

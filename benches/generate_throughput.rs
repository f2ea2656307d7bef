use criterion::{black_box, criterion_group, criterion_main, Criterion};
use zdecay_core::RngHandle;
use zdecay_gen::{decay_event, EventGenerator, GeneratorConfig, PhysicsParams};

fn bench_single_event(c: &mut Criterion) {
    let physics = PhysicsParams::default();
    let mut rng = RngHandle::from_seed(7);
    c.bench_function("decay_event", |b| {
        b.iter(|| decay_event(black_box(&physics), &mut rng).expect("event"))
    });
}

fn bench_job(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_10k");
    group.sample_size(20);
    for workers in [1usize, 4] {
        let config = GeneratorConfig {
            events: 10_000,
            chunk_size: 1024,
            workers,
            ..GeneratorConfig::default()
        };
        let generator = EventGenerator::new(config).expect("config");
        group.bench_function(format!("workers_{workers}"), |b| {
            b.iter(|| generator.generate().expect("generate"))
        });
    }
    group.finish();
}

criterion_group!(generate_throughput, bench_single_event, bench_job);
criterion_main!(generate_throughput);

use std::{
    cmp::{max, min},
    sync::Arc,
    time::Instant,
};

use criterion::Criterion;
use logmetrics::{
    aggregation::BucketBounds, generator::MetricGenerator, random::RandomSource, request::Request,
};

fn generator(containers: usize) -> MetricGenerator {
    MetricGenerator::with_options(
        (0..containers).map(|i| format!("container-{i}")),
        "bench",
        BucketBounds::default(),
        RandomSource::seeded(42),
    )
}

pub fn generate(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("generate");

    for containers in [1, 10, 100] {
        let generator = generator(containers);
        group.throughput(criterion::Throughput::Elements(containers as u64));
        group.bench_function(format!("cycle-{containers:03}"), |bencher| {
            let mut timestamp = 0;
            bencher.iter(|| {
                timestamp += 1;
                generator
                    .generate_at(timestamp)
                    .and_then(|request| request.serialize())
                    .expect("generation does not fail")
            });
        });
    }
    group.finish();
}

pub fn shared_generator(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("shared_generator");
    group.throughput(criterion::Throughput::Elements(1));

    let generator = Arc::new(generator(10));
    for threads in [1, 2, 4, 8] {
        group.bench_function(format!("concurrency-{threads:02}"), |bencher| {
            bencher.iter_custom(|iterations| {
                let thread_count = max(1, min(threads, iterations));
                let iterations_per_thread = iterations / thread_count;

                let start = Instant::now();
                std::thread::scope(|scope| {
                    for _ in 0..thread_count {
                        scope.spawn(|| {
                            for i in 0..iterations_per_thread {
                                generator
                                    .generate_at(i as i64)
                                    .expect("generation does not fail");
                            }
                        });
                    }
                });

                start.elapsed()
            });
        });
    }
    group.finish();
}

criterion::criterion_group!(benches, generate, shared_generator);
criterion::criterion_main! {
    benches,
}

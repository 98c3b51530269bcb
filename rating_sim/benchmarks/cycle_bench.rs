use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rating_math::{Digit, Rating, RatingShape, RecordSelector};
use rating_sim::{build_headless_app_with_config, run_cycle, RatingConfig, RatingStore};

fn populated_app(records: u32, worker_threads: usize) -> bevy::prelude::App {
    let config = RatingConfig {
        worker_threads,
        ..RatingConfig::default()
    };
    let mut app = build_headless_app_with_config(config);
    {
        let mut store = app.world.resource_mut::<RatingStore>();
        let shapes = [RatingShape::Two, RatingShape::Three, RatingShape::Four];
        for index in 0..records {
            let shape = shapes[index as usize % shapes.len()];
            store.spawn(format!("r{index}"), Rating::filled(shape, Digit::MIN));
        }
        store.request_modifier(&RecordSelector::All, 25);
        store.request_check(&RecordSelector::All, 2);
    }
    app
}

fn bench_cycle(c: &mut Criterion) {
    let mut group = c.benchmark_group("cycle");

    for records in [64u32, 1_024, 16_384] {
        for (label, threads) in [("sequential", 1usize), ("parallel", 0)] {
            group.bench_with_input(BenchmarkId::new(label, records), &records, |b, &records| {
                b.iter_batched(
                    || populated_app(records, threads),
                    |mut app| {
                        run_cycle(&mut app);
                    },
                    BatchSize::LargeInput,
                )
            });
        }
    }

    group.finish();
}

criterion_group!(cycle_benches, bench_cycle);
criterion_main!(cycle_benches);

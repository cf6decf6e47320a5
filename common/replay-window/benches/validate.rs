// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use nym_replay_window::ReplayWindow;
use rand::seq::SliceRandom;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("replay-window");

    group.bench_function("in_order", |b| {
        let window = ReplayWindow::new();
        let mut counter = 0u64;
        b.iter(|| {
            counter += 1;
            black_box(window.validate(black_box(counter)))
        })
    });

    group.bench_function("duplicate", |b| {
        let window = ReplayWindow::new();
        window.validate(1000);
        b.iter(|| black_box(window.validate(black_box(1000))))
    });

    group.bench_function("full_window_jump", |b| {
        let window = ReplayWindow::new();
        let mut counter = 0u64;
        b.iter(|| {
            counter += 4096;
            black_box(window.validate(black_box(counter)))
        })
    });

    let mut rng = ChaCha20Rng::seed_from_u64(42);
    let mut reordered: Vec<u64> = (0..1984).collect();
    reordered.shuffle(&mut rng);
    group.bench_function("reordered_window", |b| {
        b.iter_batched(
            ReplayWindow::new,
            |window| {
                for &counter in &reordered {
                    black_box(window.validate(counter));
                }
            },
            BatchSize::SmallInput,
        )
    });

    group.finish();
}

criterion_group!(benches, bench_validate);
criterion_main!(benches);

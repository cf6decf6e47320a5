// Copyright 2025 - Nym Technologies SA <contact@nymtech.net>
// SPDX-License-Identifier: Apache-2.0

use nym_replay_window::{ReplayWindow, ReplayWindowRegistry};
use rand::seq::SliceRandom;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha20Rng;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 8;

#[test]
fn one_thread_per_counter() {
    let window = ReplayWindow::new();
    let accepted = AtomicUsize::new(0);
    let barrier = Barrier::new(64);

    thread::scope(|s| {
        for counter in 0..64u64 {
            let window = &window;
            let accepted = &accepted;
            let barrier = &barrier;
            s.spawn(move || {
                barrier.wait();
                if window.validate(counter) {
                    accepted.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });

    assert_eq!(accepted.load(Ordering::Relaxed), 64);
    for counter in 0..64 {
        assert!(!window.validate(counter));
    }
}

#[test]
fn shuffled_counters_across_workers_are_each_accepted_once() {
    let window = ReplayWindow::new();

    // every counter stays within reach of the highest possible one,
    // so no scheduling order can push any of them out of the window
    let mut counters: Vec<u64> = (0..=window.window_size()).collect();
    let mut rng = ChaCha20Rng::from_seed([42u8; 32]);
    counters.shuffle(&mut rng);

    let accepted = AtomicUsize::new(0);
    thread::scope(|s| {
        for chunk in counters.chunks(counters.len().div_ceil(THREADS)) {
            let window = &window;
            let accepted = &accepted;
            s.spawn(move || {
                for &counter in chunk {
                    if window.validate(counter) {
                        accepted.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    assert_eq!(accepted.load(Ordering::Relaxed), counters.len());
    assert_eq!(window.highest_accepted(), Some(window.window_size()));
    assert!(counters.iter().all(|&counter| !window.validate(counter)));
    assert_eq!(window.stats().accepted, counters.len() as u64);
}

#[test]
fn racing_on_the_same_counter_has_a_single_winner() {
    for round in 0..50u64 {
        let window = ReplayWindow::new();
        assert!(window.validate(round));

        let counter = round + 1000;
        let barrier = Barrier::new(THREADS);
        let winners = AtomicUsize::new(0);

        thread::scope(|s| {
            for _ in 0..THREADS {
                let window = &window;
                let barrier = &barrier;
                let winners = &winners;
                s.spawn(move || {
                    barrier.wait();
                    if window.validate(counter) {
                        winners.fetch_add(1, Ordering::Relaxed);
                    }
                });
            }
        });

        assert_eq!(winners.load(Ordering::Relaxed), 1);
    }
}

#[test]
fn registry_sessions_validate_in_parallel() {
    let registry = Arc::new(ReplayWindowRegistry::default());
    for session_id in 0..THREADS as u32 {
        registry.open_session(session_id);
    }

    let handles: Vec<_> = (0..THREADS as u32)
        .map(|session_id| {
            let registry = Arc::clone(&registry);
            thread::spawn(move || {
                (0..10_000u64)
                    .filter(|&counter| registry.validate(session_id, counter))
                    .count()
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.join().unwrap(), 10_000);
    }
    for session_id in 0..THREADS as u32 {
        let window = registry.window(session_id).unwrap();
        assert_eq!(window.highest_accepted(), Some(9_999));
    }
}

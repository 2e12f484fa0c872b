// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::{
    sync::atomic::{AtomicU64, Ordering},
    thread,
    time::{Duration, Instant},
};

use futures::executor::block_on;
use laptime::{
    Timer,
    sink::VecPushSink,
    timesource::{Time, TimeSource},
    unit::Millisecond,
};

/// Every reading is exactly one millisecond after the previous one
#[derive(Debug)]
struct SteppingClock {
    base: Instant,
    reads: AtomicU64,
}

impl SteppingClock {
    fn new() -> Self {
        Self {
            base: Instant::now(),
            reads: AtomicU64::new(0),
        }
    }
}

impl Time for SteppingClock {
    fn instant(&self) -> Instant {
        let step = self.reads.fetch_add(1, Ordering::Relaxed);
        self.base + Duration::from_millis(step)
    }
}

const THREADS: usize = 8;
const ROUNDS: usize = 200;

fn timer() -> (Timer<Millisecond>, VecPushSink) {
    let sink = VecPushSink::new();
    let timer = Timer::builder("contended")
        .sink(sink.clone())
        .time_source(TimeSource::custom(SteppingClock::new()))
        .build();
    (timer, sink)
}

// the clock is read before the state lock is taken, so a stop racing a start on
// another handle may land first and measure zero
fn assert_whole_millis(value: f64) {
    assert!(value >= 0.0, "{value}");
    assert_eq!(value.fract(), 0.0, "torn or partial measurement: {value}");
}

#[test]
fn racing_start_stop_on_aliased_handles() {
    let (timer, sink) = timer();

    let returned = thread::scope(|s| {
        let workers = (0..THREADS)
            .map(|_| {
                let handle = timer.clone();
                s.spawn(move || {
                    (0..ROUNDS)
                        .map(|_| {
                            handle.start();
                            let value = handle.stop();
                            assert_whole_millis(handle.value().unwrap());
                            value
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();
        workers
            .into_iter()
            .flat_map(|w| w.join().unwrap())
            .collect::<Vec<_>>()
    });

    let mut pushed = sink.drain().into_iter().map(|s| s.value).collect::<Vec<_>>();
    assert_eq!(pushed.len(), THREADS * ROUNDS);
    for value in &pushed {
        assert_whole_millis(*value);
    }

    // every push carries the value its own stop computed
    let mut returned = returned;
    returned.sort_by(f64::total_cmp);
    pushed.sort_by(f64::total_cmp);
    assert_eq!(returned, pushed);

    let last = timer.value().unwrap();
    assert!(pushed.contains(&last));
}

#[test]
fn timed_futures_race_with_start_stop() {
    let (timer, sink) = timer();

    thread::scope(|s| {
        for i in 0..THREADS {
            let handle = timer.clone();
            s.spawn(move || {
                for _ in 0..ROUNDS {
                    if i % 2 == 0 {
                        handle.start();
                        handle.stop();
                    } else {
                        let out = block_on(handle.time(async { i }));
                        assert_eq!(out, i);
                    }
                    assert_whole_millis(handle.value().unwrap());
                }
            });
        }
    });

    let pushed = sink.drain();
    assert_eq!(pushed.len(), THREADS * ROUNDS);
    assert!(pushed.iter().all(|s| s.name == "contended_ms"));
    for sample in &pushed {
        assert_whole_millis(sample.value);
    }
}

#[test]
fn handles_outlive_the_original_across_threads() {
    let (timer, sink) = timer();
    let timed = (0..THREADS)
        .map(|i| timer.time(async move { i * 2 }))
        .collect::<Vec<_>>();
    let observer = timer.clone();
    drop(timer);

    let outputs = thread::scope(|s| {
        let workers = timed
            .into_iter()
            .map(|t| s.spawn(move || block_on(t)))
            .collect::<Vec<_>>();
        workers
            .into_iter()
            .map(|w| w.join().unwrap())
            .collect::<Vec<_>>()
    });

    assert_eq!(outputs, (0..THREADS).map(|i| i * 2).collect::<Vec<_>>());
    assert_eq!(sink.len(), THREADS);
    assert!(observer.value().unwrap() >= 1.0);
    assert_whole_millis(observer.value().unwrap());
}

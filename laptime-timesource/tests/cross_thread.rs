// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use laptime_timesource::{Stopwatch, TimeSource, fakes::ManuallyAdvancedTimeSource};

#[test]
fn stopwatch_can_be_stopped_on_another_thread() {
    let clock = ManuallyAdvancedTimeSource::new();
    let mut stopwatch = Stopwatch::new(TimeSource::custom(clock.clone()));
    stopwatch.start();

    let (tx, rx) = std::sync::mpsc::channel::<()>();
    let worker = std::thread::spawn(move || {
        rx.recv().unwrap();
        stopwatch.stop();
        stopwatch
    });

    clock.advance(Duration::from_millis(12));
    tx.send(()).unwrap();
    let stopwatch = worker.join().unwrap();

    clock.advance(Duration::from_millis(100));
    assert_eq!(stopwatch.elapsed(), Duration::from_millis(12));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn stopwatch_moves_into_spawned_task() {
    let clock = ManuallyAdvancedTimeSource::new();
    let mut stopwatch = Stopwatch::new(TimeSource::custom(clock.clone()));
    stopwatch.start();
    clock.advance(Duration::from_millis(3));

    let elapsed = tokio::spawn(async move {
        stopwatch.stop();
        stopwatch.elapsed()
    })
    .await
    .unwrap();

    assert_eq!(elapsed, Duration::from_millis(3));
}

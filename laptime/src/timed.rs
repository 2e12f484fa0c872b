// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Attaches a latency measurement to the settlement of a future.

use std::{
    fmt,
    future::Future,
    pin::Pin,
    task::{Context, Poll, ready},
};

use laptime_core::TimeUnit;
use laptime_timesource::Stopwatch;
use pin_project::{pin_project, pinned_drop};

use crate::Timer;

/// Future returned by [`Timer::time`]
///
/// Resolves to exactly what the wrapped future resolves to. When it does, or when it
/// is dropped without having resolved, the time since [`Timer::time`] was called is
/// recorded on the timer and pushed to its sink. This happens once per `Timed`.
///
/// `Timed` owns a handle to the timer, so the measurement is recorded even if every
/// other handle to the timer is gone by then.
#[pin_project(PinnedDrop)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Timed<F, U: TimeUnit> {
    #[pin]
    future: F,
    completion: Option<Completion<U>>,
}

impl<F, U: TimeUnit> Timed<F, U> {
    pub(crate) fn new(future: F, completion: Completion<U>) -> Self {
        Self {
            future,
            completion: Some(completion),
        }
    }

    /// Whether the measurement has already been taken
    pub fn is_settled(&self) -> bool {
        self.completion.is_none()
    }
}

impl<F: Future, U: TimeUnit> Future for Timed<F, U> {
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let output = ready!(this.future.poll(cx));
        if let Some(completion) = this.completion.take() {
            completion.settle(Settlement::Completed);
        }
        Poll::Ready(output)
    }
}

#[pinned_drop]
impl<F, U: TimeUnit> PinnedDrop for Timed<F, U> {
    fn drop(self: Pin<&mut Self>) {
        if let Some(completion) = self.project().completion.take() {
            completion.settle(Settlement::Cancelled);
        }
    }
}

impl<F, U: TimeUnit> fmt::Debug for Timed<F, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Timed");
        if let Some(completion) = &self.completion {
            s.field("timer", &completion.timer.name());
        }
        s.field("settled", &self.is_settled()).finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Settlement {
    /// The wrapped future produced its output
    Completed,
    /// The wrapped future was dropped before producing its output
    Cancelled,
}

/// The stopwatch started by [`Timer::time`] together with the timer it reports to.
pub(crate) struct Completion<U: TimeUnit> {
    stopwatch: Stopwatch,
    timer: Timer<U>,
}

impl<U: TimeUnit> Completion<U> {
    pub(crate) fn new(stopwatch: Stopwatch, timer: Timer<U>) -> Self {
        Self { stopwatch, timer }
    }

    fn settle(mut self, settlement: Settlement) {
        self.stopwatch.stop();
        // this invocation's own value is pushed, even if another measurement
        // overwrites the timer before the push happens
        let value = self.timer.record(self.stopwatch.elapsed());
        match settlement {
            Settlement::Completed => {
                tracing::trace!(timer = self.timer.name(), value, "timed future completed")
            }
            Settlement::Cancelled => tracing::debug!(
                timer = self.timer.name(),
                value,
                "timed future dropped before completing"
            ),
        }
        self.timer.push(value);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        future::{pending, ready},
        time::Duration,
    };

    use futures::{FutureExt, executor::block_on};
    use laptime_core::{sink::VecPushSink, unit::Millisecond};
    use laptime_timesource::{TimeSource, fakes::ManuallyAdvancedTimeSource};

    use crate::Timer;

    fn timer() -> (Timer<Millisecond>, VecPushSink, ManuallyAdvancedTimeSource) {
        let sink = VecPushSink::new();
        let clock = ManuallyAdvancedTimeSource::new();
        let timer = Timer::builder("op")
            .sink(sink.clone())
            .time_source(TimeSource::custom(clock.clone()))
            .build();
        (timer, sink, clock)
    }

    #[test]
    fn clock_starts_at_call_not_first_poll() {
        let (timer, sink, clock) = timer();
        let timed = timer.time(ready(7));
        clock.advance(Duration::from_millis(9));
        assert_eq!(block_on(timed), 7);
        assert_eq!(timer.value(), Ok(9.0));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn settles_once_even_when_dropped_after_completion() {
        let (timer, sink, clock) = timer();
        let mut timed = timer.time(ready("done"));
        assert!(!timed.is_settled());
        assert_eq!((&mut timed).now_or_never(), Some("done"));
        assert!(timed.is_settled());
        clock.advance(Duration::from_millis(50));
        drop(timed);
        assert_eq!(sink.len(), 1);
        assert_eq!(timer.value(), Ok(0.0));
    }

    #[test]
    fn pending_poll_does_not_settle() {
        let (timer, sink, clock) = timer();
        let mut timed = timer.time(pending::<()>());
        assert_eq!((&mut timed).now_or_never(), None);
        assert!(sink.is_empty());
        assert!(timer.value().is_err());

        clock.advance(Duration::from_millis(3));
        drop(timed);
        assert_eq!(timer.value(), Ok(3.0));
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn debug_reports_settlement() {
        let (timer, _sink, _clock) = timer();
        let mut timed = timer.time(ready(()));
        assert_eq!(
            format!("{timed:?}"),
            "Timed { timer: \"op_ms\", settled: false, .. }"
        );
        (&mut timed).now_or_never();
        assert_eq!(format!("{timed:?}"), "Timed { settled: true, .. }");
    }
}

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::{fmt, marker::PhantomData, sync::Arc, time::Duration};

use derive_where::derive_where;
use laptime_core::{BoxPushSink, PushSink, TimeUnit, global::GlobalSink, unit::Second};
use laptime_timesource::{Stopwatch, TimeSource, get_time_source};

use crate::{
    error::NoValue,
    lock::SpinLock,
    metric::Metric,
    timed::{Completion, Timed},
};

/// A metric recording how long an operation took
///
/// A `Timer` is a handle: cloning it gives another handle to the *same* timer, and
/// every clone sees (and overwrites) the same last recorded value. The state behind
/// the handles lives as long as any handle, or any [`Timed`] future still waiting to
/// settle, refers to it.
///
/// There are two independent ways to take a measurement, and they may race freely:
/// - bracket a synchronous span with [`start`](Self::start) and [`stop`](Self::stop)
/// - wrap a future with [`time`](Self::time), which measures from the call until the
///   future settles
///
/// Whichever measurement finishes last is what [`value`](Self::value) reports.
/// Every measurement is also pushed to the timer's sink, after the shared state has
/// been released.
///
/// The timer is published as `{name}_{U::SUFFIX}`, e.g. `fetch_secs`.
///
/// # Examples
/// ```
/// use laptime::{Timer, unit::Millisecond};
///
/// let timer: Timer<Millisecond> = Timer::new("checkpoint");
/// assert!(timer.value().is_err());
///
/// timer.start();
/// // do some work
/// let elapsed_ms = timer.stop();
/// assert_eq!(timer.value(), Ok(elapsed_ms));
/// assert_eq!(timer.name(), "checkpoint_ms");
/// ```
#[derive_where(Clone)]
pub struct Timer<U: TimeUnit = Second> {
    shared: Arc<Shared>,
    _unit: PhantomData<fn() -> U>,
}

struct Shared {
    metric: Metric,
    time_source: TimeSource,
    state: SpinLock<State>,
}

struct State {
    stopwatch: Stopwatch,
    last_value: Option<f64>,
}

impl<U: TimeUnit> Timer<U> {
    /// Create a timer publishing to the [`GlobalSink`], reading the current
    /// [time source](laptime_timesource::time_source), with no aggregation window.
    pub fn new(name: impl Into<String>) -> Self {
        Self::builder(name).build()
    }

    /// Start configuring a timer
    pub fn builder(name: impl Into<String>) -> TimerBuilder<U> {
        TimerBuilder {
            name: name.into(),
            window: None,
            sink: None,
            time_source: None,
            _unit: PhantomData,
        }
    }

    /// Full name the timer publishes under, including the unit suffix
    pub fn name(&self) -> &str {
        self.shared.metric.name()
    }

    /// Aggregation window the timer was configured with
    pub fn window(&self) -> Option<Duration> {
        self.shared.metric.window()
    }

    /// The most recently recorded measurement, in `U`s
    ///
    /// Fails with [`NoValue`] until a measurement has completed.
    pub fn value(&self) -> Result<f64, NoValue> {
        self.shared.state.lock().last_value.ok_or(NoValue::new())
    }

    /// Start the shared stopwatch
    ///
    /// Starting an already running timer restarts it; the last `start` wins.
    pub fn start(&self) {
        // the clock may be arbitrary user code, so it is read outside the lock
        let now = self.shared.time_source.instant();
        self.shared.state.lock().stopwatch.start_at(now);
    }

    /// Stop the shared stopwatch, record the elapsed time and push it
    ///
    /// Returns the recorded value. Stopping a timer that was never started
    /// records `0.0`, as does a `stop` whose clock reading lost a race with a
    /// concurrent `start` on another handle.
    pub fn stop(&self) -> f64 {
        let now = self.shared.time_source.instant();
        let (value, was_started) = {
            let mut state = self.shared.state.lock();
            let was_started = state.stopwatch.is_started();
            state.stopwatch.stop_at(now);
            let value = U::from_duration(state.stopwatch.elapsed());
            state.last_value = Some(value);
            (value, was_started)
        };
        if !was_started {
            tracing::debug!(
                timer = self.name(),
                "stopped a timer that was never started, recording zero"
            );
        }
        self.shared.metric.push(value);
        value
    }

    /// Time how long `future` takes to settle
    ///
    /// The clock starts now, not when the returned future is first polled. The
    /// measurement is taken exactly once, when the returned [`Timed`] future either
    /// produces the inner future's output (whatever it is, success or error) or is
    /// dropped before that (cancellation). It is recorded as this timer's latest
    /// value and pushed to the sink, from whichever thread settles the future.
    ///
    /// The output is passed through unchanged.
    ///
    /// # Examples
    /// ```
    /// # futures::executor::block_on(async {
    /// use laptime::{Timer, sink::VecPushSink};
    ///
    /// let sink = VecPushSink::new();
    /// let timer: Timer = Timer::builder("lookup").sink(sink.clone()).build();
    ///
    /// let result: Result<u32, &str> = timer.time(async { Err("not found") }).await;
    /// assert_eq!(result, Err("not found"));
    /// assert_eq!(sink.len(), 1);
    /// assert!(timer.value().is_ok());
    /// # });
    /// ```
    pub fn time<F: IntoFuture>(&self, future: F) -> Timed<F::IntoFuture, U> {
        let mut stopwatch = Stopwatch::new(self.shared.time_source.clone());
        stopwatch.start();
        Timed::new(future.into_future(), Completion::new(stopwatch, self.clone()))
    }

    /// Record a measurement taken outside of the shared stopwatch
    pub(crate) fn record(&self, elapsed: Duration) -> f64 {
        let value = U::from_duration(elapsed);
        self.shared.state.lock().last_value = Some(value);
        value
    }

    pub(crate) fn push(&self, value: f64) {
        self.shared.metric.push(value);
    }
}

impl<U: TimeUnit> fmt::Debug for Timer<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timer")
            .field("name", &self.name())
            .field("window", &self.window())
            .field("unit", &U::UNIT)
            .finish_non_exhaustive()
    }
}

/// Configures a [`Timer`]. Created by [`Timer::builder`].
///
/// # Examples
/// ```
/// use std::time::Duration;
/// use laptime::{Timer, sink::TracingSink, unit::Microsecond};
///
/// let timer: Timer<Microsecond> = Timer::builder("decode")
///     .window(Duration::from_secs(60))
///     .sink(TracingSink)
///     .build();
/// assert_eq!(timer.name(), "decode_us");
/// assert_eq!(timer.window(), Some(Duration::from_secs(60)));
/// ```
#[must_use]
pub struct TimerBuilder<U: TimeUnit = Second> {
    name: String,
    window: Option<Duration>,
    sink: Option<BoxPushSink>,
    time_source: Option<TimeSource>,
    _unit: PhantomData<fn() -> U>,
}

impl<U: TimeUnit> TimerBuilder<U> {
    /// Aggregation window to hand to the collector
    pub fn window(mut self, window: Duration) -> Self {
        self.window = Some(window);
        self
    }

    /// Push samples to `sink` instead of the [`GlobalSink`]
    pub fn sink(mut self, sink: impl PushSink + Send + Sync + 'static) -> Self {
        self.sink = Some(sink.boxed());
        self
    }

    /// Read time from `time_source` instead of the ambient one
    pub fn time_source(mut self, time_source: TimeSource) -> Self {
        self.time_source = Some(time_source);
        self
    }

    /// Build the timer
    ///
    /// The time source is resolved now: a thread-local override active on this
    /// thread is kept even when measurements later complete on other threads.
    pub fn build(self) -> Timer<U> {
        let name = format!("{}_{}", self.name, U::SUFFIX);
        let sink = self.sink.unwrap_or_else(|| GlobalSink.boxed());
        let time_source = get_time_source(self.time_source);
        Timer {
            shared: Arc::new(Shared {
                metric: Metric::new(name, self.window, sink),
                state: SpinLock::new(State {
                    stopwatch: Stopwatch::new(time_source.clone()),
                    last_value: None,
                }),
                time_source,
            }),
            _unit: PhantomData,
        }
    }
}

impl<U: TimeUnit> fmt::Debug for TimerBuilder<U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerBuilder")
            .field("name", &self.name)
            .field("window", &self.window)
            .field("unit", &U::UNIT)
            .finish_non_exhaustive()
    }
}

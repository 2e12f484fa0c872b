// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

use crate::{Instant, TimeSource, time_source};

/// Measures a single interval of wall-clock time
///
/// `Stopwatch` is a plain value: cloning it copies the recorded instants, so a
/// clone can be moved into a callback and stopped independently of the original.
///
/// - Before [`start`](Self::start) is called, [`elapsed`](Self::elapsed) is zero.
/// - While running, `elapsed` is the time since the last `start`.
/// - After [`stop`](Self::stop), `elapsed` is fixed at the time between the last
///   `start` and the last `stop`.
///
/// # Examples
/// ```
/// use laptime_timesource::{Stopwatch, TimeSource, fakes::ManuallyAdvancedTimeSource};
/// use std::time::Duration;
///
/// let clock = ManuallyAdvancedTimeSource::new();
/// let mut stopwatch = Stopwatch::new(TimeSource::custom(clock.clone()));
/// stopwatch.start();
/// clock.advance(Duration::from_millis(10));
/// stopwatch.stop();
/// clock.advance(Duration::from_millis(10));
/// assert_eq!(stopwatch.elapsed(), Duration::from_millis(10));
/// ```
#[derive(Clone, Debug)]
pub struct Stopwatch {
    time_source: TimeSource,
    started: Option<Instant>,
    stopped: Option<Instant>,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new(time_source())
    }
}

impl Stopwatch {
    /// Create a stopped stopwatch that reads `time_source`
    pub fn new(time_source: TimeSource) -> Self {
        Self {
            time_source,
            started: None,
            stopped: None,
        }
    }

    /// Start (or restart) the stopwatch
    ///
    /// Restarting a running stopwatch discards the previous start.
    pub fn start(&mut self) {
        let now = self.time_source.instant();
        self.start_at(now);
    }

    /// Start (or restart) the stopwatch at an instant read earlier
    ///
    /// Lets the caller read the clock before entering a critical section and only
    /// store the result inside it.
    pub fn start_at(&mut self, started: Instant) {
        self.started = Some(started);
        self.stopped = None;
    }

    /// Stop the stopwatch, freezing [`elapsed`](Self::elapsed)
    ///
    /// Stopping an already stopped stopwatch moves the stop point to now.
    pub fn stop(&mut self) {
        let now = self.time_source.instant();
        self.stop_at(now);
    }

    /// Stop the stopwatch at an instant read earlier
    ///
    /// A stop instant before the start instant measures as zero.
    pub fn stop_at(&mut self, stopped: Instant) {
        self.stopped = Some(stopped);
    }

    /// The measured interval
    pub fn elapsed(&self) -> Duration {
        match (&self.started, &self.stopped) {
            (None, _) => Duration::ZERO,
            (Some(started), None) => started.elapsed(),
            (Some(started), Some(stopped)) => stopped.saturating_duration_since(started),
        }
    }

    /// Whether [`start`](Self::start) has been called at least once
    pub fn is_started(&self) -> bool {
        self.started.is_some()
    }

    /// Whether the stopwatch has been started and not stopped since
    pub fn is_running(&self) -> bool {
        self.started.is_some() && self.stopped.is_none()
    }
}

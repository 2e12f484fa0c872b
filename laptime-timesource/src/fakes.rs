// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use crate::Time;

/// Clock frozen at a single instant
///
/// Every measurement taken on it is zero.
#[derive(Debug, Clone, Copy)]
pub struct StaticTimeSource {
    now: Instant,
}

impl StaticTimeSource {
    /// Create a clock frozen at the current system instant
    pub fn new() -> Self {
        Self::at(Instant::now())
    }

    /// Create a clock frozen at `instant`
    pub fn at(instant: Instant) -> Self {
        Self { now: instant }
    }
}

impl Default for StaticTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Time for StaticTimeSource {
    fn instant(&self) -> Instant {
        self.now
    }
}

/// Clock that only moves when told to
///
/// Clones share the same clock, so a test can keep one clone and hand another to
/// [`TimeSource::custom`](crate::TimeSource::custom). The clock may be read and
/// advanced from any thread.
#[derive(Debug, Clone)]
pub struct ManuallyAdvancedTimeSource(Arc<Mutex<Instant>>);

impl ManuallyAdvancedTimeSource {
    /// Create a new clock starting at the current system instant
    ///
    /// # Examples
    ///
    /// ```
    /// use laptime_timesource::{TimeSource, fakes::ManuallyAdvancedTimeSource};
    /// use std::time::Duration;
    ///
    /// let clock = ManuallyAdvancedTimeSource::new();
    /// let ts = TimeSource::custom(clock.clone());
    /// let start = ts.instant();
    /// assert_eq!(start.elapsed(), Duration::ZERO);
    ///
    /// clock.advance(Duration::from_millis(10));
    /// assert_eq!(start.elapsed(), Duration::from_millis(10));
    /// ```
    pub fn new() -> Self {
        Self(Arc::new(Mutex::new(Instant::now())))
    }

    /// Move the clock forward by `elapsed`
    pub fn advance(&self, elapsed: Duration) {
        let mut now = self.0.lock().unwrap();
        *now += elapsed;
    }
}

impl Default for ManuallyAdvancedTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Time for ManuallyAdvancedTimeSource {
    fn instant(&self) -> Instant {
        *self.0.lock().unwrap()
    }
}

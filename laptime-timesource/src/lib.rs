// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

use std::{
    cell::RefCell,
    fmt::Debug,
    time::{Duration, Instant as StdInstant},
};

/// Clocks that only move when a test says so. Needs the `test-util` feature.
#[cfg(feature = "test-util")]
pub mod fakes;

mod stopwatch;

pub use stopwatch::Stopwatch;

/// Trait for providing custom monotonic clocks
///
/// Implementors of this trait can be used to drive [`Stopwatch`]es from
/// something other than the system clock, typically a fake clock in tests.
pub trait Time: Send + Sync + Debug {
    /// Read the clock
    fn instant(&self) -> StdInstant;
}

/// Tokio-specific time source
///
/// Measurements taken through this source follow tokio's clock, so
/// `tokio::time::pause` and `tokio::time::advance` control them exactly.
///
/// Available with the `tokio` feature.
#[cfg(feature = "tokio")]
pub mod tokio {
    use std::time::Instant as StdInstant;

    use tokio::time::Instant as TokioInstant;

    use crate::{Time, TimeSource};

    impl TimeSource {
        /// Create a new TimeSource that reads tokio's clock
        ///
        /// # Examples
        ///
        /// ```
        /// # #[tokio::main(flavor = "current_thread")]
        /// # async fn main() {
        /// use std::time::Duration;
        /// use laptime_timesource::TimeSource;
        ///
        /// tokio::time::pause();
        /// let ts = TimeSource::tokio();
        /// let start = ts.instant();
        ///
        /// tokio::time::advance(Duration::from_millis(5)).await;
        /// assert_eq!(start.elapsed(), Duration::from_millis(5));
        /// # }
        /// ```
        pub fn tokio() -> Self {
            TimeSource::custom(TokioTime)
        }
    }

    /// A [`Time`] implementation backed by [`tokio::time::Instant`]
    ///
    /// Outside of a tokio runtime this falls back to the system clock, the same
    /// as `tokio::time::Instant::now` does.
    #[derive(Copy, Clone, Debug, Default)]
    #[non_exhaustive]
    pub struct TokioTime;

    impl Time for TokioTime {
        fn instant(&self) -> StdInstant {
            TokioInstant::now().into_std()
        }
    }

}

/// Where a [`Stopwatch`] reads the current instant from
#[derive(Clone, Default)]
pub enum TimeSource {
    /// Use the system monotonic clock
    #[default]
    System,
    #[cfg(feature = "custom-timesource")]
    /// Use a custom clock
    Custom(std::sync::Arc<dyn Time + Send + Sync>),
}

impl std::fmt::Debug for TimeSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::System => "TimeSource::System",
            #[cfg(feature = "custom-timesource")]
            Self::Custom(_) => "TimeSource::Custom(..)",
        })
    }
}

impl TimeSource {
    /// Read the current instant
    ///
    /// # Examples
    ///
    /// ```
    /// use laptime_timesource::TimeSource;
    ///
    /// let started = TimeSource::System.instant();
    /// assert!(started.elapsed() < std::time::Duration::from_secs(60));
    /// ```
    pub fn instant(&self) -> Instant {
        let now = match self {
            Self::System => StdInstant::now(),
            #[cfg(feature = "custom-timesource")]
            Self::Custom(clock) => clock.instant(),
        };
        Instant::new(now, self)
    }

    /// Create a new TimeSource with a custom clock
    ///
    /// Available with the `custom-timesource` feature.
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
    /// clock.advance(Duration::from_millis(3));
    /// assert_eq!(start.elapsed(), Duration::from_millis(3));
    /// ```
    #[cfg(feature = "custom-timesource")]
    pub fn custom(clock: impl Time + 'static) -> TimeSource {
        Self::Custom(std::sync::Arc::new(clock))
    }
}

thread_local! {
    static OVERRIDE: RefCell<Option<TimeSource>> = const { RefCell::new(None) };
}

/// Guard for a thread-local time source override
///
/// Dropping the guard restores whatever override was active before it.
#[must_use]
pub struct ThreadLocalTimeSourceGuard {
    restore: Option<TimeSource>,
}

impl Drop for ThreadLocalTimeSourceGuard {
    fn drop(&mut self) {
        let restore = self.restore.take();
        OVERRIDE.with(|cell| *cell.borrow_mut() = restore);
    }
}

#[cfg(feature = "custom-timesource")]
/// Override the time source for this thread until the returned guard is dropped
///
/// Only code running on this thread observes the override. Timers capture their
/// time source when they are built, so a timer built under the override keeps
/// using it when measurements complete on other threads.
///
/// # Examples
/// ```
/// use laptime_timesource::{TimeSource, fakes::StaticTimeSource, time_source, set_time_source};
/// use std::time::Duration;
///
/// let _guard = set_time_source(TimeSource::custom(StaticTimeSource::new()));
///
/// let start = time_source().instant();
/// assert_eq!(start.elapsed(), Duration::ZERO);
/// ```
pub fn set_time_source(time_source: TimeSource) -> ThreadLocalTimeSourceGuard {
    let restore = OVERRIDE.with(|cell| cell.replace(Some(time_source)));
    ThreadLocalTimeSourceGuard { restore }
}

#[cfg(feature = "custom-timesource")]
/// Run `f` with `time_source` overriding this thread's time source
pub fn with_time_source<F, R>(time_source: TimeSource, f: F) -> R
where
    F: FnOnce() -> R,
{
    let _guard = set_time_source(time_source);
    f()
}

/// Resolve a time source: `ts` if given, otherwise this thread's override, otherwise
/// [`TimeSource::System`]
#[inline]
pub fn get_time_source(ts: Option<TimeSource>) -> TimeSource {
    if let Some(ts) = ts {
        return ts;
    }

    #[cfg(feature = "custom-timesource")]
    {
        if let Some(overridden) = OVERRIDE.with(|cell| cell.borrow().clone()) {
            return overridden;
        }
    }

    TimeSource::System
}

/// The time source code on this thread should use, i.e. `get_time_source(None)`
#[inline]
pub fn time_source() -> TimeSource {
    get_time_source(None)
}

/// `Instant` wrapper
///
/// When `custom-timesource` is not enabled, this is exactly the same size as `std::time::Instant`.
/// When it _is_ enabled, it retains a pointer to the time source it came from so `elapsed()`
/// reads the same clock.
#[derive(Clone)]
#[cfg_attr(not(feature = "custom-timesource"), derive(Copy), repr(transparent))]
pub struct Instant {
    value: StdInstant,
    #[cfg(feature = "custom-timesource")]
    time_source: TimeSource,
}

impl std::fmt::Debug for Instant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.value.fmt(f)
    }
}

impl Instant {
    /// Returns the amount of time elapsed since this instant, measured on the
    /// clock that produced it
    ///
    /// # Examples
    ///
    /// ```
    /// use laptime_timesource::time_source;
    /// use std::thread;
    /// use std::time::Duration;
    ///
    /// let start = time_source().instant();
    /// thread::sleep(Duration::from_millis(10));
    /// assert!(start.elapsed() >= Duration::from_millis(10));
    /// ```
    pub fn elapsed(&self) -> Duration {
        self.time_source()
            .instant()
            .saturating_duration_since(self)
    }

    /// Amount of time from `earlier` to `self`, or zero if `earlier` is later
    pub fn saturating_duration_since(&self, earlier: &Instant) -> Duration {
        self.value.saturating_duration_since(earlier.value)
    }

    /// The underlying [`std::time::Instant`]
    ///
    /// After conversion, `elapsed()` no longer respects custom time sources.
    pub fn as_std(&self) -> StdInstant {
        self.value
    }

    fn time_source(&self) -> &TimeSource {
        #[cfg(feature = "custom-timesource")]
        {
            &self.time_source
        }

        #[cfg(not(feature = "custom-timesource"))]
        &TimeSource::System
    }

    fn new(std: StdInstant, ts: &TimeSource) -> Self {
        #[cfg(not(feature = "custom-timesource"))]
        let _ = ts;
        Self {
            value: std,
            #[cfg(feature = "custom-timesource")]
            time_source: ts.clone(),
        }
    }
}

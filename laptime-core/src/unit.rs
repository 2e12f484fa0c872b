// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Time units a timer can report in.
//!
//! A timer is generic over a [`TimeUnit`] marker type. The unit decides how an
//! elapsed [`Duration`] is converted into the `f64` that gets pushed, and which
//! suffix is appended to the timer's name (`fetch` timed in [`Millisecond`]s is
//! published as `fetch_ms`).
//!
//! ```
//! # use laptime_core::unit::{Millisecond, Second, TimeUnit};
//! # use std::time::Duration;
//! assert_eq!(Millisecond::from_duration(Duration::from_micros(1500)), 1.5);
//! assert_eq!(Second::SUFFIX, "secs");
//! ```

use std::{fmt, time::Duration};

/// The time units supported by timers
#[non_exhaustive]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    /// Nanoseconds
    Nanoseconds,
    /// Microseconds
    Microseconds,
    /// Milliseconds
    Milliseconds,
    /// Seconds
    Seconds,
    /// Minutes
    Minutes,
    /// Hours
    Hours,
}

impl Unit {
    /// Human readable name of the unit
    pub const fn name(self) -> &'static str {
        match self {
            Self::Nanoseconds => "Nanoseconds",
            Self::Microseconds => "Microseconds",
            Self::Milliseconds => "Milliseconds",
            Self::Seconds => "Seconds",
            Self::Minutes => "Minutes",
            Self::Hours => "Hours",
        }
    }
}

impl fmt::Debug for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A marker type naming the unit a timer reports in.
pub trait TimeUnit: Send + Sync + 'static {
    /// The [`Unit`] this marker stands for
    const UNIT: Unit;

    /// Suffix appended to the timer name, separated by `_`
    const SUFFIX: &'static str;

    /// How many nanoseconds make up one of this unit
    const NANOS_PER_UNIT: u64;

    /// Express `duration` as a (fractional) number of this unit
    fn from_duration(duration: Duration) -> f64 {
        // whole seconds and the sub-second part are scaled separately so that
        // nanosecond precision survives for durations up to ~100 days
        let nanos_per_unit = Self::NANOS_PER_UNIT as f64;
        let whole = duration.as_secs() as f64 * 1_000_000_000.0 / nanos_per_unit;
        let frac = duration.subsec_nanos() as f64 / nanos_per_unit;
        whole + frac
    }
}

macro_rules! time_unit {
    ($($struct:ident, $unit:ident, $suffix:literal, $nanos:expr;)*) => {
        $(
            #[doc = concat!("[`TimeUnit`] reporting in ", stringify!($unit), ", suffix `", $suffix, "`.")]
            #[derive(Clone, Copy, Default)]
            pub struct $struct;

            impl TimeUnit for $struct {
                const UNIT: Unit = Unit::$unit;
                const SUFFIX: &'static str = $suffix;
                const NANOS_PER_UNIT: u64 = $nanos;
            }

            impl fmt::Debug for $struct {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Debug::fmt(&Self::UNIT, f)
                }
            }

            impl fmt::Display for $struct {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Display::fmt(&Self::UNIT, f)
                }
            }
        )*
    };
}

time_unit! {
    Nanosecond, Nanoseconds, "ns", 1;
    Microsecond, Microseconds, "us", 1_000;
    Millisecond, Milliseconds, "ms", 1_000_000;
    Second, Seconds, "secs", 1_000_000_000;
    Minute, Minutes, "mins", 60 * 1_000_000_000;
    Hour, Hours, "hrs", 3_600 * 1_000_000_000;
}

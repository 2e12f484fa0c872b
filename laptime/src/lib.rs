// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

mod error;
mod lock;
pub mod metric;
pub mod sink;
mod timed;
mod timer;

pub use error::NoValue;
pub use timed::Timed;
pub use timer::{Timer, TimerBuilder};

/// Time units a [`Timer`] can report in
///
/// The unit is picked with the timer's type parameter and decides the suffix of the
/// published name: `Timer<Millisecond>` named `fetch` publishes `fetch_ms`.
pub mod unit {
    pub use laptime_core::unit::{
        Hour, Microsecond, Millisecond, Minute, Nanosecond, Second, TimeUnit, Unit,
    };
}

/// Re-export of [`laptime_timesource`], for configuring where timers read time from
pub mod timesource {
    pub use laptime_timesource::*;
}

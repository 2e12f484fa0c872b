// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Contains the [`PushSink`] trait, which receives the samples published by timers,
//! along with a few simple sinks.

use std::{fmt::Debug, sync::Arc};

/// Receives named numeric samples for aggregation.
///
/// `push` is fire-and-forget: nothing is returned to the publisher, and a sink that
/// can't deliver a sample should drop it (emitting a `tracing` event if useful) rather
/// than report back. Unless this is explicitly a test sink, `push` must never block for
/// an unbounded amount of time and must never panic.
pub trait PushSink {
    /// Publish `value` under the metric `name`.
    fn push(&self, name: &str, value: f64);

    /// Returns a [`BoxPushSink`] that is a type-erased version of this sink
    fn boxed(self) -> BoxPushSink
    where
        Self: Sized + Send + Sync + 'static,
    {
        BoxPushSink::new(self)
    }
}

/// A type-erased [`PushSink`]. Cloning gives another reference to the same sink.
#[derive(Clone)]
pub struct BoxPushSink(Arc<dyn PushSink + Send + Sync + 'static>);

impl Debug for BoxPushSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("BoxPushSink").finish()
    }
}

impl BoxPushSink {
    /// Create a new [`BoxPushSink`]
    pub fn new(sink: impl PushSink + Send + Sync + 'static) -> Self {
        Self(Arc::new(sink))
    }
}

impl PushSink for BoxPushSink {
    fn push(&self, name: &str, value: f64) {
        self.0.push(name, value)
    }

    fn boxed(self) -> BoxPushSink {
        self
    }
}

/// A [`PushSink`] that drops all samples.
#[derive(Copy, Clone, Debug, Default)]
#[non_exhaustive]
pub struct DevNullSink;

impl DevNullSink {
    /// Return a new [`DevNullSink`]
    pub const fn new() -> Self {
        DevNullSink
    }
}

impl PushSink for DevNullSink {
    fn push(&self, _name: &str, _value: f64) {}
}

#[cfg(feature = "test-util")]
pub use vec::{Sample, VecPushSink};

#[cfg(feature = "test-util")]
mod vec {
    use std::sync::{Arc, Mutex};

    use super::PushSink;

    /// A sample recorded by [`VecPushSink`]
    #[derive(Debug, Clone, PartialEq)]
    pub struct Sample {
        /// Full metric name the sample was pushed under
        pub name: String,
        /// Pushed value
        pub value: f64,
    }

    /// In-memory sink backed by a [`Vec`] designed for testing.
    ///
    /// Cloning will provide another reference to the same underlying sink.
    ///
    /// This requires that the `test-util` feature be enabled.
    ///
    /// # Example
    /// ```
    /// # use laptime_core::{PushSink, sink::{Sample, VecPushSink}};
    /// let sink = VecPushSink::new();
    /// sink.push("fetch_secs", 0.5);
    /// assert_eq!(sink.drain(), &[Sample { name: "fetch_secs".into(), value: 0.5 }]);
    /// assert!(sink.is_empty());
    /// ```
    #[derive(Debug, Clone, Default)]
    pub struct VecPushSink(Arc<Mutex<Vec<Sample>>>);

    impl VecPushSink {
        /// Create a new, empty [`VecPushSink`]
        pub fn new() -> Self {
            Self::default()
        }

        /// Returns a copy of every sample pushed so far, oldest first
        pub fn samples(&self) -> Vec<Sample> {
            self.0.lock().unwrap().clone()
        }

        /// Drains all currently pushed samples and returns them as an owned [`Vec`].
        ///
        /// The sink can still be used afterwards.
        pub fn drain(&self) -> Vec<Sample> {
            std::mem::take(&mut *self.0.lock().unwrap())
        }

        /// Number of samples currently held
        pub fn len(&self) -> usize {
            self.0.lock().unwrap().len()
        }

        /// Whether no samples are currently held
        pub fn is_empty(&self) -> bool {
            self.len() == 0
        }
    }

    impl PushSink for VecPushSink {
        fn push(&self, name: &str, value: f64) {
            self.0.lock().unwrap().push(Sample {
                name: name.to_owned(),
                value,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_sink_records_in_order_and_drains() {
        let sink = VecPushSink::new();
        sink.push("a_ms", 1.0);
        sink.push("b_ms", 2.0);
        assert_eq!(sink.len(), 2);

        let drained = sink
            .drain()
            .into_iter()
            .map(|s| (s.name, s.value))
            .collect::<Vec<_>>();
        assert_eq!(drained, &[("a_ms".into(), 1.0), ("b_ms".into(), 2.0)]);
        assert!(sink.is_empty());

        sink.push("c_ms", 3.0);
        assert_eq!(sink.samples().len(), 1);
    }

    #[test]
    fn boxed_sink_shares_the_underlying_sink() {
        let sink = VecPushSink::new();
        let boxed = sink.clone().boxed();
        let alias = boxed.clone();
        boxed.push("x_secs", 0.25);
        alias.push("x_secs", 0.5);
        assert_eq!(sink.len(), 2);
        assert_eq!(format!("{boxed:?}"), "BoxPushSink");
    }

    #[test]
    fn dev_null_drops_samples() {
        let sink = DevNullSink::new().boxed();
        sink.push("ignored", 1.0);
    }
}

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Destinations for the samples timers push
//!
//! Any [`PushSink`] can receive a timer's samples. Besides the sinks from
//! [`laptime_core`], this module provides:
//! - [`TracingSink`], which logs every sample as a `tracing` event
//! - [`MetricsRsSink`] (feature `metrics-rs-024`), which records every sample into a
//!   [`metrics`](metrics_024) histogram

pub use laptime_core::global::{AlreadyAttached, AttachHandle, GlobalSink};
#[cfg(feature = "test-util")]
pub use laptime_core::sink::{Sample, VecPushSink};
pub use laptime_core::sink::{BoxPushSink, DevNullSink, PushSink};

/// A [`PushSink`] that emits every sample as an `INFO` event with target `laptime::sample`
#[derive(Copy, Clone, Debug, Default)]
pub struct TracingSink;

impl PushSink for TracingSink {
    fn push(&self, name: &str, value: f64) {
        tracing::info!(target: "laptime::sample", metric = name, value);
    }
}

/// A [`PushSink`] that records every sample into the `metrics` 0.24 histogram named
/// after the timer, using whichever recorder is installed.
///
/// This requires that the `metrics-rs-024` feature be enabled.
///
/// # Examples
/// ```
/// use laptime::{Timer, sink::MetricsRsSink, unit::Millisecond};
///
/// let timer: Timer<Millisecond> = Timer::builder("db_query").sink(MetricsRsSink).build();
/// timer.start();
/// timer.stop(); // recorded as histogram `db_query_ms`
/// ```
#[cfg(feature = "metrics-rs-024")]
#[derive(Copy, Clone, Debug, Default)]
pub struct MetricsRsSink;

#[cfg(feature = "metrics-rs-024")]
impl PushSink for MetricsRsSink {
    fn push(&self, name: &str, value: f64) {
        metrics_024::histogram!(name.to_owned()).record(value);
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use super::{PushSink, TracingSink};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn tracing_sink_logs_samples() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            TracingSink.push("render_ms", 16.5);
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("laptime::sample"), "{output}");
        assert!(output.contains("render_ms"), "{output}");
        assert!(output.contains("16.5"), "{output}");
    }
}

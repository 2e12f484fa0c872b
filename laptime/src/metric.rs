// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! The part every metric shares: a name, an optional aggregation window, and the sink
//! samples are pushed to.

use std::time::Duration;

use laptime_core::{BoxPushSink, PushSink};

/// Name, window and destination of a metric
///
/// The window is carried for the collector's benefit (it describes how long samples
/// should be aggregated over) and is not interpreted here.
#[derive(Debug, Clone)]
pub struct Metric {
    name: String,
    window: Option<Duration>,
    sink: BoxPushSink,
}

impl Metric {
    /// Create a new metric publishing to `sink`
    pub fn new(name: impl Into<String>, window: Option<Duration>, sink: BoxPushSink) -> Self {
        Self {
            name: name.into(),
            window,
            sink,
        }
    }

    /// Full name samples are published under
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Aggregation window requested at construction
    pub fn window(&self) -> Option<Duration> {
        self.window
    }

    /// Publish a sample. Delivery is best-effort; nothing is reported back.
    pub fn push(&self, value: f64) {
        tracing::trace!(metric = %self.name, value, "pushing sample");
        self.sink.push(&self.name, value);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use laptime_core::{PushSink, sink::VecPushSink};

    use super::Metric;

    #[test]
    fn push_uses_full_name() {
        let sink = VecPushSink::new();
        let metric = Metric::new(
            "queue_wait_ms",
            Some(Duration::from_secs(60)),
            sink.clone().boxed(),
        );
        metric.push(4.0);
        metric.push(6.0);

        let samples = sink.drain();
        assert_eq!(samples.len(), 2);
        assert!(samples.iter().all(|s| s.name == "queue_wait_ms"));
        assert_eq!(metric.window(), Some(Duration::from_secs(60)));
    }
}

// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

//! Contains [`GlobalSink`], a process-wide rendezvous point between timers and the
//! collector that receives their samples.
//!
//! Timers built without an explicit sink push to the [`GlobalSink`]. Whichever sink is
//! attached at the moment of the push receives the sample; with nothing attached the
//! sample is dropped.
//!
//! Note that there be dangers with globals. They're more difficult to test, and they create
//! implicit interfaces. Libraries *should* let their callers pass an explicit sink as well.

use std::{
    fmt,
    sync::{
        RwLock,
        atomic::{AtomicU64, Ordering},
    },
};

use crate::{BoxPushSink, PushSink};

struct Attached {
    id: u64,
    sink: BoxPushSink,
}

static ATTACHED: RwLock<Option<Attached>> = RwLock::new(None);
static NEXT_ATTACH_ID: AtomicU64 = AtomicU64::new(0);

/// A [`PushSink`] that forwards to the process-wide attached sink.
///
/// # Usage
/// ```
/// use laptime_core::{PushSink, global::GlobalSink, sink::VecPushSink};
///
/// let collector = VecPushSink::new();
/// let handle = GlobalSink::attach(collector.clone()).unwrap();
///
/// GlobalSink.push("fetch_secs", 0.25);
/// assert_eq!(collector.len(), 1);
///
/// drop(handle);
/// GlobalSink.push("fetch_secs", 0.5); // dropped, nothing attached
/// assert_eq!(collector.len(), 1);
/// ```
#[derive(Copy, Clone, Debug, Default)]
pub struct GlobalSink;

impl GlobalSink {
    /// Attach `sink` as the process-wide destination for samples.
    ///
    /// The sink stays attached until the returned [`AttachHandle`] is dropped (or
    /// [forgotten](AttachHandle::forget) for the rest of the process). Fails if another
    /// sink is already attached.
    pub fn attach(
        sink: impl PushSink + Send + Sync + 'static,
    ) -> Result<AttachHandle, AlreadyAttached> {
        let mut attached = ATTACHED.write().unwrap_or_else(|e| e.into_inner());
        if attached.is_some() {
            return Err(AlreadyAttached(()));
        }
        let id = NEXT_ATTACH_ID.fetch_add(1, Ordering::Relaxed);
        *attached = Some(Attached {
            id,
            sink: sink.boxed(),
        });
        tracing::debug!(attach_id = id, "attached global push sink");
        Ok(AttachHandle { id: Some(id) })
    }

    /// Whether a sink is currently attached
    pub fn is_attached() -> bool {
        ATTACHED
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }
}

impl PushSink for GlobalSink {
    fn push(&self, name: &str, value: f64) {
        // clone out of the lock so a slow sink doesn't hold up attach/detach
        let sink = ATTACHED
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map(|attached| attached.sink.clone());
        match sink {
            Some(sink) => sink.push(name, value),
            None => tracing::debug!(
                metric = name,
                value,
                "no global push sink attached, dropping sample"
            ),
        }
    }
}

/// Keeps a sink attached to [`GlobalSink`]; dropping it detaches the sink.
#[must_use = "dropping the handle detaches the sink immediately"]
#[derive(Debug)]
pub struct AttachHandle {
    id: Option<u64>,
}

impl AttachHandle {
    /// Leave the sink attached for the rest of the process
    pub fn forget(mut self) {
        self.id = None;
    }
}

impl Drop for AttachHandle {
    fn drop(&mut self) {
        let Some(id) = self.id else { return };
        let mut attached = ATTACHED.write().unwrap_or_else(|e| e.into_inner());
        if attached.as_ref().is_some_and(|a| a.id == id) {
            *attached = None;
            tracing::debug!(attach_id = id, "detached global push sink");
        }
    }
}

/// Returned by [`GlobalSink::attach`] when a sink is already attached
#[derive(Clone, PartialEq, Eq)]
pub struct AlreadyAttached(());

impl fmt::Debug for AlreadyAttached {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AlreadyAttached")
    }
}

impl fmt::Display for AlreadyAttached {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a global push sink is already attached")
    }
}

impl std::error::Error for AlreadyAttached {}

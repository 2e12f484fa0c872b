// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

use std::fmt;

/// Returned by [`Timer::value`](crate::Timer::value) when no measurement has completed yet.
///
/// This is not fatal: the caller can retry once a measurement has been taken.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct NoValue(());

impl NoValue {
    pub(crate) const fn new() -> Self {
        Self(())
    }
}

impl fmt::Debug for NoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NoValue")
    }
}

impl fmt::Display for NoValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("no value yet recorded")
    }
}

impl std::error::Error for NoValue {}

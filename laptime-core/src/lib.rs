// Copyright Amazon.com, Inc. or its affiliates. All Rights Reserved.
// SPDX-License-Identifier: Apache-2.0

#![deny(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod global;
pub mod sink;
pub mod unit;

pub use sink::{BoxPushSink, PushSink};
pub use unit::{TimeUnit, Unit};

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Batching log shipper.
//!
//! Log lines arrive one datagram at a time through the [`listener`], accumulate in a bounded
//! [`batch_buffer::BatchBuffer`], and leave as one JSON array per batch through a
//! [`sink::Sink`]. A batch is flushed when it fills up ([`shipper::LogShipper::append`]) or
//! when the [`interval_trigger::IntervalTrigger`] fires, whichever comes first, and each batch
//! is shipped exactly once.

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod batch;
pub mod batch_buffer;
pub mod config;
pub mod constants;
pub mod dispatcher;
pub mod errors;
pub mod http_sink;
pub mod interval_trigger;
pub mod listener;
pub mod shipper;
pub mod sink;

#[cfg(test)]
mod test_utils;

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Turns retired batches into exactly one sink call each.
//!
//! A generation moves through `FILLING -> SWAPPED -> DISPATCHING -> {DELIVERED | DROPPED}`.
//! The first two states belong to [`crate::batch_buffer::BatchBuffer`]; this module owns the
//! rest. Delivery is at-most-once: a failed generation is logged and dropped, never retried
//! and never put back into the buffer.

use std::fmt;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, trace};

use crate::batch::Batch;
use crate::constants::JSON_CONTENT_TYPE;
use crate::errors::ShippingError;
use crate::sink::Sink;

/// Terminal state of one generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationOutcome {
    Delivered,
    Dropped,
}

impl fmt::Display for GenerationOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Delivered => write!(f, "delivered"),
            Self::Dropped => write!(f, "dropped"),
        }
    }
}

/// Cheap to clone; every clone ships to the same sink.
#[derive(Clone)]
pub struct Dispatcher {
    sink: Arc<dyn Sink>,
}

impl Dispatcher {
    pub fn new(sink: Arc<dyn Sink>) -> Self {
        Dispatcher { sink }
    }

    /// Serializes `batch` and makes a single sink call with the result.
    pub async fn send(&self, batch: &Batch) -> Result<(), ShippingError> {
        let payload = batch
            .to_payload()
            .map_err(|e| ShippingError::Payload(e.to_string()))?;
        self.sink.send(payload, JSON_CONTENT_TYPE).await
    }

    /// Ships `batch` and logs how its generation ended.
    pub async fn dispatch(&self, batch: Batch) -> GenerationOutcome {
        let generation = batch.generation();
        let n_records = batch.len();
        trace!("Dispatching generation {generation} with {n_records} records");

        match self.send(&batch).await {
            Ok(()) => {
                debug!("Shipped generation {generation} with {n_records} records");
                GenerationOutcome::Delivered
            }
            Err(e) => {
                error!("Generation {generation} dropped, {n_records} records lost: {e}");
                GenerationOutcome::Dropped
            }
        }
    }

    /// Hands `batch` off to its own task so the caller never waits on the sink.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, batch: Batch) -> JoinHandle<GenerationOutcome> {
        let dispatcher = self.clone();
        tokio::spawn(async move { dispatcher.dispatch(batch).await })
    }
}

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Producer-facing handle over the batch buffer and the dispatcher.
//!
//! [`LogShipper`] is where both flush triggers meet: [`LogShipper::append`] is the capacity
//! trigger, and [`LogShipper::flush`] is what the interval trigger calls on every tick.

use std::num::NonZeroUsize;
use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::batch::Record;
use crate::batch_buffer::BatchBuffer;
use crate::dispatcher::{Dispatcher, GenerationOutcome};

/// Result of one append.
#[derive(Debug)]
pub enum Appended {
    /// The record joined the live batch.
    Buffered,
    /// The record filled the live batch, which was swapped out and handed to the dispatcher.
    Flushed(JoinHandle<GenerationOutcome>),
}

impl Appended {
    /// Whether this append fired the capacity trigger.
    #[must_use]
    pub fn triggered(&self) -> bool {
        matches!(self, Appended::Flushed(_))
    }
}

/// Cheap to clone; all clones share one buffer.
#[derive(Clone)]
pub struct LogShipper {
    buffer: Arc<BatchBuffer>,
    dispatcher: Dispatcher,
}

impl LogShipper {
    pub fn new(capacity: NonZeroUsize, dispatcher: Dispatcher) -> Self {
        LogShipper {
            buffer: Arc::new(BatchBuffer::new(capacity)),
            dispatcher,
        }
    }

    /// Adds one record. When it fills the batch, the batch is swapped out and its dispatch is
    /// spawned before this returns; the sink round-trip itself happens off the caller's path.
    pub fn append(&self, record: impl Into<Record>) -> Appended {
        match self.buffer.append(record.into()) {
            Some(batch) => Appended::Flushed(self.dispatcher.spawn(batch)),
            None => Appended::Buffered,
        }
    }

    /// Swaps out whatever is buffered and spawns its dispatch. Returns `None`, and makes no
    /// sink call, when the buffer is empty.
    pub fn flush(&self) -> Option<JoinHandle<GenerationOutcome>> {
        let batch = self.buffer.swap();
        if batch.is_empty() {
            return None;
        }
        Some(self.dispatcher.spawn(batch))
    }

    /// Records in the live batch right now.
    #[must_use]
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.buffer.capacity()
    }
}

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Records and the batches they are shipped in.
//!
//! A [`Batch`] is one generation of the live buffer. Once swapped out of the
//! [`crate::batch_buffer::BatchBuffer`] it is owned by exactly one dispatch and is only ever
//! read, turned into a payload, and dropped.

use std::borrow::Cow;

use serde::Serialize;

/// One log line as it came off the wire. No structure is assumed.
pub type Record = Vec<u8>;

#[derive(Debug, PartialEq, Eq)]
pub struct Batch {
    generation: u64,
    records: Vec<Record>,
}

// Wire form of a batch: a JSON array with one string per record.
#[derive(Serialize)]
#[serde(transparent)]
struct Payload<'a>(Vec<Cow<'a, str>>);

impl Batch {
    pub(crate) fn new(generation: u64, capacity: usize) -> Self {
        Batch {
            generation,
            records: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Generation number, used to correlate log lines about the same batch.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    #[must_use]
    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    /// Serializes the batch as a JSON array of strings, preserving record order.
    ///
    /// Records that are not valid UTF-8 are converted lossily: invalid sequences become
    /// U+FFFD rather than failing the whole batch.
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        let payload = Payload(
            self.records
                .iter()
                .map(|record| String::from_utf8_lossy(record))
                .collect(),
        );
        serde_json::to_vec(&payload)
    }
}

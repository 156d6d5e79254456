// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! The live batch and its two mutations: append and swap.
//!
//! All buffer state sits behind a single mutex. "Push, check the fill count, maybe swap" is
//! one critical section, and a bare swap is another, so a record is always in exactly one
//! generation and a batch is never observed holding more than `capacity` records.

use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::batch::{Batch, Record};
use crate::constants::MAX_BATCH_PREALLOCATION;

struct Live {
    batch: Batch,
    next_generation: u64,
}

pub struct BatchBuffer {
    capacity: NonZeroUsize,
    live: Mutex<Live>,
}

impl BatchBuffer {
    #[must_use]
    pub fn new(capacity: NonZeroUsize) -> Self {
        BatchBuffer {
            capacity,
            live: Mutex::new(Live {
                batch: Batch::new(0, preallocation(capacity)),
                next_generation: 1,
            }),
        }
    }

    /// Adds `record` to the live batch.
    ///
    /// If this fills the batch to capacity, the batch is retired in the same critical section
    /// and returned. Callers must dispatch it; the buffer forgets it.
    pub fn append(&self, record: Record) -> Option<Batch> {
        let mut live = self.lock();
        live.batch.push(record);
        if live.batch.len() >= self.capacity.get() {
            Some(self.retire(&mut live))
        } else {
            None
        }
    }

    /// Retires the live batch and installs an empty one.
    ///
    /// Swapping an empty buffer is a no-op: an empty batch comes back and the generation
    /// number does not advance.
    pub fn swap(&self) -> Batch {
        let mut live = self.lock();
        if live.batch.is_empty() {
            return Batch::new(live.batch.generation(), 0);
        }
        self.retire(&mut live)
    }

    /// Number of records in the live batch.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().batch.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().batch.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    fn retire(&self, live: &mut Live) -> Batch {
        let fresh = Batch::new(live.next_generation, preallocation(self.capacity));
        live.next_generation += 1;
        std::mem::replace(&mut live.batch, fresh)
    }

    // A panic while holding the lock can't leave the batch half-written (push and replace
    // are the only mutations), so a poisoned lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, Live> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn preallocation(capacity: NonZeroUsize) -> usize {
    capacity.get().min(MAX_BATCH_PREALLOCATION)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    fn buffer(capacity: usize) -> BatchBuffer {
        BatchBuffer::new(NonZeroUsize::new(capacity).unwrap())
    }

    fn record(s: &str) -> Record {
        s.as_bytes().to_vec()
    }

    #[test]
    fn test_swap_returns_appended_records_in_order() {
        let buffer = buffer(10);
        for r in ["first", "second", "third"] {
            assert!(buffer.append(record(r)).is_none());
        }

        let batch = buffer.swap();

        assert_eq!(
            batch.into_records(),
            vec![record("first"), record("second"), record("third")]
        );
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_records_after_swap_go_to_next_generation() {
        let buffer = buffer(10);
        buffer.append(record("old"));
        let first = buffer.swap();
        buffer.append(record("new"));
        let second = buffer.swap();

        assert_eq!(first.records(), &[record("old")]);
        assert_eq!(second.records(), &[record("new")]);
        assert!(second.generation() > first.generation());
    }

    #[test]
    fn test_append_at_capacity_retires_batch() {
        let buffer = buffer(3);
        assert!(buffer.append(record("a")).is_none());
        assert!(buffer.append(record("b")).is_none());

        let batch = buffer.append(record("c")).expect("third append should retire the batch");

        assert_eq!(batch.records(), &[record("a"), record("b"), record("c")]);
        assert!(buffer.is_empty());

        assert!(buffer.append(record("d")).is_none());
        assert_eq!(buffer.len(), 1);
    }

    #[test]
    fn test_capacity_of_one_retires_every_append() {
        let buffer = buffer(1);

        let first = buffer.append(record("a")).unwrap();
        let second = buffer.append(record("b")).unwrap();

        assert_eq!(first.records(), &[record("a")]);
        assert_eq!(second.records(), &[record("b")]);
        assert_eq!(second.generation(), first.generation() + 1);
    }

    #[test]
    fn test_swap_on_empty_buffer_is_noop() {
        let buffer = buffer(5);
        let before = buffer.swap();
        let after = buffer.swap();

        assert!(before.is_empty());
        assert!(after.is_empty());
        assert_eq!(before.generation(), after.generation());

        buffer.append(record("x"));
        assert_eq!(buffer.swap().generation(), before.generation());
    }

    #[test]
    fn test_empty_records_are_buffered() {
        let buffer = buffer(2);
        assert!(buffer.append(Vec::new()).is_none());

        let batch = buffer.append(Vec::new()).unwrap();

        assert_eq!(batch.len(), 2);
    }

    #[test]
    fn test_concurrent_appends_fill_exactly_one_batch() {
        let buffer = Arc::new(buffer(100));

        let handles: Vec<_> = (0..100)
            .map(|i| {
                let buffer = Arc::clone(&buffer);
                thread::spawn(move || buffer.append(record(&format!("log-{i}"))))
            })
            .collect();

        let retired: Vec<Batch> = handles
            .into_iter()
            .filter_map(|h| h.join().unwrap())
            .collect();

        assert_eq!(retired.len(), 1);
        let distinct: HashSet<Record> = retired[0].records().iter().cloned().collect();
        assert_eq!(retired[0].len(), 100);
        assert_eq!(distinct.len(), 100);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_concurrent_appends_and_swaps_lose_nothing() {
        let buffer = Arc::new(buffer(7));

        let producer = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                let mut retired = Vec::new();
                for i in 0..1000 {
                    if let Some(batch) = buffer.append(record(&i.to_string())) {
                        retired.push(batch);
                    }
                }
                retired
            })
        };
        let swapper = {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                (0..200)
                    .map(|_| buffer.swap())
                    .filter(|b| !b.is_empty())
                    .collect::<Vec<_>>()
            })
        };

        let mut batches = producer.join().unwrap();
        batches.extend(swapper.join().unwrap());
        batches.push(buffer.swap());

        let mut seen = HashSet::new();
        for batch in &batches {
            assert!(batch.len() <= 7);
            for r in batch.records() {
                assert!(seen.insert(r.clone()), "record appeared twice");
            }
        }
        assert_eq!(seen.len(), 1000);
    }

    proptest! {
        #[test]
        fn prop_buffer_never_exceeds_capacity_and_loses_nothing(
            capacity in 1usize..32,
            count in 0usize..200,
        ) {
            let buffer = buffer(capacity);
            let mut shipped: Vec<Record> = Vec::new();

            for i in 0..count {
                if let Some(batch) = buffer.append(i.to_le_bytes().to_vec()) {
                    prop_assert_eq!(batch.len(), capacity);
                    shipped.extend(batch.into_records());
                }
                prop_assert!(buffer.len() < capacity);
            }
            shipped.extend(buffer.swap().into_records());

            let expected: Vec<Record> = (0..count).map(|i| i.to_le_bytes().to_vec()).collect();
            prop_assert_eq!(shipped, expected);
            prop_assert!(buffer.is_empty());
        }
    }
}

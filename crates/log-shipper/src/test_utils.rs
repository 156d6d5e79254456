// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! In-memory sinks for unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tokio::sync::Notify;

use crate::errors::ShippingError;
use crate::sink::Sink;

fn decode(payload: &[u8]) -> Vec<String> {
    serde_json::from_slice(payload).expect("payload should be a JSON array of strings")
}

/// Accepts everything and remembers what it was sent.
#[derive(Default)]
pub(crate) struct RecordingSink {
    received: Mutex<Vec<(Vec<String>, &'static str)>>,
}

impl RecordingSink {
    pub(crate) fn batches(&self) -> Vec<Vec<String>> {
        let received = self.received.lock().unwrap();
        received.iter().map(|(batch, _)| batch.clone()).collect()
    }

    pub(crate) fn content_types(&self) -> Vec<&'static str> {
        let received = self.received.lock().unwrap();
        received.iter().map(|(_, content_type)| *content_type).collect()
    }

    /// Polls until at least `n` batches arrived or `deadline` passed.
    pub(crate) async fn wait_for_batches(&self, n: usize, deadline: Duration) -> bool {
        let wait = async {
            while self.batches().len() < n {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(deadline, wait).await.is_ok()
    }
}

#[async_trait]
impl Sink for RecordingSink {
    async fn send(
        &self,
        payload: Vec<u8>,
        content_type: &'static str,
    ) -> Result<(), ShippingError> {
        let batch = decode(&payload);
        self.received.lock().unwrap().push((batch, content_type));
        Ok(())
    }
}

/// Rejects everything with a 503, counting attempts.
#[derive(Default)]
pub(crate) struct FailingSink {
    attempts: AtomicUsize,
    payloads: Mutex<Vec<Vec<String>>>,
}

impl FailingSink {
    pub(crate) fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    pub(crate) fn payloads(&self) -> Vec<Vec<String>> {
        self.payloads.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sink for FailingSink {
    async fn send(
        &self,
        payload: Vec<u8>,
        _content_type: &'static str,
    ) -> Result<(), ShippingError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        self.payloads.lock().unwrap().push(decode(&payload));
        Err(ShippingError::Destination(
            Some(StatusCode::SERVICE_UNAVAILABLE),
            "log store unavailable".to_string(),
        ))
    }
}

/// Holds the first call until [`GatedSink::release`], then accepts everything at once.
#[derive(Default)]
pub(crate) struct GatedSink {
    calls: AtomicUsize,
    gate: Notify,
    delivered: RecordingSink,
}

impl GatedSink {
    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn release(&self) {
        self.gate.notify_one();
    }

    /// Batches whose call has returned, in completion order.
    pub(crate) fn delivered(&self) -> Vec<Vec<String>> {
        self.delivered.batches()
    }

    pub(crate) async fn wait_for_delivered(&self, n: usize, deadline: Duration) -> bool {
        self.delivered.wait_for_batches(n, deadline).await
    }

    pub(crate) async fn wait_for_calls(&self, n: usize, deadline: Duration) -> bool {
        let wait = async {
            while self.calls() < n {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(deadline, wait).await.is_ok()
    }
}

#[async_trait]
impl Sink for GatedSink {
    async fn send(
        &self,
        payload: Vec<u8>,
        content_type: &'static str,
    ) -> Result<(), ShippingError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == 0 {
            self.gate.notified().await;
        }
        self.delivered.send(payload, content_type).await
    }
}

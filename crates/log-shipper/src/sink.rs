// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;

use crate::errors::ShippingError;

/// Destination for serialized batches.
///
/// A sink is pure I/O: it receives an already-rendered payload and reports whether the
/// destination accepted it. It must not retry, buffer, or split the payload; one call is one
/// delivery attempt for one generation.
#[async_trait]
pub trait Sink: Send + Sync {
    async fn send(&self, payload: Vec<u8>, content_type: &'static str)
        -> Result<(), ShippingError>;
}

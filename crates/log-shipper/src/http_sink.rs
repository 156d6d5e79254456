// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! HTTP delivery of batch payloads to the log store.

use std::error::Error;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use tracing::debug;

use crate::errors::ShippingError;
use crate::sink::Sink;

pub struct HttpSinkConfig {
    pub url: Url,
    pub timeout: Duration,
    pub https_proxy: Option<String>,
}

/// Posts each payload to a single endpoint, e.g. an OpenSearch `<index>/_doc` URL.
#[derive(Debug, Clone)]
pub struct HttpSink {
    client: reqwest::Client,
    url: Url,
}

impl HttpSink {
    pub fn new(config: HttpSinkConfig) -> Result<Self, Box<dyn Error>> {
        let client = build_client(config.https_proxy.as_deref(), config.timeout)?;
        Ok(HttpSink {
            client,
            url: config.url,
        })
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }
}

/// Builds a reqwest client with optional proxy configuration and timeout.
fn build_client(
    proxy_url: Option<&str>,
    timeout: Duration,
) -> Result<reqwest::Client, Box<dyn Error>> {
    let mut builder = reqwest::Client::builder().use_rustls_tls().timeout(timeout);
    if let Some(proxy) = proxy_url {
        builder = builder.proxy(reqwest::Proxy::https(proxy)?);
    }
    Ok(builder.build()?)
}

#[async_trait]
impl Sink for HttpSink {
    async fn send(
        &self,
        payload: Vec<u8>,
        content_type: &'static str,
    ) -> Result<(), ShippingError> {
        let n_bytes = payload.len();
        let resp = self
            .client
            .post(self.url.clone())
            .header(CONTENT_TYPE, content_type)
            .body(payload)
            .send()
            .await
            .map_err(|e| ShippingError::Destination(e.status(), e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            debug!("Sink accepted {n_bytes} bytes with status {status}");
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        Err(ShippingError::Destination(Some(status), body))
    }
}

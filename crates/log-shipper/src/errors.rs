// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Error types for configuration loading and batch shipping.

use reqwest::StatusCode;

/// Errors raised while resolving [`crate::config::Config`] from the environment.
///
/// Every variant names the offending variable so the startup log line is enough to fix it.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} not set")]
    Missing(&'static str),

    #[error("failed to convert {key}={value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("{key}={value} exceeds the maximum of {max}")]
    TooLarge {
        key: &'static str,
        value: usize,
        max: usize,
    },
}

/// Why a batch never made it into the log store.
///
/// A shipping error always ends the generation: the batch is logged and dropped, never
/// retried.
#[derive(Debug, thiserror::Error)]
pub enum ShippingError {
    /// The batch could not be turned into a request body.
    #[error("failed to prepare payload: {0}")]
    Payload(String),

    /// The sink was unreachable or refused the payload.
    #[error("failed to ship payload ({status}): {1}", status = display_status(.0))]
    Destination(Option<StatusCode>, String),
}

fn display_status(status: &Option<StatusCode>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "no status".to_string(),
    }
}

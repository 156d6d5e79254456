// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Startup configuration, resolved once from environment variables.
//!
//! The port, batch size and sending period have no sensible default and must be set. Every
//! other setting falls back to a default when unset, but a value that is set and can't be
//! parsed is an error rather than a silent fallback.

use std::env;
use std::fmt::Display;
use std::num::NonZeroUsize;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;

use crate::constants::{
    DEFAULT_HOST, DEFAULT_READ_BUFFER_SIZE, DEFAULT_SINK_TIMEOUT, DEFAULT_SINK_URL,
    MAX_READ_BUFFER_SIZE,
};
use crate::errors::ConfigError;

pub const ENV_PORT: &str = "LOG_SHIPPER_PORT";
pub const ENV_BATCH_SIZE: &str = "LOG_SHIPPER_BATCH_SIZE";
pub const ENV_SENDING_PERIOD_SECS: &str = "LOG_SHIPPER_SENDING_PERIOD_SECS";
pub const ENV_HOST: &str = "LOG_SHIPPER_HOST";
pub const ENV_SINK_URL: &str = "LOG_SHIPPER_SINK_URL";
pub const ENV_SINK_TIMEOUT_SECS: &str = "LOG_SHIPPER_SINK_TIMEOUT_SECS";
pub const ENV_READ_BUFFER_SIZE: &str = "LOG_SHIPPER_READ_BUFFER_SIZE";
pub const ENV_PROXY_HTTPS: &str = "LOG_SHIPPER_PROXY_HTTPS";
pub const ENV_LOG_LEVEL: &str = "LOG_SHIPPER_LOG_LEVEL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// records per batch
    pub batch_capacity: NonZeroUsize,
    /// how often the interval trigger flushes
    pub sending_period: Duration,
    pub sink_url: Url,
    /// timeout for each sink request
    pub sink_timeout: Duration,
    pub read_buffer_size: usize,
    pub https_proxy: Option<String>,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn new() -> Result<Config, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key/value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = parse_required::<u16, _>(&lookup, ENV_PORT)?;
        let batch_capacity = NonZeroUsize::new(parse_required(&lookup, ENV_BATCH_SIZE)?)
            .ok_or(ConfigError::NotPositive(ENV_BATCH_SIZE))?;
        let sending_period = positive_secs(
            ENV_SENDING_PERIOD_SECS,
            parse_required(&lookup, ENV_SENDING_PERIOD_SECS)?,
        )?;

        let host = lookup(ENV_HOST).unwrap_or_else(|| DEFAULT_HOST.to_string());
        let sink_url = match lookup(ENV_SINK_URL) {
            Some(value) => parse_value(ENV_SINK_URL, value)?,
            None => parse_value(ENV_SINK_URL, DEFAULT_SINK_URL.to_string())?,
        };
        let sink_timeout = match parse_optional(&lookup, ENV_SINK_TIMEOUT_SECS)? {
            Some(secs) => positive_secs(ENV_SINK_TIMEOUT_SECS, secs)?,
            None => DEFAULT_SINK_TIMEOUT,
        };
        let read_buffer_size = match parse_optional::<usize, _>(&lookup, ENV_READ_BUFFER_SIZE)? {
            Some(0) => return Err(ConfigError::NotPositive(ENV_READ_BUFFER_SIZE)),
            Some(size) if size > MAX_READ_BUFFER_SIZE => {
                return Err(ConfigError::TooLarge {
                    key: ENV_READ_BUFFER_SIZE,
                    value: size,
                    max: MAX_READ_BUFFER_SIZE,
                })
            }
            Some(size) => size,
            None => DEFAULT_READ_BUFFER_SIZE,
        };
        let https_proxy = lookup(ENV_PROXY_HTTPS).or_else(|| lookup("HTTPS_PROXY"));

        Ok(Config {
            host,
            port,
            batch_capacity,
            sending_period,
            sink_url,
            sink_timeout,
            read_buffer_size,
            https_proxy,
        })
    }
}

fn parse_value<T>(key: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        })
}

fn parse_required<T, F>(lookup: &F, key: &'static str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).ok_or(ConfigError::Missing(key))?;
    parse_value(key, value)
}

fn parse_optional<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|value| parse_value(key, value)).transpose()
}

fn positive_secs(key: &'static str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::NotPositive(key));
    }
    Ok(Duration::from_secs(secs))
}

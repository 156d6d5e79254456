// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Content type of every payload handed to a sink.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Address the listener binds to when `LOG_SHIPPER_HOST` is unset.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Endpoint used when `LOG_SHIPPER_SINK_URL` is unset.
pub const DEFAULT_SINK_URL: &str = "http://localhost:9200/php-logs/_doc";

pub const DEFAULT_SINK_TIMEOUT: Duration = Duration::from_secs(5);

// Max bytes read from one datagram. Anything longer is truncated by the socket.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 8192;

/// Largest payload a UDP datagram can carry.
pub const MAX_READ_BUFFER_SIZE: usize = 65_535;

// Upper bound on the up-front allocation for a live batch, so a huge configured capacity
// doesn't reserve memory that is never filled.
pub(crate) const MAX_BATCH_PREALLOCATION: usize = 1024;

// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! UDP listener feeding log lines into the shipper.
//!
//! Each datagram is one record. The bytes are forwarded verbatim: no splitting, trimming or
//! validation happens here, and an empty datagram is an empty record.

use std::net::SocketAddr;

use tokio_util::sync::CancellationToken;
use tracing::{error, trace};

use crate::shipper::LogShipper;

/// Configuration for the UDP listener
pub struct ListenerConfig {
    /// Host to bind UDP socket to (e.g., "0.0.0.0")
    pub host: String,
    /// Port to bind UDP socket to, 0 picks a free port
    pub port: u16,
    /// Largest datagram read in one piece; longer ones are truncated by the socket
    pub read_buffer_size: usize,
}

// BufferReader abstracts where datagrams come from.
enum BufferReader {
    UdpSocket {
        socket: tokio::net::UdpSocket,
        read_buffer_size: usize,
    },

    /// Mirror reader for testing - replays a fixed datagram
    #[cfg(test)]
    MirrorTest(Vec<u8>, SocketAddr),
}

impl BufferReader {
    async fn read(&self) -> std::io::Result<(Vec<u8>, SocketAddr)> {
        match self {
            BufferReader::UdpSocket {
                socket,
                read_buffer_size,
            } => {
                let mut buf = vec![0; *read_buffer_size];
                let (amt, src) = socket.recv_from(&mut buf).await?;
                buf.truncate(amt);
                Ok((buf, src))
            }
            #[cfg(test)]
            BufferReader::MirrorTest(data, src) => Ok((data.clone(), *src)),
        }
    }
}

/// Receives datagrams and appends each one to the shipper.
pub struct LogListener {
    cancel_token: CancellationToken,
    shipper: LogShipper,
    buffer_reader: BufferReader,
}

impl LogListener {
    /// Binds the UDP socket described by `config`.
    pub async fn new(
        config: &ListenerConfig,
        shipper: LogShipper,
        cancel_token: CancellationToken,
    ) -> std::io::Result<LogListener> {
        let addr = format!("{}:{}", config.host, config.port);
        let socket = tokio::net::UdpSocket::bind(addr).await?;
        Ok(LogListener {
            cancel_token,
            shipper,
            buffer_reader: BufferReader::UdpSocket {
                socket,
                read_buffer_size: config.read_buffer_size,
            },
        })
    }

    /// Address the socket is actually bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        match &self.buffer_reader {
            BufferReader::UdpSocket { socket, .. } => socket.local_addr(),
            #[cfg(test)]
            BufferReader::MirrorTest(_, src) => Ok(*src),
        }
    }

    /// Main loop: receive and append records until the token is cancelled.
    pub async fn spin(self) {
        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => break,
                _ = self.consume_record() => {}
            }
        }
        trace!("Listener stopped");
    }

    /// Receives one datagram and appends it. Read errors are logged and skipped.
    async fn consume_record(&self) {
        let (buf, src) = match self.buffer_reader.read().await {
            Ok(read) => read,
            Err(e) => {
                error!("Data reading error: {e}");
                return;
            }
        };
        trace!(
            "New log from {src}: {}",
            String::from_utf8_lossy(&buf).trim_end()
        );
        if self.shipper.append(buf).triggered() {
            trace!("Batch full, flush dispatched");
        }
    }
}

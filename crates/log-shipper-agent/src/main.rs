// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::{env, process, sync::Arc};

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

use log_shipper::{
    config::{self, Config},
    dispatcher::Dispatcher,
    http_sink::{HttpSink, HttpSinkConfig},
    interval_trigger::IntervalTrigger,
    listener::{ListenerConfig, LogListener},
    shipper::LogShipper,
};

#[tokio::main]
pub async fn main() {
    let log_level = env::var(config::ENV_LOG_LEVEL)
        .map(|val| val.to_lowercase())
        .unwrap_or("info".to_string());

    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", log_level);

    let filter = match EnvFilter::try_new(env_filter) {
        Ok(filter) => filter,
        Err(e) => {
            eprintln!("could not parse log level in configuration: {e}");
            process::exit(1);
        }
    };
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("setting default subscriber failed: {e}");
        process::exit(1);
    }

    debug!("Logging subsystem enabled");

    let config = match Config::new() {
        Ok(c) => c,
        Err(e) => {
            error!("Error setting values: {e}");
            process::exit(1);
        }
    };

    let sink = match HttpSink::new(HttpSinkConfig {
        url: config.sink_url.clone(),
        timeout: config.sink_timeout,
        https_proxy: config.https_proxy.clone(),
    }) {
        Ok(sink) => sink,
        Err(e) => {
            error!("Error creating HTTP client for {}: {e}", config.sink_url);
            process::exit(1);
        }
    };

    let sink_url = sink.url().clone();
    let shipper = LogShipper::new(config.batch_capacity, Dispatcher::new(Arc::new(sink)));
    let cancel_token = CancellationToken::new();

    let listener = match LogListener::new(
        &ListenerConfig {
            host: config.host.clone(),
            port: config.port,
            read_buffer_size: config.read_buffer_size,
        },
        shipper.clone(),
        cancel_token.clone(),
    )
    .await
    {
        Ok(listener) => listener,
        Err(e) => {
            error!(
                "Error making connection on {}:{}: {e}",
                config.host, config.port
            );
            process::exit(1);
        }
    };

    tokio::spawn(
        IntervalTrigger::new(shipper.clone(), config.sending_period, cancel_token.clone()).run(),
    );

    match listener.local_addr() {
        Ok(addr) => info!("Waiting for logs on udp://{addr}"),
        Err(_) => info!("Waiting for logs on port {}", config.port),
    }
    info!(
        "Shipping batches of up to {} records every {:?} to {}",
        shipper.capacity(),
        config.sending_period,
        sink_url
    );

    let listener_task = tokio::spawn(listener.spin());

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Unable to listen for shutdown signal, running until killed: {e}");
        std::future::pending::<()>().await;
    }

    cancel_token.cancel();
    if let Err(e) = listener_task.await {
        error!("Listener task failed: {e}");
    }

    let pending = shipper.buffered();
    if pending > 0 {
        warn!("Shutting down with {pending} unsent records, they will not be shipped");
    }
    info!("Shutdown complete");
}

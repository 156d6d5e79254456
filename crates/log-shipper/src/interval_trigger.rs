// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Time-based flushing, independent of how fast records arrive.

use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use crate::shipper::LogShipper;

pub struct IntervalTrigger {
    shipper: LogShipper,
    sending_period: Duration,
    cancel_token: CancellationToken,
}

impl IntervalTrigger {
    pub fn new(
        shipper: LogShipper,
        sending_period: Duration,
        cancel_token: CancellationToken,
    ) -> Self {
        IntervalTrigger {
            shipper,
            sending_period,
            cancel_token,
        }
    }

    /// Flushes the buffer every `sending_period` until the token is cancelled.
    ///
    /// Dispatches are spawned, so a slow sink never delays the next tick. Cancelling does not
    /// drain: whatever is still buffered stays in the buffer and is lost at process exit.
    pub async fn run(self) {
        let mut ticker = interval(self.sending_period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await; // discard first tick, which is instantaneous

        loop {
            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    debug!(
                        "Interval trigger stopped with {} records still buffered",
                        self.shipper.buffered()
                    );
                    break;
                }
                _ = ticker.tick() => self.tick(),
            }
        }
    }

    fn tick(&self) {
        match self.shipper.flush() {
            Some(_) => trace!("Interval flush dispatched"),
            None => trace!("Interval flush skipped, buffer empty"),
        }
    }
}

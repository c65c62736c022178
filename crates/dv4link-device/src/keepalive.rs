use std::time::Duration;

use tracing::{debug, trace, warn};

use crate::commander::Commander;
use crate::config::{DeviceConfig, Mode, TxPower};
use crate::error::Result;
use crate::shutdown::ShutdownSignal;

/// Settings for the keepalive loop, taken from [`DeviceConfig`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct KeepaliveSettings {
    pub interval: Duration,
    pub watchdog_every: u32,
    pub mode: Mode,
    pub tx_power: TxPower,
}

impl From<&DeviceConfig> for KeepaliveSettings {
    fn from(config: &DeviceConfig) -> Self {
        Self {
            interval: config.keepalive_interval,
            watchdog_every: config.watchdog_every,
            mode: config.default_mode,
            tx_power: config.tx_power,
        }
    }
}

/// Tracks a run of consecutive failed tick sends.
///
/// Only the first failure of a run is logged at `warn`; the rest go to
/// `trace`. A successful send ends the run.
#[derive(Debug, Default)]
struct FailureStreak {
    failures: u64,
}

impl FailureStreak {
    fn observe(&mut self, request: &'static str, result: Result<()>) {
        match result {
            Ok(()) => {
                if self.failures > 0 {
                    debug!(failures = self.failures, "keepalive sends recovered");
                    self.failures = 0;
                }
            }
            Err(err) => {
                if self.failures == 0 {
                    warn!(error = %err, request, "keepalive send failed");
                } else {
                    trace!(
                        error = %err,
                        request,
                        failures = self.failures + 1,
                        "keepalive send failed"
                    );
                }
                self.failures += 1;
            }
        }
    }
}

/// Keep the firmware streaming receive data until `shutdown` fires.
///
/// Sets the mode and power once, then sends a receive request every tick
/// and a watchdog request every `watchdog_every` ticks. Send failures are
/// absorbed and the loop carries on; only the shutdown signal stops it.
pub(crate) fn run_keepalive(
    commands: Commander,
    shutdown: ShutdownSignal,
    settings: KeepaliveSettings,
) {
    debug!(
        interval_us = settings.interval.as_micros() as u64,
        watchdog_every = settings.watchdog_every,
        mode = %settings.mode,
        "keepalive loop started"
    );

    if let Err(err) = commands.set_mode(settings.mode) {
        warn!(error = %err, "failed to set initial mode");
    }
    if let Err(err) = commands.set_tx_power(i32::from(settings.tx_power.level())) {
        warn!(error = %err, "failed to set initial tx power");
    }

    let watchdog_every = settings.watchdog_every.max(1);
    let mut ticks = 0u32;
    let mut streak = FailureStreak::default();
    while !shutdown.wait_timeout(settings.interval) {
        streak.observe("receive", commands.request_receive());

        ticks += 1;
        if ticks >= watchdog_every {
            ticks = 0;
            trace!("watchdog tick");
            streak.observe("watchdog", commands.request_watchdog());
        }
    }

    debug!("keepalive loop stopped");
}

use std::sync::mpsc;

use dv4link_device::{Commander, Device, DeviceConfig, Frame, Mode, TxPower};
use tracing::{debug, info};

use crate::cmd::{resolve_payload, SendArgs};
use crate::exit::{device_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: SendArgs) -> CliResult<i32> {
    let payload = resolve_payload(args.data.as_deref(), args.hex.as_deref())?;
    let plan = SendPlan {
        frequency: args.frequency,
        mode: args.mode,
        power: args.power,
        flush: args.flush,
        payload,
    };
    if plan.is_empty() {
        return Err(CliError::new(
            USAGE,
            "nothing to send: give --frequency, --mode, --power, --flush, --data or --hex",
        ));
    }

    let power = match plan.power {
        Some(level) => {
            TxPower::new(i32::from(level)).map_err(|err| device_error("--power", err))?
        }
        None => DeviceConfig::default().tx_power,
    };
    let config = args
        .link
        .device_config(plan.mode.unwrap_or(Mode::Dmr), power);

    // Incoming frames are not shown by this command.
    let (tx, _rx) = mpsc::channel::<Frame>();
    let mut device = Device::open(&args.link.port, config, tx)
        .map_err(|err| device_error("open failed", err))?;

    let sent = plan.apply(device.commands());
    device.close();
    let sent = sent?;

    info!(port = %args.link.port, frames = sent, "send complete");
    Ok(SUCCESS)
}

/// Commands requested on the command line, in the order they are sent.
#[derive(Debug, Default)]
struct SendPlan {
    frequency: Option<u32>,
    mode: Option<Mode>,
    power: Option<u8>,
    flush: bool,
    payload: Option<Vec<u8>>,
}

impl SendPlan {
    fn is_empty(&self) -> bool {
        self.frequency.is_none()
            && self.mode.is_none()
            && self.power.is_none()
            && !self.flush
            && self.payload.is_none()
    }

    /// Send every requested command. Returns the number of frames sent.
    fn apply(&self, commands: &Commander) -> CliResult<usize> {
        let mut sent = 0usize;

        if let Some(hz) = self.frequency {
            commands
                .set_frequency(hz)
                .map_err(|err| device_error("set frequency failed", err))?;
            sent += 1;
        }
        if let Some(mode) = self.mode {
            commands
                .set_mode(mode)
                .map_err(|err| device_error("set mode failed", err))?;
            sent += 1;
        }
        if let Some(level) = self.power {
            commands
                .set_tx_power(i32::from(level))
                .map_err(|err| device_error("set power failed", err))?;
            sent += 1;
        }
        if self.flush {
            commands
                .flush()
                .map_err(|err| device_error("flush failed", err))?;
            sent += 1;
        }
        if let Some(payload) = &self.payload {
            debug!(len = payload.len(), "transmitting payload");
            commands
                .transmit(payload)
                .map_err(|err| device_error("transmit failed", err))?;
            sent += 1;
        }

        Ok(sent)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

    use dv4link_device::TransmitGate;
    use dv4link_frame::command::{FLUSH_TX, SET_FREQUENCY, SET_MODE, SET_TX_POWER, WRITE_TX};
    use dv4link_frame::FrameDecoder;

    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn sent_commands(capture: &Capture) -> Vec<u8> {
        let wire = capture.0.lock().unwrap().clone();
        FrameDecoder::new()
            .decode(&wire)
            .map(|frame| frame.command)
            .collect()
    }

    #[test]
    fn empty_plan_is_detected() {
        assert!(SendPlan::default().is_empty());
        let plan = SendPlan {
            flush: true,
            ..SendPlan::default()
        };
        assert!(!plan.is_empty());
    }

    #[test]
    fn plan_sends_in_fixed_order() {
        let capture = Capture::default();
        let commands = Commander::new(TransmitGate::new(capture.clone()));
        let plan = SendPlan {
            frequency: Some(438_000_000),
            mode: Some(Mode::Fusion),
            power: Some(3),
            flush: true,
            payload: Some(b"hello".to_vec()),
        };

        assert_eq!(plan.apply(&commands).unwrap(), 5);
        assert_eq!(
            sent_commands(&capture),
            vec![SET_FREQUENCY, SET_MODE, SET_TX_POWER, FLUSH_TX, WRITE_TX]
        );
    }

    #[test]
    fn oversized_payload_is_a_usage_error() {
        let capture = Capture::default();
        let commands = Commander::new(TransmitGate::new(capture.clone()));
        let plan = SendPlan {
            payload: Some(vec![0u8; 246]),
            ..SendPlan::default()
        };

        let err = plan.apply(&commands).unwrap_err();
        assert_eq!(err.code, USAGE);
        assert!(sent_commands(&capture).is_empty());
    }
}

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use dv4link_device::{Device, Frame, TxPower};
use tracing::info;

use crate::cmd::ListenArgs;
use crate::exit::{device_error, CliError, CliResult, FAILURE, INTERNAL, SUCCESS};
use crate::output::{print_frame, OutputFormat};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn run(args: ListenArgs, format: OutputFormat) -> CliResult<i32> {
    let power = TxPower::new(i32::from(args.power)).map_err(|err| device_error("--power", err))?;
    let config = args.link.device_config(args.mode, power);

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let (tx, rx) = mpsc::channel::<Frame>();
    let mut device = Device::open(&args.link.port, config, tx)
        .map_err(|err| device_error("open failed", err))?;

    if let Some(hz) = args.frequency {
        device
            .set_frequency(hz)
            .map_err(|err| device_error("set frequency failed", err))?;
    }
    info!(port = %args.link.port, mode = %args.mode, "listening");

    let mut printed = 0usize;
    while running.load(Ordering::SeqCst) {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(frame) => {
                print_frame(&frame, device.name(), format);
                printed = printed.saturating_add(1);
                if args.count.is_some_and(|count| printed >= count) {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) if device.is_running() => continue,
            Err(_) => {
                device.close();
                return Err(CliError::new(FAILURE, "receive loop stopped"));
            }
        }
    }

    device.close();
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

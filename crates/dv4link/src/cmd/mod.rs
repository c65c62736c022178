use std::time::Duration;

use clap::{Args, Subcommand};
use dv4link_device::{DeviceConfig, Mode, TxPower};
use dv4link_frame::command::is_known;
use dv4link_frame::{command_name, FrameConfig, SyncMode};
use dv4link_transport::{SerialConfig, DEFAULT_BAUD_RATE};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod encode;
pub mod listen;
pub mod ports;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List serial ports.
    Ports(PortsArgs),
    /// Open a modem and print received frames.
    Listen(ListenArgs),
    /// Apply settings and optionally transmit a payload.
    Send(SendArgs),
    /// Print the wire bytes of a frame without touching a device.
    Encode(EncodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Ports(args) => ports::run(args, format),
        Command::Listen(args) => listen::run(args, format),
        Command::Send(args) => send::run(args),
        Command::Encode(args) => encode::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

/// Serial line and background loop settings shared by device commands.
#[derive(Args, Debug)]
pub struct LinkArgs {
    /// Serial device, e.g. /dev/ttyACM0 or COM3.
    #[arg(env = "DV4LINK_PORT")]
    pub port: String,
    /// Baud rate.
    #[arg(long, env = "DV4LINK_BAUD", default_value_t = DEFAULT_BAUD_RATE)]
    pub baud: u32,
    /// Pause between keepalive ticks (e.g. 100us, 5ms, 1s).
    #[arg(long, default_value = "100us", value_parser = parse_duration)]
    pub keepalive_interval: Duration,
    /// Send a watchdog request every N keepalive ticks.
    #[arg(long, default_value_t = 10)]
    pub watchdog_every: u32,
    /// Drop the byte that breaks a partial preamble match instead of re-testing it.
    #[arg(long)]
    pub legacy_sync: bool,
}

impl LinkArgs {
    pub fn device_config(&self, mode: Mode, power: TxPower) -> DeviceConfig {
        DeviceConfig {
            serial: SerialConfig {
                baud_rate: self.baud,
                ..SerialConfig::default()
            },
            frame: FrameConfig {
                sync_mode: if self.legacy_sync {
                    SyncMode::DiscardMismatch
                } else {
                    SyncMode::Rescan
                },
                ..FrameConfig::default()
            },
            keepalive_interval: self.keepalive_interval,
            watchdog_every: self.watchdog_every,
            default_mode: mode,
            tx_power: power,
        }
    }
}

#[derive(Args, Debug)]
pub struct ListenArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Mode set when the device starts.
    #[arg(long, default_value = "dmr", value_parser = parse_mode)]
    pub mode: Mode,
    /// Transmit power set when the device starts (0-9).
    #[arg(long, default_value_t = 9, value_parser = parse_power)]
    pub power: u8,
    /// Tune to this frequency (Hz) before listening.
    #[arg(long)]
    pub frequency: Option<u32>,
    /// Exit after receiving N frames.
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub link: LinkArgs,
    /// Frequency in Hz.
    #[arg(long)]
    pub frequency: Option<u32>,
    /// Modulation mode: dstar, dmr, fusion, p25 or nxdn.
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<Mode>,
    /// Transmit power (0-9).
    #[arg(long, value_parser = parse_power)]
    pub power: Option<u8>,
    /// Discard the device transmit buffer before sending.
    #[arg(long)]
    pub flush: bool,
    /// Raw string payload to transmit.
    #[arg(long, conflicts_with = "hex")]
    pub data: Option<String>,
    /// Hex payload to transmit (e.g. "01 02 ff").
    #[arg(long, conflicts_with = "data")]
    pub hex: Option<String>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Command ID (decimal or 0x hex) or name such as set-mode.
    #[arg(value_parser = parse_command)]
    pub command: u8,
    /// Hex payload.
    #[arg(long, conflicts_with = "data")]
    pub hex: Option<String>,
    /// Raw string payload.
    #[arg(long, conflicts_with = "hex")]
    pub data: Option<String>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Resolve `--data` / `--hex` into payload bytes.
pub fn resolve_payload(data: Option<&str>, hex: Option<&str>) -> CliResult<Option<Vec<u8>>> {
    if let Some(data) = data {
        return Ok(Some(data.as_bytes().to_vec()));
    }
    if let Some(hex) = hex {
        return parse_hex(hex)
            .map(Some)
            .map_err(|err| CliError::new(USAGE, format!("--hex: {err}")));
    }
    Ok(None)
}

pub fn parse_mode(input: &str) -> Result<Mode, String> {
    input.parse::<Mode>().map_err(|err| err.to_string())
}

pub fn parse_power(input: &str) -> Result<u8, String> {
    let level: i32 = input
        .trim()
        .parse()
        .map_err(|_| format!("invalid power level: {input}"))?;
    TxPower::new(level)
        .map(TxPower::level)
        .map_err(|err| err.to_string())
}

pub fn parse_duration(input: &str) -> Result<Duration, String> {
    let input = input.trim();
    if input.is_empty() {
        return Err("duration must not be empty".to_string());
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("us") {
        (num, "us")
    } else if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "ms")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| format!("invalid duration value: {input}"))?;

    if value == 0 {
        return Err("duration must be greater than zero".to_string());
    }

    Ok(match unit {
        "us" => Duration::from_micros(value),
        "ms" => Duration::from_millis(value),
        _ => Duration::from_secs(value),
    })
}

/// Accepts `0102ff`, `01 02 ff` or `01:02:FF`.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let digits: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(&digits);

    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits: {input}"));
    }

    (0..digits.len())
        .step_by(2)
        .map(|i| {
            digits
                .get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| format!("invalid hex: {input}"))
        })
        .collect()
}

pub fn parse_command(input: &str) -> Result<u8, String> {
    let input = input.trim();
    if let Some(hex) = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
    {
        return u8::from_str_radix(hex, 16).map_err(|_| format!("invalid command id: {input}"));
    }
    if let Ok(id) = input.parse::<u8>() {
        return Ok(id);
    }

    let wanted = input.to_ascii_uppercase().replace('-', "_");
    (0..=u8::MAX)
        .find(|&id| is_known(id) && command_name(id) == wanted)
        .ok_or_else(|| format!("unknown command: {input}"))
}

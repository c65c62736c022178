use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use dv4link_frame::FrameConfig;
use dv4link_transport::SerialConfig;

use crate::error::DeviceError;

/// Modulation mode selected with the set-mode command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    DStar,
    Dmr,
    Fusion,
    P25,
    Nxdn,
}

impl Mode {
    /// All modes, in display order.
    pub const ALL: [Mode; 5] = [Mode::DStar, Mode::Dmr, Mode::Fusion, Mode::P25, Mode::Nxdn];

    /// The byte sent as the set-mode payload.
    pub fn code(self) -> u8 {
        match self {
            Mode::DStar => b'D',
            Mode::Dmr => b'M',
            Mode::Fusion => b'Y',
            Mode::P25 => b'P',
            Mode::Nxdn => b'N',
        }
    }

    /// Lowercase name accepted by [`Mode::from_str`].
    pub fn name(self) -> &'static str {
        match self {
            Mode::DStar => "dstar",
            Mode::Dmr => "dmr",
            Mode::Fusion => "fusion",
            Mode::P25 => "p25",
            Mode::Nxdn => "nxdn",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mode {
    type Err = DeviceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Mode::ALL
            .into_iter()
            .find(|mode| mode.name() == wanted)
            .ok_or_else(|| DeviceError::InvalidArgument(format!("unknown mode: {s}")))
    }
}

/// A transmit power level in the range the firmware accepts (0-9).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TxPower(u8);

impl TxPower {
    /// Lowest power level.
    pub const MIN: TxPower = TxPower(0);
    /// Highest power level.
    pub const MAX: TxPower = TxPower(9);

    /// Validate a power level.
    pub fn new(level: i32) -> Result<Self, DeviceError> {
        if (i32::from(Self::MIN.0)..=i32::from(Self::MAX.0)).contains(&level) {
            Ok(TxPower(level as u8))
        } else {
            Err(DeviceError::InvalidArgument(format!(
                "tx power {level} outside 0..=9"
            )))
        }
    }

    /// The byte sent as the set-power payload.
    pub fn level(self) -> u8 {
        self.0
    }
}

/// Configuration for an open device and its background loops.
#[derive(Debug, Clone)]
pub struct DeviceConfig {
    /// Serial line settings, used by [`crate::Device::open`].
    pub serial: SerialConfig,
    /// Receive-side framing settings (resync policy, read chunk size).
    pub frame: FrameConfig,
    /// Pause between keepalive ticks. Default: 100 µs.
    pub keepalive_interval: Duration,
    /// A watchdog request is sent every this many ticks. Default: 10.
    pub watchdog_every: u32,
    /// Mode set once when the keepalive loop starts. Default: DMR.
    pub default_mode: Mode,
    /// Power level set once when the keepalive loop starts. Default: max.
    pub tx_power: TxPower,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            frame: FrameConfig::default(),
            keepalive_interval: Duration::from_micros(100),
            watchdog_every: 10,
            default_mode: Mode::Dmr,
            tx_power: TxPower::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_codes() {
        assert_eq!(Mode::DStar.code(), b'D');
        assert_eq!(Mode::Dmr.code(), b'M');
        assert_eq!(Mode::Fusion.code(), b'Y');
        assert_eq!(Mode::P25.code(), b'P');
        assert_eq!(Mode::Nxdn.code(), b'N');
    }

    #[test]
    fn mode_parses_its_own_name() {
        for mode in Mode::ALL {
            assert_eq!(mode.to_string().parse::<Mode>().unwrap(), mode);
        }
        assert_eq!(" DMR ".parse::<Mode>().unwrap(), Mode::Dmr);
    }

    #[test]
    fn unknown_mode_is_invalid_argument() {
        let err = "am".parse::<Mode>().unwrap_err();
        assert!(matches!(err, DeviceError::InvalidArgument(_)));
    }

    #[test]
    fn tx_power_bounds() {
        assert!(TxPower::new(-1).is_err());
        assert!(TxPower::new(10).is_err());
        assert_eq!(TxPower::new(0).unwrap(), TxPower::MIN);
        assert_eq!(TxPower::new(9).unwrap(), TxPower::MAX);
        assert_eq!(TxPower::new(4).unwrap().level(), 4);
    }

    #[test]
    fn default_config() {
        let config = DeviceConfig::default();
        assert_eq!(config.keepalive_interval, Duration::from_micros(100));
        assert_eq!(config.watchdog_every, 10);
        assert_eq!(config.default_mode, Mode::Dmr);
        assert_eq!(config.tx_power, TxPower::MAX);
        assert_eq!(config.serial.baud_rate, 115_200);
    }
}

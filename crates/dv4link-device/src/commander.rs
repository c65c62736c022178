use std::sync::Arc;

use bytes::BufMut;
use dv4link_frame::command::{
    FLUSH_TX, GET_RX_DATA, GREEN_LED, SET_FREQUENCY, SET_MODE, SET_TX_POWER, VERSION, WATCHDOG,
    WRITE_TX,
};

use crate::config::{Mode, TxPower};
use crate::error::{DeviceError, Result};
use crate::gate::TransmitGate;

/// Largest payload accepted by the write-transmit-data command.
pub const MAX_TX_DATA: usize = 245;

/// The device command API.
///
/// Every call encodes one frame and sends it through the shared
/// [`TransmitGate`]. Success means the frame was written to the transport;
/// the firmware does not acknowledge commands. Cloning is cheap and all
/// clones share the same gate.
#[derive(Debug, Clone)]
pub struct Commander {
    gate: Arc<TransmitGate>,
}

impl Commander {
    /// Build a commander around a transmit gate.
    pub fn new(gate: TransmitGate) -> Self {
        Self {
            gate: Arc::new(gate),
        }
    }

    /// Tune receiver and transmitter to the same frequency, in Hz.
    pub fn set_frequency(&self, hz: u32) -> Result<()> {
        self.gate.send(SET_FREQUENCY, &frequency_payload(hz))
    }

    /// Select the modulation mode.
    pub fn set_mode(&self, mode: Mode) -> Result<()> {
        self.gate.send(SET_MODE, &[mode.code()])
    }

    /// Set transmit power, 0 (lowest) to 9 (highest).
    pub fn set_tx_power(&self, level: i32) -> Result<()> {
        let power = TxPower::new(level)?;
        self.gate.send(SET_TX_POWER, &[power.level()])
    }

    /// Ask the device for a watchdog status frame.
    pub fn request_watchdog(&self) -> Result<()> {
        self.gate.send(WATCHDOG, &[])
    }

    /// Ask the device for its buffered receive data.
    pub fn request_receive(&self) -> Result<()> {
        self.gate.send(GET_RX_DATA, &[])
    }

    /// Discard the device transmit buffer.
    pub fn flush(&self) -> Result<()> {
        self.gate.send(FLUSH_TX, &[])
    }

    /// Queue 1-245 bytes for transmission.
    pub fn transmit(&self, data: &[u8]) -> Result<()> {
        if data.is_empty() || data.len() > MAX_TX_DATA {
            return Err(DeviceError::InvalidArgument(format!(
                "transmit length {} outside 1..={MAX_TX_DATA}",
                data.len()
            )));
        }
        self.gate.send(WRITE_TX, data)
    }

    /// Switch the green LED on or off.
    pub fn set_green_led(&self, on: bool) -> Result<()> {
        self.gate.send(GREEN_LED, &[u8::from(on)])
    }

    /// Ask the device for its firmware version.
    pub fn request_version(&self) -> Result<()> {
        self.gate.send(VERSION, &[])
    }

    /// Send an arbitrary command, e.g. debug, set-seed or set-tx-buffer,
    /// whose payload layout is firmware specific.
    pub fn send_raw(&self, command: u8, payload: &[u8]) -> Result<()> {
        self.gate.send(command, payload)
    }

    pub(crate) fn gate(&self) -> &TransmitGate {
        &self.gate
    }
}

fn frequency_payload(hz: u32) -> [u8; 8] {
    let mut payload = [0u8; 8];
    let mut buf = &mut payload[..];
    buf.put_u32_le(hz);
    buf.put_u32_le(hz);
    payload
}

//! Command IDs understood by the modem firmware.
//!
//! The same ID space is used in both directions: the host sends a request
//! with a command ID and the device answers (when it answers at all) with a
//! frame carrying the same ID.

/// Set RX/TX frequency. Payload: LE u32 rx, LE u32 tx.
pub const SET_FREQUENCY: u8 = 1;

/// Set modulation mode. Payload: one mode code byte.
pub const SET_MODE: u8 = 2;

/// Discard the device transmit buffer. Empty payload.
pub const FLUSH_TX: u8 = 3;

/// Queue data for transmission. Payload: 1-245 bytes.
pub const WRITE_TX: u8 = 4;

/// Watchdog / liveness status request. Empty payload.
pub const WATCHDOG: u8 = 5;

/// Fetch buffered receive data. Empty payload.
pub const GET_RX_DATA: u8 = 7;

/// Green LED control. Payload: one byte.
pub const GREEN_LED: u8 = 8;

/// Set transmit power. Payload: one byte, 0-9.
pub const SET_TX_POWER: u8 = 9;

/// Firmware debug command.
pub const DEBUG: u8 = 10;

/// Set scrambler seed.
pub const SET_SEED: u8 = 17;

/// Firmware version request. Empty payload.
pub const VERSION: u8 = 18;

/// Set transmit buffer parameters.
pub const SET_TX_BUFFER: u8 = 19;

/// Returns a human-readable name for a command ID.
pub fn command_name(id: u8) -> &'static str {
    match id {
        SET_FREQUENCY => "SET_FREQUENCY",
        SET_MODE => "SET_MODE",
        FLUSH_TX => "FLUSH_TX",
        WRITE_TX => "WRITE_TX",
        WATCHDOG => "WATCHDOG",
        GET_RX_DATA => "GET_RX_DATA",
        GREEN_LED => "GREEN_LED",
        SET_TX_POWER => "SET_TX_POWER",
        DEBUG => "DEBUG",
        SET_SEED => "SET_SEED",
        VERSION => "VERSION",
        SET_TX_BUFFER => "SET_TX_BUFFER",
        _ => "UNKNOWN",
    }
}

/// Returns true if the firmware defines this command ID.
pub fn is_known(id: u8) -> bool {
    command_name(id) != "UNKNOWN"
}

use bytes::{BufMut, Bytes, BytesMut};

use crate::decoder::SyncMode;
use crate::error::{FrameError, Result};

/// Frame header: preamble (4) + command (1) + length (1) = 6 bytes.
pub const HEADER_SIZE: usize = 6;

/// Start-of-frame marker.
pub const PREAMBLE: [u8; 4] = [0x71, 0xFE, 0x39, 0x1D];

/// Largest payload the one-byte length field can describe.
pub const MAX_PAYLOAD: usize = u8::MAX as usize;

/// A decoded protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Command ID (see [`crate::command`]).
    pub command: u8,
    /// The message payload, 0-255 bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(command: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            command,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Encode this frame into a fresh buffer.
    pub fn to_bytes(&self) -> Result<Bytes> {
        let mut dst = BytesMut::with_capacity(self.wire_size());
        encode_frame(self.command, &self.payload, &mut dst)?;
        Ok(dst.freeze())
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────────────┬─────────┬─────────┬────────────────┐
/// │ Preamble (4B)  │ Command │ Length  │ Payload        │
/// │ 71 FE 39 1D    │ (1B)    │ (1B)    │ (Length bytes) │
/// └────────────────┴─────────┴─────────┴────────────────┘
/// ```
pub fn encode_frame(command: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(HEADER_SIZE + payload.len());
    dst.put_slice(&PREAMBLE);
    dst.put_u8(command);
    dst.put_u8(payload.len() as u8);
    dst.put_slice(payload);
    Ok(())
}

/// Default size of one transport read.
pub const DEFAULT_READ_CHUNK: usize = 256;

/// Configuration for frame readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// How the decoder resynchronizes after a preamble mismatch.
    pub sync_mode: SyncMode,
    /// Upper bound on the bytes pulled from the transport per read. Default: 256.
    pub read_chunk_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            sync_mode: SyncMode::default(),
            read_chunk_size: DEFAULT_READ_CHUNK,
        }
    }
}

//! `tokio_util` codec adapter for driving the link from an async runtime.

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::codec::{encode_frame, Frame};
use crate::decoder::{FrameDecoder, SyncMode};
use crate::error::FrameError;

/// Frame codec for `tokio_util::codec::{FramedRead, FramedWrite}`.
///
/// Decoding consumes the source buffer byte by byte, so a partial frame is
/// carried in the decoder state rather than left in the buffer.
#[derive(Debug, Clone, Default)]
pub struct Dv4Codec {
    decoder: FrameDecoder,
}

impl Dv4Codec {
    /// Create a codec with the default resynchronization policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with an explicit resynchronization policy.
    pub fn with_sync_mode(sync_mode: SyncMode) -> Self {
        Self {
            decoder: FrameDecoder::with_sync_mode(sync_mode),
        }
    }
}

impl Decoder for Dv4Codec {
    type Item = Frame;
    type Error = FrameError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Frame>, FrameError> {
        while src.has_remaining() {
            let byte = src.get_u8();
            if let Some(frame) = self.decoder.push(byte) {
                return Ok(Some(frame));
            }
        }
        Ok(None)
    }
}

impl Encoder<Frame> for Dv4Codec {
    type Error = FrameError;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), FrameError> {
        encode_frame(item.command, &item.payload, dst)
    }
}

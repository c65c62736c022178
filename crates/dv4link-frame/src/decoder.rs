//! Byte-at-a-time frame decoder.
//!
//! The modem sends frames on a link with no message boundaries, so the
//! decoder hunts for [`PREAMBLE`] and then reads command, length and payload.
//! Decoding is a pure function of the byte sequence: feeding a stream in one
//! call or one byte at a time yields the same frames.

use bytes::Bytes;

use crate::codec::{Frame, MAX_PAYLOAD, PREAMBLE};

/// What to do with a byte that breaks a partial preamble match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncMode {
    /// Re-test the breaking byte as the first preamble byte.
    ///
    /// The preamble has no prefix that is also a suffix, so this one extra
    /// comparison never misses a frame start.
    #[default]
    Rescan,
    /// Drop the breaking byte and restart the search at the next one.
    ///
    /// Matches the behaviour of the stock host software. A frame whose
    /// preamble directly follows a partial match is lost.
    DiscardMismatch,
}

/// Decoder position within a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeState {
    /// Matching preamble byte `k`.
    Sync(usize),
    /// Next byte is the command ID.
    Command,
    /// Next byte is the payload length.
    Length,
    /// Next byte is payload byte `i`.
    Payload(usize),
}

/// Preamble-synchronizing frame decoder.
#[derive(Debug, Clone)]
pub struct FrameDecoder {
    state: DecodeState,
    command: u8,
    length: u8,
    buf: [u8; MAX_PAYLOAD],
    sync_mode: SyncMode,
}

impl FrameDecoder {
    /// Create a decoder waiting for the first preamble byte.
    pub fn new() -> Self {
        Self::with_sync_mode(SyncMode::default())
    }

    /// Create a decoder with an explicit resynchronization policy.
    pub fn with_sync_mode(sync_mode: SyncMode) -> Self {
        Self {
            state: DecodeState::Sync(0),
            command: 0,
            length: 0,
            buf: [0; MAX_PAYLOAD],
            sync_mode,
        }
    }

    /// Advance the state machine by one byte.
    ///
    /// Returns the frame completed by `byte`, if any.
    pub fn push(&mut self, byte: u8) -> Option<Frame> {
        match self.state {
            DecodeState::Sync(k) => {
                self.state = if byte == PREAMBLE[k] {
                    if k + 1 == PREAMBLE.len() {
                        DecodeState::Command
                    } else {
                        DecodeState::Sync(k + 1)
                    }
                } else {
                    self.resync(byte)
                };
                None
            }
            DecodeState::Command => {
                self.command = byte;
                self.state = DecodeState::Length;
                None
            }
            DecodeState::Length => {
                self.length = byte;
                if byte == 0 {
                    self.state = DecodeState::Sync(0);
                    Some(Frame::new(self.command, Bytes::new()))
                } else {
                    self.state = DecodeState::Payload(0);
                    None
                }
            }
            DecodeState::Payload(i) => {
                self.buf[i] = byte;
                let length = usize::from(self.length);
                if i + 1 == length {
                    self.state = DecodeState::Sync(0);
                    Some(Frame::new(
                        self.command,
                        Bytes::copy_from_slice(&self.buf[..length]),
                    ))
                } else {
                    self.state = DecodeState::Payload(i + 1);
                    None
                }
            }
        }
    }

    /// Lazily decode the frames completed by `chunk`.
    ///
    /// Bytes are consumed as the iterator advances. Dropping the iterator
    /// early leaves the remaining bytes of `chunk` unread.
    pub fn decode<'a>(&'a mut self, chunk: &'a [u8]) -> DecodeIter<'a> {
        DecodeIter {
            decoder: self,
            bytes: chunk.iter(),
        }
    }

    /// Current state machine position.
    pub fn state(&self) -> DecodeState {
        self.state
    }

    /// True when the decoder is not inside a frame or a partial preamble.
    pub fn is_idle(&self) -> bool {
        self.state == DecodeState::Sync(0)
    }

    /// The resynchronization policy in use.
    pub fn sync_mode(&self) -> SyncMode {
        self.sync_mode
    }

    fn resync(&self, byte: u8) -> DecodeState {
        match self.sync_mode {
            SyncMode::Rescan if byte == PREAMBLE[0] => DecodeState::Sync(1),
            _ => DecodeState::Sync(0),
        }
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the frames completed by one input chunk.
pub struct DecodeIter<'a> {
    decoder: &'a mut FrameDecoder,
    bytes: std::slice::Iter<'a, u8>,
}

impl Iterator for DecodeIter<'_> {
    type Item = Frame;

    fn next(&mut self) -> Option<Frame> {
        for &byte in self.bytes.by_ref() {
            if let Some(frame) = self.decoder.push(byte) {
                return Some(frame);
            }
        }
        None
    }
}

//! Preamble-synchronized, length-prefixed framing for the DV4mini serial protocol.
//!
//! Every message on the wire is framed with:
//! - A 4-byte preamble (`71 FE 39 1D`) for stream synchronization
//! - A 1-byte command ID
//! - A 1-byte payload length (0-255)
//!
//! The decoder re-synchronizes on the preamble after noise, and yields the
//! same frames no matter how the incoming bytes are chunked.

#[cfg(feature = "async")]
pub mod async_codec;
pub mod codec;
pub mod command;
pub mod decoder;
pub mod error;
pub mod reader;
pub mod writer;

#[cfg(feature = "async")]
pub use async_codec::Dv4Codec;
pub use codec::{
    encode_frame, Frame, FrameConfig, DEFAULT_READ_CHUNK, HEADER_SIZE, MAX_PAYLOAD, PREAMBLE,
};
pub use command::command_name;
pub use decoder::{DecodeIter, DecodeState, FrameDecoder, SyncMode};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use writer::FrameWriter;

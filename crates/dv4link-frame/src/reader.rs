use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use tracing::trace;

use crate::codec::{Frame, FrameConfig};
use crate::decoder::FrameDecoder;
use crate::error::{FrameError, Result};

/// Reads complete frames from any `Read` stream.
///
/// Bytes are pulled in bounded chunks and pushed through a [`FrameDecoder`].
/// Frames completed by the same chunk are queued, so callers always get
/// whole frames, in wire order. The reader is also an unbounded
/// `Iterator<Item = Result<Frame>>` that ends when the stream closes.
pub struct FrameReader<T> {
    inner: T,
    decoder: FrameDecoder,
    chunk: Vec<u8>,
    ready: VecDeque<Frame>,
    config: FrameConfig,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            decoder: FrameDecoder::with_sync_mode(config.sync_mode),
            chunk: vec![0; config.read_chunk_size.max(1)],
            ready: VecDeque::new(),
            config,
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// `TimedOut` and `Interrupted` reads are retried. `WouldBlock` is not:
    /// over a non-blocking stream it is returned as `FrameError::Io`, which
    /// also ends the `Iterator` with that error. Use
    /// [`poll_frames`](Self::poll_frames) to treat it as idle instead.
    /// Returns `Err(FrameError::ConnectionClosed)` when the stream reports
    /// end-of-file.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return Ok(frame);
            }

            match self.inner.read(&mut self.chunk) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => self.absorb(n),
                Err(err) if matches!(err.kind(), ErrorKind::TimedOut | ErrorKind::Interrupted) => {
                    continue
                }
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Perform at most one read and hand every completed frame to `sink`.
    ///
    /// Frames left over from an earlier [`read_frame`](Self::read_frame)
    /// are delivered first. A read that times out, would block or is
    /// interrupted counts as zero bytes. Returns the number of bytes read.
    /// `Ok(0)` from the stream is end-of-file, reported as
    /// `FrameError::ConnectionClosed`.
    pub fn poll_frames(&mut self, mut sink: impl FnMut(Frame)) -> Result<usize> {
        while let Some(frame) = self.ready.pop_front() {
            sink(frame);
        }

        let read = match self.inner.read(&mut self.chunk) {
            Ok(0) => return Err(FrameError::ConnectionClosed),
            Ok(n) => n,
            Err(err) if is_idle_error(err.kind()) => return Ok(0),
            Err(err) => return Err(FrameError::Io(err)),
        };

        trace!(bytes = read, "received chunk");
        for frame in self.decoder.decode(&self.chunk[..read]) {
            sink(frame);
        }
        Ok(read)
    }

    fn absorb(&mut self, read: usize) {
        trace!(bytes = read, "received chunk");
        self.ready.extend(self.decoder.decode(&self.chunk[..read]));
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    ///
    /// Any partially decoded frame is discarded.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_frame() {
            Ok(frame) => Some(Ok(frame)),
            Err(FrameError::ConnectionClosed) => None,
            Err(err) => Some(Err(err)),
        }
    }
}

fn is_idle_error(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted
    )
}

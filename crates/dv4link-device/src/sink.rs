use std::sync::mpsc::{Sender, SyncSender};

use dv4link_frame::Frame;

/// Consumer of frames decoded by the receive loop.
///
/// `dispatch` runs on the receive thread; a slow sink delays decoding of the
/// bytes that follow.
pub trait FrameSink: Send + 'static {
    fn dispatch(&mut self, frame: Frame);
}

impl<F> FrameSink for F
where
    F: FnMut(Frame) + Send + 'static,
{
    fn dispatch(&mut self, frame: Frame) {
        self(frame)
    }
}

/// Forwards frames to a channel. Frames are dropped once the receiver is gone.
impl FrameSink for Sender<Frame> {
    fn dispatch(&mut self, frame: Frame) {
        let _ = self.send(frame);
    }
}

/// Forwards frames to a bounded channel, blocking while it is full.
impl FrameSink for SyncSender<Frame> {
    fn dispatch(&mut self, frame: Frame) {
        let _ = self.send(frame);
    }
}

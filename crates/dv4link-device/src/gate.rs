use std::io::Write;
use std::sync::Mutex;

use dv4link_frame::{command_name, FrameWriter, MAX_PAYLOAD};
use tracing::debug;

use crate::error::{DeviceError, Result};

type BoxedWriter = FrameWriter<Box<dyn Write + Send>>;

/// Serializes frame writes onto the shared transport.
///
/// The whole frame is written while the lock is held, so frames sent from
/// different threads never interleave on the wire. Ordering between senders
/// is whatever order they acquire the lock in.
pub struct TransmitGate {
    writer: Mutex<Option<BoxedWriter>>,
}

impl TransmitGate {
    /// Wrap the transmit half of a transport.
    pub fn new<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let boxed: Box<dyn Write + Send> = Box::new(writer);
        Self {
            writer: Mutex::new(Some(FrameWriter::new(boxed))),
        }
    }

    /// Send one frame.
    ///
    /// Fails with [`DeviceError::Closed`] once the gate has been closed.
    pub fn send(&self, command: u8, payload: &[u8]) -> Result<()> {
        if payload.len() > MAX_PAYLOAD {
            return Err(DeviceError::InvalidArgument(format!(
                "payload of {} bytes exceeds {MAX_PAYLOAD}",
                payload.len()
            )));
        }

        let mut guard = self.writer.lock().map_err(|_| DeviceError::GatePoisoned)?;
        let writer = guard.as_mut().ok_or(DeviceError::Closed)?;
        debug!(
            command,
            name = command_name(command),
            len = payload.len(),
            "sending frame"
        );
        writer.send(command, payload)?;
        Ok(())
    }

    /// Drop the transmit half. Later sends fail with [`DeviceError::Closed`].
    ///
    /// Waits for an in-flight frame to finish. Returns false if the gate was
    /// already closed.
    pub fn close(&self) -> bool {
        match self.writer.lock() {
            Ok(mut guard) => guard.take().is_some(),
            Err(poisoned) => poisoned.into_inner().take().is_some(),
        }
    }

    /// True until [`close`](Self::close) is called.
    pub fn is_open(&self) -> bool {
        match self.writer.lock() {
            Ok(guard) => guard.is_some(),
            Err(poisoned) => poisoned.into_inner().is_some(),
        }
    }
}

impl std::fmt::Debug for TransmitGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransmitGate")
            .field("open", &self.is_open())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use dv4link_frame::{Frame, FrameDecoder, FrameError};

    use super::*;
    use crate::test_support::{BrokenWriter, RecordingWriter, TrickleWriter};

    #[test]
    fn send_writes_one_complete_frame() {
        let recorder = RecordingWriter::new();
        let gate = TransmitGate::new(recorder.clone());

        gate.send(2, &[0x01]).unwrap();

        assert_eq!(
            recorder.spans(),
            vec![vec![0x71u8, 0xFE, 0x39, 0x1D, 0x02, 0x01, 0x01]]
        );
    }

    #[test]
    fn oversized_payload_rejected_without_locking_up() {
        let recorder = RecordingWriter::new();
        let gate = TransmitGate::new(recorder.clone());

        let err = gate.send(4, &[0u8; 256]).unwrap_err();
        assert!(matches!(err, DeviceError::InvalidArgument(_)));

        gate.send(3, &[]).unwrap();
        assert_eq!(recorder.spans().len(), 1);
    }

    #[test]
    fn io_failure_is_reported_and_gate_stays_usable() {
        let broken = BrokenWriter::new();
        let gate = TransmitGate::new(broken.clone());

        let err = gate.send(5, &[]).unwrap_err();
        assert!(matches!(err, DeviceError::Frame(FrameError::Io(_))));

        broken.heal();
        gate.send(5, &[]).unwrap();
    }

    #[test]
    fn closed_gate_rejects_sends() {
        let recorder = RecordingWriter::new();
        let gate = TransmitGate::new(recorder.clone());

        assert!(gate.is_open());
        assert!(gate.close());
        assert!(!gate.close());
        assert!(!gate.is_open());

        let err = gate.send(5, &[]).unwrap_err();
        assert!(matches!(err, DeviceError::Closed));
        assert!(recorder.spans().is_empty());
    }

    #[test]
    fn concurrent_senders_write_whole_frames() {
        let recorder = RecordingWriter::new();
        let gate = Arc::new(TransmitGate::new(recorder.clone()));

        let senders: Vec<_> = (0..16u8)
            .map(|id| {
                let gate = Arc::clone(&gate);
                thread::spawn(move || {
                    for round in 0..20u8 {
                        let payload = vec![id; usize::from(round) + usize::from(id)];
                        gate.send(id, &payload).unwrap();
                    }
                })
            })
            .collect();
        for sender in senders {
            sender.join().unwrap();
        }

        let spans = recorder.spans();
        assert_eq!(spans.len(), 16 * 20);
        for span in &spans {
            let frames: Vec<Frame> = FrameDecoder::new().decode(span).collect();
            assert_eq!(frames.len(), 1);
            let frame = &frames[0];
            assert_eq!(frame.wire_size(), span.len());
            assert!(frame.payload.iter().all(|&b| b == frame.command));
        }
    }

    #[test]
    fn byte_by_byte_transport_never_interleaves() {
        let trickle = TrickleWriter::new();
        let gate = Arc::new(TransmitGate::new(trickle.clone()));

        let senders: Vec<_> = (1..=8u8)
            .map(|id| {
                let gate = Arc::clone(&gate);
                thread::spawn(move || {
                    for _ in 0..10 {
                        gate.send(id, &[id; 12]).unwrap();
                    }
                })
            })
            .collect();
        for sender in senders {
            sender.join().unwrap();
        }

        let wire = trickle.bytes();
        let frames: Vec<Frame> = FrameDecoder::new().decode(&wire).collect();
        assert_eq!(frames.len(), 80);
        assert_eq!(wire.len(), 80 * (6 + 12));
        for frame in frames {
            assert_eq!(frame.payload.as_ref(), &[frame.command; 12]);
        }
    }
}

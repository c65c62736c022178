//! In-memory transports for exercising the gate and the background loops.

use std::io::{self, ErrorKind, Read, Write};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use tracing::span::{Attributes, Id, Record};
use tracing::subscriber::Interest;
use tracing::{Event, Level, Metadata, Subscriber};

/// Records every `write` call as one span.
#[derive(Clone, Default)]
pub struct RecordingWriter {
    spans: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl RecordingWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spans(&self) -> Vec<Vec<u8>> {
        self.spans.lock().unwrap().clone()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.spans().concat()
    }
}

impl Write for RecordingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.spans.lock().unwrap().push(buf.to_vec());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Fails with `BrokenPipe` until healed.
#[derive(Clone)]
pub struct BrokenWriter {
    broken: Arc<AtomicBool>,
}

impl BrokenWriter {
    pub fn new() -> Self {
        Self {
            broken: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn heal(&self) {
        self.broken.store(false, Ordering::SeqCst);
    }
}

impl Write for BrokenWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(io::Error::from(ErrorKind::BrokenPipe));
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Accepts one byte per `write` call and yields between calls.
#[derive(Clone, Default)]
pub struct TrickleWriter {
    data: Arc<Mutex<Vec<u8>>>,
}

impl TrickleWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes(&self) -> Vec<u8> {
        self.data.lock().unwrap().clone()
    }
}

impl Write for TrickleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let Some(&byte) = buf.first() else {
            return Ok(0);
        };
        self.data.lock().unwrap().push(byte);
        thread::yield_now();
        Ok(1)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

enum Step {
    Data(Vec<u8>),
    Fail(ErrorKind),
}

/// Test-side handle feeding a [`ScriptedReader`].
#[derive(Clone)]
pub struct ReaderScript {
    tx: Sender<Step>,
    reads: Arc<AtomicUsize>,
}

impl ReaderScript {
    pub fn feed(&self, bytes: &[u8]) {
        let _ = self.tx.send(Step::Data(bytes.to_vec()));
    }

    pub fn fail(&self, kind: ErrorKind) {
        let _ = self.tx.send(Step::Fail(kind));
    }

    /// Number of `read` calls made so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

/// A reader that behaves like a serial port with a short read timeout.
///
/// With nothing queued it waits briefly and reports `TimedOut`.
pub struct ScriptedReader {
    rx: Receiver<Step>,
    pending: Vec<u8>,
    reads: Arc<AtomicUsize>,
}

impl Read for ScriptedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.reads.fetch_add(1, Ordering::SeqCst);

        if self.pending.is_empty() {
            match self.rx.recv_timeout(Duration::from_millis(5)) {
                Ok(Step::Data(bytes)) => self.pending = bytes,
                Ok(Step::Fail(kind)) => return Err(io::Error::from(kind)),
                Err(RecvTimeoutError::Timeout) => return Err(io::Error::from(ErrorKind::TimedOut)),
                Err(RecvTimeoutError::Disconnected) => {
                    thread::sleep(Duration::from_millis(5));
                    return Err(io::Error::from(ErrorKind::TimedOut));
                }
            }
        }

        let n = self.pending.len().min(buf.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

pub fn scripted_reader() -> (ReaderScript, ScriptedReader) {
    let (tx, rx) = mpsc::channel();
    let reads = Arc::new(AtomicUsize::new(0));
    (
        ReaderScript {
            tx,
            reads: Arc::clone(&reads),
        },
        ScriptedReader {
            rx,
            pending: Vec::new(),
            reads,
        },
    )
}

/// A subscriber that only counts events, by level.
///
/// Install it with `tracing::subscriber::with_default`; it sees events from
/// the current thread only.
#[derive(Clone, Default)]
pub struct EventCounter {
    warnings: Arc<AtomicUsize>,
    traces: Arc<AtomicUsize>,
}

impl EventCounter {
    pub fn warnings(&self) -> usize {
        self.warnings.load(Ordering::SeqCst)
    }

    pub fn traces(&self) -> usize {
        self.traces.load(Ordering::SeqCst)
    }
}

impl Subscriber for EventCounter {
    fn register_callsite(&self, _: &'static Metadata<'static>) -> Interest {
        Interest::sometimes()
    }

    fn enabled(&self, _: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, _: &Attributes<'_>) -> Id {
        Id::from_u64(1)
    }

    fn record(&self, _: &Id, _: &Record<'_>) {}

    fn record_follows_from(&self, _: &Id, _: &Id) {}

    fn event(&self, event: &Event<'_>) {
        let level = *event.metadata().level();
        if level == Level::WARN {
            self.warnings.fetch_add(1, Ordering::SeqCst);
        } else if level == Level::TRACE {
            self.traces.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn enter(&self, _: &Id) {}

    fn exit(&self, _: &Id) {}
}

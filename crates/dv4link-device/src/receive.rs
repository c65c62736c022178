use std::io::Read;

use dv4link_frame::{command_name, FrameReader};
use tracing::{debug, error};

use crate::shutdown::ShutdownSignal;
use crate::sink::FrameSink;

/// Pull bytes from the transport and dispatch decoded frames until
/// `shutdown` fires.
///
/// Read timeouts only give the loop a chance to look at the signal. Any
/// other read failure, end-of-stream included, ends the loop and fires the
/// signal so the keepalive loop stops too.
pub(crate) fn run_receive<R: Read>(
    mut reader: FrameReader<R>,
    mut sink: impl FrameSink,
    shutdown: ShutdownSignal,
) {
    debug!("receive loop started");

    while !shutdown.is_triggered() {
        let polled = reader.poll_frames(|frame| {
            debug!(
                command = frame.command,
                name = command_name(frame.command),
                len = frame.payload.len(),
                "received frame"
            );
            sink.dispatch(frame);
        });

        if let Err(err) = polled {
            error!(error = %err, "receive failed, stopping device loops");
            shutdown.trigger();
            break;
        }
    }

    debug!("receive loop stopped");
}

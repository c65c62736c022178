use dv4link_frame::Frame;

use crate::cmd::{resolve_payload, EncodeArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_wire, OutputFormat};

pub fn run(args: EncodeArgs, format: OutputFormat) -> CliResult<i32> {
    let payload =
        resolve_payload(args.data.as_deref(), args.hex.as_deref())?.unwrap_or_default();
    let payload_size = payload.len();
    let wire = Frame::new(args.command, payload)
        .to_bytes()
        .map_err(|err| frame_error("encode failed", err))?;
    print_wire(args.command, payload_size, &wire, format);
    Ok(SUCCESS)
}

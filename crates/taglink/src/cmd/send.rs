use taglink_frame::Frame;

use crate::cmd::{connect, parse_hex_payload, SendArgs};
use crate::exit::{client_error, frame_error, CliResult, SUCCESS};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let payload = parse_hex_payload(&args.data)?;
    let frame = Frame::new(args.connect.device, args.cmd, payload);
    // Encode before dialing so an oversized payload fails without a connect.
    let wire = frame
        .encode()
        .map_err(|err| frame_error("invalid frame", err))?;

    let mut client = connect(&args.connect)?;
    let reply = client
        .transact(&wire, args.connect.retries)
        .map_err(|err| client_error("send failed", err))?;

    print_reply(&reply, format);
    Ok(SUCCESS)
}

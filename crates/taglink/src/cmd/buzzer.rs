use taglink_client::commands;

use crate::cmd::{connect, BuzzerArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: BuzzerArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = connect(&args.connect)?;
    let reply = client
        .send_command(
            &commands::buzzer(args.connect.device, !args.off),
            args.connect.retries,
        )
        .map_err(|err| client_error("buzzer command failed", err))?;

    print_reply(&reply, format);
    Ok(SUCCESS)
}

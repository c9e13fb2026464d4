use taglink_client::{commands, RomVersion};

use crate::cmd::{connect, VersionArgs};
use crate::exit::{client_error, CliError, CliResult, DATA_INVALID, SUCCESS};
use crate::output::{hex_spaced, print_version, OutputFormat};

pub fn run(args: VersionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = connect(&args.connect)?;
    let reply = client
        .send_command(
            &commands::rom_version(args.connect.device),
            args.connect.retries,
        )
        .map_err(|err| client_error("version query failed", err))?;

    let version = RomVersion::parse(reply.payload.as_ref()).ok_or_else(|| {
        CliError::new(
            DATA_INVALID,
            format!(
                "unrecognized version reply: {}",
                hex_spaced(reply.payload.as_ref())
            ),
        )
    })?;

    print_version(&version, format);
    Ok(SUCCESS)
}

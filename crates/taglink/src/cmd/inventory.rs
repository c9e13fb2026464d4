use std::time::Duration;

use tracing::{debug, warn};

use taglink_client::{commands, tag_count, Client, ClientError, TagRead};
use taglink_transport::TcpLink;

use crate::cmd::{connect, parse_duration, InventoryArgs};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{hex_spaced, print_tags, OutputFormat, TagRecord};

pub fn run(args: InventoryArgs, format: OutputFormat) -> CliResult<i32> {
    let tag_timeout = parse_duration(&args.tag_timeout)?;
    let device = args.connect.device;
    let retries = args.connect.retries;
    let mut client = connect(&args.connect)?;

    client
        .send_command(&commands::command_mode(device), retries)
        .map_err(|err| client_error("command-mode setup failed", err))?;

    let mut tags = Vec::new();
    for pass in 1..=args.reads {
        for antenna in 0..args.antennas {
            client
                .send_command(&commands::select_antenna(device, antenna), retries)
                .map_err(|err| client_error("antenna select failed", err))?;

            collect_pass(
                &mut client,
                device,
                retries,
                antenna,
                pass,
                tag_timeout,
                &mut tags,
            )?;

            if !args.no_buzzer {
                client
                    .send_command(&commands::buzzer(device, true), retries)
                    .map_err(|err| client_error("buzzer failed", err))?;
            }
        }
    }

    print_tags(&tags, format);
    Ok(SUCCESS)
}

/// One Inventory2 exchange: the acknowledge announces how many tag frames
/// follow, then each arrives on its own.
fn collect_pass(
    client: &mut Client<TcpLink>,
    device: u8,
    retries: u32,
    antenna: u8,
    pass: u32,
    tag_timeout: Duration,
    tags: &mut Vec<TagRecord>,
) -> CliResult<()> {
    let ack = client
        .send_command(&commands::inventory2(device), retries)
        .map_err(|err| client_error("inventory failed", err))?;

    let Some(expected) = tag_count(ack.payload.as_ref()) else {
        debug!(reply = %hex_spaced(ack.raw.as_ref()), "inventory reply had no tag count");
        return Ok(());
    };
    debug!(expected, antenna, pass, "inventory acknowledged");

    for _ in 0..expected {
        let frame = match client.receive_only(tag_timeout) {
            Ok(frame) => frame,
            Err(ClientError::Timeout { .. }) => {
                warn!(antenna, pass, "announced tag frame never arrived");
                break;
            }
            Err(err) => return Err(client_error("tag read failed", err)),
        };

        match TagRead::parse(&frame) {
            Some(tag) => tags.push(TagRecord {
                antenna,
                pass,
                dsfid: tag.dsfid,
                uid: hex_spaced(&tag.uid_msb_first()),
            }),
            None => debug!(frame = %hex_spaced(frame.raw.as_ref()), "skipping non-tag frame"),
        }
    }

    Ok(())
}

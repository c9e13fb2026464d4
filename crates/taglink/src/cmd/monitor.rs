use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use taglink_client::ClientError;

use crate::cmd::{connect, parse_duration, MonitorArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS};
use crate::output::{print_reply, OutputFormat};

pub fn run(args: MonitorArgs, format: OutputFormat) -> CliResult<i32> {
    let idle_timeout = parse_duration(&args.idle_timeout)?;
    let mut client = connect(&args.connect)?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;

    while running.load(Ordering::SeqCst) {
        let frame = match client.receive_only(idle_timeout) {
            Ok(frame) => frame,
            Err(ClientError::Timeout { .. }) => continue,
            Err(err) => return Err(client_error("receive failed", err)),
        };

        print_reply(&frame, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
    }

    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}

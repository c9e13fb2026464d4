use std::time::Duration;

use clap::{Args, Subcommand};
use tracing::debug;

use taglink_client::{Client, ClientConfig, FrameTap, DEFAULT_PORT};
use taglink_transport::TcpLink;

use crate::exit::{client_error, CliError, CliResult, USAGE};
use crate::output::{hex_spaced, OutputFormat};
use crate::settings::{self, DeviceAddr};

pub mod buzzer;
pub mod inventory;
pub mod monitor;
pub mod send;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Query and print the reader's ROM version.
    Version(VersionArgs),
    /// Run inventory passes and print the tags seen.
    Inventory(InventoryArgs),
    /// Send a raw command frame and print the reply.
    Send(SendArgs),
    /// Print frames as the reader volunteers them.
    Monitor(MonitorArgs),
    /// Switch the reader's buzzer on or off.
    Buzzer(BuzzerArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Version(args) => version::run(args, format),
        Command::Inventory(args) => inventory::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Monitor(args) => monitor::run(args, format),
        Command::Buzzer(args) => buzzer::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    /// Device address as HOST[:PORT]. Defaults to the last stored address.
    #[arg(value_name = "ADDR")]
    pub addr: Option<String>,
    /// Receive timeout per reply attempt (e.g. 5s, 500ms).
    #[arg(long, default_value = "5s")]
    pub timeout: String,
    /// Connect timeout.
    #[arg(long, default_value = "5s")]
    pub connect_timeout: String,
    /// Resend attempts after a missed reply.
    #[arg(long, default_value_t = taglink_client::DEFAULT_RETRIES)]
    pub retries: u32,
    /// Device bus address byte (decimal or 0x-prefixed hex).
    #[arg(long, value_name = "BYTE", default_value = "0", value_parser = parse_byte)]
    pub device: u8,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
}

#[derive(Args, Debug)]
pub struct InventoryArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Inventory passes to run.
    #[arg(long, default_value_t = 1)]
    pub reads: u32,
    /// Antennas to cycle through on each pass.
    #[arg(long, default_value_t = 1)]
    pub antennas: u8,
    /// Skip the buzzer pulse after tags are seen.
    #[arg(long)]
    pub no_buzzer: bool,
    /// Receive timeout for each announced tag frame.
    #[arg(long, default_value = "2s")]
    pub tag_timeout: String,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Command byte (decimal or 0x-prefixed hex).
    #[arg(long, value_name = "BYTE", value_parser = parse_byte)]
    pub cmd: u8,
    /// Payload as hex digits; spaces are ignored.
    #[arg(long, value_name = "HEX", default_value = "")]
    pub data: String,
}

#[derive(Args, Debug)]
pub struct MonitorArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<usize>,
    /// How long to wait for each frame before checking for Ctrl-C.
    #[arg(long, default_value = "2s")]
    pub idle_timeout: String,
}

#[derive(Args, Debug)]
pub struct BuzzerArgs {
    #[command(flatten)]
    pub connect: ConnectArgs,
    /// Switch the buzzer off instead of on.
    #[arg(long)]
    pub off: bool,
}

/// Connect to the resolved device and remember the address for next time.
pub fn connect(args: &ConnectArgs) -> CliResult<Client<TcpLink>> {
    let target = resolve_target(args.addr.as_deref())?;
    let config = ClientConfig {
        connect_timeout: parse_duration(&args.connect_timeout)?,
        recv_timeout: parse_duration(&args.timeout)?,
    };
    let client = Client::connect(&target.host, target.port, config)
        .map_err(|err| client_error("connect failed", err))?
        .with_tap(Box::new(WireTrace));

    let mut stored = settings::load();
    if stored.device.as_ref() != Some(&target) {
        stored.device = Some(target);
        if let Err(err) = settings::store(&stored) {
            debug!(%err, "could not store device address");
        }
    }

    Ok(client)
}

fn resolve_target(addr: Option<&str>) -> CliResult<DeviceAddr> {
    if let Some(addr) = addr {
        return parse_addr(addr);
    }
    settings::load().device.ok_or_else(|| {
        CliError::new(
            USAGE,
            "no device address given and none stored from a previous run",
        )
    })
}

fn parse_addr(input: &str) -> CliResult<DeviceAddr> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "device address must not be empty"));
    }

    match input.rsplit_once(':') {
        Some((host, port)) if !host.is_empty() && !host.contains(':') => {
            let port: u16 = port
                .parse()
                .map_err(|_| CliError::new(USAGE, format!("invalid port in address: {input}")))?;
            Ok(DeviceAddr {
                host: host.to_string(),
                port,
            })
        }
        // Bare hostnames and IPv6 literals take the default port.
        _ => Ok(DeviceAddr {
            host: input.to_string(),
            port: DEFAULT_PORT,
        }),
    }
}

pub fn parse_byte(input: &str) -> Result<u8, String> {
    let input = input.trim();
    let parsed = if let Some(hex) = input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16)
    } else {
        input.parse()
    };
    parsed.map_err(|_| format!("invalid byte value: {input}"))
}

pub fn parse_hex_payload(input: &str) -> CliResult<Vec<u8>> {
    let digits: Vec<u8> = input
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| {
            c.to_digit(16)
                .map(|d| d as u8)
                .ok_or_else(|| CliError::new(USAGE, format!("invalid hex digit: {c}")))
        })
        .collect::<CliResult<_>>()?;

    if digits.len() % 2 != 0 {
        return Err(CliError::new(
            USAGE,
            "hex payload needs an even number of digits",
        ));
    }

    Ok(digits.chunks(2).map(|pair| (pair[0] << 4) | pair[1]).collect())
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        "s" => Ok(Duration::from_secs(value)),
        _ => Err(CliError::new(
            USAGE,
            format!("unsupported duration unit: {unit}"),
        )),
    }
}

struct WireTrace;

impl FrameTap for WireTrace {
    fn sent(&mut self, frame: &[u8]) {
        debug!(frame = %hex_spaced(frame), "tx");
    }

    fn received(&mut self, frame: &[u8]) {
        debug!(frame = %hex_spaced(frame), "rx");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_addr_splits_host_and_port() {
        let addr = parse_addr("10.0.0.5:4001").expect("address should parse");
        assert_eq!(addr.host, "10.0.0.5");
        assert_eq!(addr.port, 4001);
    }

    #[test]
    fn parse_addr_defaults_the_port() {
        let addr = parse_addr("reader.local").expect("address should parse");
        assert_eq!(addr.host, "reader.local");
        assert_eq!(addr.port, DEFAULT_PORT);
    }

    #[test]
    fn parse_addr_leaves_ipv6_literals_whole() {
        let addr = parse_addr("fe80::1").expect("address should parse");
        assert_eq!(addr.host, "fe80::1");
        assert_eq!(addr.port, DEFAULT_PORT);
    }

    #[test]
    fn parse_addr_rejects_bad_ports() {
        assert!(parse_addr("10.0.0.5:99999").is_err());
        assert!(parse_addr("10.0.0.5:").is_err());
        assert!(parse_addr("  ").is_err());
    }

    #[test]
    fn parse_byte_accepts_decimal_and_hex() {
        assert_eq!(parse_byte("0").unwrap(), 0);
        assert_eq!(parse_byte("66").unwrap(), 66);
        assert_eq!(parse_byte("0x4E").unwrap(), 0x4E);
        assert_eq!(parse_byte("0X9c").unwrap(), 0x9C);
        assert!(parse_byte("256").is_err());
        assert!(parse_byte("zz").is_err());
    }

    #[test]
    fn parse_hex_payload_ignores_spacing() {
        assert_eq!(
            parse_hex_payload("9C 01").expect("payload should parse"),
            vec![0x9C, 0x01]
        );
        assert_eq!(
            parse_hex_payload("f04001").expect("payload should parse"),
            vec![0xF0, 0x40, 0x01]
        );
        assert!(parse_hex_payload("").expect("empty is fine").is_empty());
    }

    #[test]
    fn parse_hex_payload_rejects_bad_input() {
        assert!(parse_hex_payload("9").is_err());
        assert!(parse_hex_payload("9G").is_err());
    }

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("0s").is_err());
        assert!(parse_duration("bad").is_err());
    }
}

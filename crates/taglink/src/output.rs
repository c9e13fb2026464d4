use std::io::{IsTerminal, Write};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use serde::Serialize;

use taglink_client::RomVersion;
use taglink_frame::Decoded;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

/// Uppercase hex with one space between bytes, the notation reader
/// manuals use for wire captures.
pub fn hex_spaced(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Serialize)]
struct ReplyOutput {
    command: String,
    device: u8,
    payload_size: usize,
    payload: String,
    frame: String,
}

pub fn print_reply(decoded: &Decoded, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = ReplyOutput {
                command: format!("0x{:02X}", decoded.command),
                device: decoded.address,
                payload_size: decoded.payload.len(),
                payload: hex_spaced(decoded.payload.as_ref()),
                frame: hex_spaced(decoded.raw.as_ref()),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COMMAND", "DEVICE", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    format!("0x{:02X}", decoded.command),
                    decoded.address.to_string(),
                    decoded.payload.len().to_string(),
                    hex_spaced(decoded.payload.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "command=0x{:02X} device={} size={} payload={}",
                decoded.command,
                decoded.address,
                decoded.payload.len(),
                hex_spaced(decoded.payload.as_ref())
            );
        }
        OutputFormat::Raw => {
            print_raw(decoded.raw.as_ref());
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

#[derive(Serialize)]
pub struct TagRecord {
    pub antenna: u8,
    pub pass: u32,
    pub dsfid: u8,
    pub uid: String,
}

#[derive(Serialize)]
struct InventoryOutput<'a> {
    count: usize,
    tags: &'a [TagRecord],
}

pub fn print_tags(tags: &[TagRecord], format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = InventoryOutput {
                count: tags.len(),
                tags,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["ANTENNA", "PASS", "DSFID", "UID"]);
            for tag in tags {
                table.add_row(vec![
                    tag.antenna.to_string(),
                    tag.pass.to_string(),
                    format!("0x{:02X}", tag.dsfid),
                    tag.uid.clone(),
                ]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for tag in tags {
                println!(
                    "antenna={} pass={} dsfid=0x{:02X} uid={}",
                    tag.antenna, tag.pass, tag.dsfid, tag.uid
                );
            }
            println!("{} tag(s)", tags.len());
        }
        OutputFormat::Raw => {
            for tag in tags {
                println!("{}", tag.uid);
            }
        }
    }
}

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: String,
    series: &'a str,
    code: &'a str,
    display: String,
}

pub fn print_version(version: &RomVersion, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = VersionOutput {
                version: format!("{}.{:02}.{}", version.major, version.minor, version.patch),
                series: &version.series,
                code: &version.code,
                display: version.to_string(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["VERSION", "SERIES", "CODE"])
                .add_row(vec![
                    format!("{}.{:02}.{}", version.major, version.minor, version.patch),
                    version.series.clone(),
                    version.code.clone(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty | OutputFormat::Raw => {
            println!("{version}");
        }
    }
}

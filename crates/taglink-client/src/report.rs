//! Interpretation of reply payloads.
//!
//! All parsers here are shape checks: they return `None` when the input is
//! not the kind of reply they understand, and never panic on malformed
//! payloads.

use std::fmt;

use taglink_frame::Decoded;

use crate::commands::{CMD_TAG_DATA, INVENTORY_WITH_UID, ROM_VERSION_ADDR};

/// Firmware identity reported by the ROM version query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
    /// Three-character product series.
    pub series: String,
    /// Two-character model code.
    pub code: String,
}

impl RomVersion {
    /// Parse a ROM version reply payload.
    ///
    /// The payload echoes the ROM address, then carries ASCII digits for
    /// major, minor (two digits), and patch, followed by the series and
    /// model code characters. Returns `None` for anything else.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        if payload.len() < 10 || payload[0] != ROM_VERSION_ADDR {
            return None;
        }
        let digit = |b: u8| if b.is_ascii_digit() { b - b'0' } else { 0 };
        Some(Self {
            major: digit(payload[1]),
            minor: digit(payload[2]) * 10 + digit(payload[3]),
            patch: digit(payload[4]),
            series: String::from_utf8_lossy(&payload[5..8]).into_owned(),
            code: String::from_utf8_lossy(&payload[8..10]).into_owned(),
        })
    }
}

impl fmt::Display for RomVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{:02}.{} {}{}",
            self.major, self.minor, self.patch, self.series, self.code
        )
    }
}

/// Number of tag frames announced by an inventory acknowledge.
///
/// The acknowledge payload is exactly `[0xF0, n]`; each of the `n` tags is
/// then reported in its own follow-up frame.
pub fn tag_count(payload: &[u8]) -> Option<usize> {
    match payload {
        [INVENTORY_WITH_UID, n] => Some(usize::from(*n)),
        _ => None,
    }
}

/// A single tag reported after an inventory round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRead {
    /// Data storage format identifier.
    pub dsfid: u8,
    /// UID as transmitted: least significant byte first.
    pub uid: [u8; 8],
}

impl TagRead {
    /// Parse a tag frame.
    ///
    /// Tag frames carry command [`CMD_TAG_DATA`] and exactly nine payload
    /// bytes: the DSFID followed by the 8-byte UID.
    pub fn parse(frame: &Decoded) -> Option<Self> {
        if frame.command != CMD_TAG_DATA || frame.payload.len() != 9 {
            return None;
        }
        let mut uid = [0u8; 8];
        uid.copy_from_slice(&frame.payload[1..9]);
        Some(Self {
            dsfid: frame.payload[0],
            uid,
        })
    }

    /// UID in display order: most significant byte first.
    pub fn uid_msb_first(&self) -> [u8; 8] {
        let mut uid = self.uid;
        uid.reverse();
        uid
    }
}

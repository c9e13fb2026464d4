//! Wire framing for STX/ETX-delimited RFID reader-writer protocols.
//!
//! Every frame on the wire is:
//! - A 1-byte STX start marker for stream synchronization
//! - Address, command, and payload-length bytes
//! - The payload (up to 255 bytes)
//! - ETX, a checksum over STX..ETX, and a CR terminator
//!
//! [`encode_frame`] builds outgoing frames; [`Parser`] recovers complete
//! frames from an arbitrarily chunked byte stream, silently dropping
//! corrupt data and rescanning for the next STX.

pub mod codec;
pub mod error;
pub mod parser;

pub use codec::{
    checksum, encode_frame, Frame, CR, ETX, FOOTER_SIZE, HEADER_SIZE, MAX_PAYLOAD, STX,
};
pub use error::{FrameError, Result};
pub use parser::{decode_frame, Decoded, Parser};

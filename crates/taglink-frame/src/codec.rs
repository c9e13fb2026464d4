use bytes::{BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Start-of-text marker opening every frame.
pub const STX: u8 = 0x02;
/// End-of-text marker closing the data section.
pub const ETX: u8 = 0x03;
/// Carriage return terminating every frame.
pub const CR: u8 = 0x0D;

/// Frame header: STX (1) + address (1) + command (1) + length (1) = 4 bytes.
pub const HEADER_SIZE: usize = 4;
/// Frame footer: ETX (1) + checksum (1) + CR (1) = 3 bytes.
pub const FOOTER_SIZE: usize = 3;
/// Maximum payload size: the length field is a single byte.
pub const MAX_PAYLOAD: usize = 255;

/// An outgoing command frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Device address (0x00 for a single directly attached unit).
    pub address: u8,
    /// Command opcode.
    pub command: u8,
    /// Command payload, at most [`MAX_PAYLOAD`] bytes.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(address: u8, command: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            address,
            command,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload + footer).
    pub fn wire_size(&self) -> usize {
        HEADER_SIZE + self.payload.len() + FOOTER_SIZE
    }

    /// Encode this frame into its wire representation.
    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = BytesMut::with_capacity(self.wire_size());
        encode_frame(self.address, self.command, self.payload.as_ref(), &mut buf)?;
        Ok(buf.freeze())
    }
}

/// Byte sum of `bytes` modulo 256.
///
/// The wire checksum covers STX through ETX inclusive; the checksum byte
/// itself and the trailing CR are excluded.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b))
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌──────┬──────┬──────┬──────┬─────────────┬──────┬──────┬──────┐
/// │ STX  │ ADDR │ CMD  │ LEN  │ DATA        │ ETX  │ SUM  │ CR   │
/// │ 0x02 │      │      │      │ (LEN bytes) │ 0x03 │      │ 0x0D │
/// └──────┴──────┴──────┴──────┴─────────────┴──────┴──────┴──────┘
/// ```
/// SUM is computed over the assembled STX..ETX prefix, so it always covers
/// exactly the bytes that go on the wire.
pub fn encode_frame(address: u8, command: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    let start = dst.len();
    dst.reserve(HEADER_SIZE + payload.len() + FOOTER_SIZE);
    dst.put_u8(STX);
    dst.put_u8(address);
    dst.put_u8(command);
    dst.put_u8(payload.len() as u8);
    dst.put_slice(payload);
    dst.put_u8(ETX);
    let sum = checksum(&dst[start..]);
    dst.put_u8(sum);
    dst.put_u8(CR);
    Ok(())
}

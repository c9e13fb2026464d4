use bytes::{BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::codec::{checksum, CR, ETX, FOOTER_SIZE, HEADER_SIZE, MAX_PAYLOAD, STX};
use crate::error::{FrameError, Result};

/// A complete frame recovered from the byte stream.
///
/// `payload` and `raw` are zero-copy slices of the same decode buffer, so
/// the structured fields always agree with the wire bytes they came from.
#[derive(Debug, Clone)]
pub struct Decoded {
    /// Device address carried in the frame header.
    pub address: u8,
    /// Command opcode echoed by the device.
    pub command: u8,
    /// Frame payload (the LEN bytes between header and footer).
    pub payload: Bytes,
    /// The complete frame exactly as received, STX through CR.
    pub raw: Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    SeekStx,
    Header,
    Body,
    Complete,
}

/// Streaming frame decoder.
///
/// Feed bytes with [`push`](Parser::push) in whatever chunking the transport
/// delivers; it returns `true` exactly when a complete, checksum-valid frame
/// is buffered. Malformed frames are dropped and scanning resumes at the
/// next STX, so line noise never surfaces as an error. [`resyncs`](Parser::resyncs)
/// counts how often that happened.
#[derive(Debug)]
pub struct Parser {
    state: State,
    buf: BytesMut,
    need: usize,
    resyncs: u64,
}

impl Parser {
    /// Create a parser scanning for the next STX.
    pub fn new() -> Self {
        Self {
            state: State::SeekStx,
            buf: BytesMut::with_capacity(HEADER_SIZE + MAX_PAYLOAD + FOOTER_SIZE),
            need: 0,
            resyncs: 0,
        }
    }

    /// Advance the decoder by one received byte.
    ///
    /// Returns `true` when the byte completed a valid frame; extract it with
    /// [`take`](Parser::take) or [`take_raw`](Parser::take_raw) before
    /// pushing further bytes. A byte pushed while a completed frame is still
    /// buffered discards that frame and is itself dropped.
    pub fn push(&mut self, byte: u8) -> bool {
        match self.state {
            State::SeekStx => {
                if byte == STX {
                    self.buf.clear();
                    self.buf.put_u8(byte);
                    self.need = HEADER_SIZE - 1;
                    self.state = State::Header;
                }
                false
            }
            State::Header => {
                self.buf.put_u8(byte);
                self.need -= 1;
                if self.need == 0 {
                    let len = usize::from(self.buf[3]);
                    self.need = len + FOOTER_SIZE;
                    self.state = State::Body;
                }
                false
            }
            State::Body => {
                self.buf.put_u8(byte);
                self.need -= 1;
                if self.need > 0 {
                    false
                } else if self.validate() {
                    self.state = State::Complete;
                    true
                } else {
                    self.resync();
                    false
                }
            }
            State::Complete => {
                // A completed frame was never taken; drop it and the stray byte.
                self.reset();
                false
            }
        }
    }

    /// Extract the completed frame in structured form.
    ///
    /// The parser returns to scanning for the next STX.
    pub fn take(&mut self) -> Result<Decoded> {
        if self.state != State::Complete {
            return Err(FrameError::NotReady);
        }
        let raw = self.buf.split().freeze();
        let len = usize::from(raw[3]);
        let decoded = Decoded {
            address: raw[1],
            command: raw[2],
            payload: raw.slice(HEADER_SIZE..HEADER_SIZE + len),
            raw,
        };
        self.need = 0;
        self.state = State::SeekStx;
        Ok(decoded)
    }

    /// Extract the completed frame as raw wire bytes, STX through CR.
    ///
    /// The parser returns to scanning for the next STX.
    pub fn take_raw(&mut self) -> Result<Bytes> {
        if self.state != State::Complete {
            return Err(FrameError::NotReady);
        }
        let raw = self.buf.split().freeze();
        self.need = 0;
        self.state = State::SeekStx;
        Ok(raw)
    }

    /// Discard any partial input and return to scanning for STX.
    pub fn reset(&mut self) {
        self.buf.clear();
        self.need = 0;
        self.state = State::SeekStx;
    }

    /// True when a complete frame is buffered and ready for extraction.
    pub fn is_complete(&self) -> bool {
        self.state == State::Complete
    }

    /// Number of malformed frames discarded since the parser was created.
    ///
    /// Monotonic; [`reset`](Parser::reset) does not clear it.
    pub fn resyncs(&self) -> u64 {
        self.resyncs
    }

    fn validate(&self) -> bool {
        let n = self.buf.len();
        n >= HEADER_SIZE + FOOTER_SIZE
            && self.buf[n - 1] == CR
            && self.buf[n - 3] == ETX
            && self.buf[n - 2] == checksum(&self.buf[..n - 2])
    }

    fn resync(&mut self) {
        self.resyncs += 1;
        trace!(
            discarded = self.buf.len(),
            resyncs = self.resyncs,
            "frame failed validation, rescanning for STX"
        );
        self.buf.clear();
        self.need = 0;
        self.state = State::SeekStx;
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

/// Decode a single frame from a byte buffer.
///
/// Convenience over [`Parser`] for callers that already hold the complete
/// frame. Leading garbage is skipped the same way the streaming parser
/// skips it.
pub fn decode_frame(src: &[u8]) -> Result<Decoded> {
    let mut parser = Parser::new();
    for &byte in src {
        if parser.push(byte) {
            return parser.take();
        }
    }
    Err(FrameError::Incomplete)
}

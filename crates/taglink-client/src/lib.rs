//! Transactional command client for STX/ETX-framed RFID reader-writers.
//!
//! [`Client`] owns one transport link and runs request/response exchanges
//! over it: [`Client::transact`] sends a frame and drives the stream parser
//! until the reply completes, resending on timeout within a retry budget;
//! [`Client::receive_only`] picks up follow-up frames that arrive without a
//! preceding send (tag reports after an inventory round).
//!
//! [`commands`] builds the standard command frames and [`report`] interprets
//! reply payloads.

pub mod client;
pub mod commands;
pub mod error;
pub mod report;

pub use client::{
    Client, ClientConfig, FrameTap, DEFAULT_CONNECT_TIMEOUT, DEFAULT_FOLLOWUP_TIMEOUT,
    DEFAULT_PORT, DEFAULT_RECV_TIMEOUT, DEFAULT_RETRIES,
};
pub use error::{ClientError, Result};
pub use report::{tag_count, RomVersion, TagRead};

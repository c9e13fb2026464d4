//! Blocking transport links to LAN-attached reader-writers.
//!
//! [`DeviceLink`] is the byte-level connection contract consumed by the
//! client layer. [`TcpLink`] is the standard implementation: a blocking TCP
//! stream with a bounded connect and a per-call receive timeout. The socket
//! is closed when the link is dropped.

pub mod error;
pub mod link;
pub mod tcp;

pub use error::{Result, TransportError};
pub use link::DeviceLink;
pub use tcp::TcpLink;

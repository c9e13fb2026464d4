use std::time::Duration;

use crate::error::Result;

/// A connected byte-stream link to a device.
///
/// Implementations are blocking: [`send`](DeviceLink::send) blocks until the
/// whole buffer is written, [`recv_byte`](DeviceLink::recv_byte) blocks until
/// a byte arrives or the configured receive timeout expires. One link serves
/// one connection; dropping the link closes it.
pub trait DeviceLink {
    /// Send every byte of `data`.
    fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive a single byte.
    ///
    /// Returns [`TransportError::RecvTimeout`](crate::TransportError::RecvTimeout)
    /// when no byte arrives within the configured timeout, and
    /// [`TransportError::Closed`](crate::TransportError::Closed) when the
    /// device shuts the connection down cleanly.
    fn recv_byte(&mut self) -> Result<u8>;

    /// Set the receive timeout for subsequent [`recv_byte`](DeviceLink::recv_byte)
    /// calls. `None` blocks indefinitely.
    fn set_recv_timeout(&mut self, timeout: Option<Duration>) -> Result<()>;
}

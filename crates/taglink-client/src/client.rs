use std::time::Duration;

use tracing::{debug, trace};

use taglink_frame::{Decoded, Frame, Parser};
use taglink_transport::{DeviceLink, TcpLink, TransportError};

use crate::error::{ClientError, Result};

/// Default TCP port reader-writers listen on.
pub const DEFAULT_PORT: u16 = 9004;
/// Default bound on TCP connect attempts.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
/// Default receive timeout for each transact attempt.
pub const DEFAULT_RECV_TIMEOUT: Duration = Duration::from_secs(5);
/// Default receive timeout for follow-up frames.
pub const DEFAULT_FOLLOWUP_TIMEOUT: Duration = Duration::from_secs(2);
/// Default transact retry budget.
pub const DEFAULT_RETRIES: u32 = 1;

/// Observation hook for wire traffic.
///
/// Install one with [`Client::with_tap`] to see every frame as sent and
/// every complete frame as received. The client itself never writes to the
/// console.
pub trait FrameTap {
    /// Called with the exact bytes of each outgoing frame.
    fn sent(&mut self, frame: &[u8]);
    /// Called with the raw bytes of each complete incoming frame.
    fn received(&mut self, frame: &[u8]);
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bound on TCP connect attempts.
    pub connect_timeout: Duration,
    /// Receive timeout for each [`Client::transact`] attempt.
    pub recv_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            recv_timeout: DEFAULT_RECV_TIMEOUT,
        }
    }
}

/// Transactional client over one device link.
///
/// The client exclusively owns its link; dropping the client closes the
/// connection. Transactions are strictly sequential, one exchange at a
/// time.
pub struct Client<L> {
    link: L,
    config: ClientConfig,
    tap: Option<Box<dyn FrameTap>>,
}

impl<L: DeviceLink> Client<L> {
    /// Create a client over an already connected link.
    pub fn new(link: L) -> Self {
        Self::with_config(link, ClientConfig::default())
    }

    /// Create a client with explicit configuration.
    pub fn with_config(link: L, config: ClientConfig) -> Self {
        Self {
            link,
            config,
            tap: None,
        }
    }

    /// Install a wire-traffic observation hook.
    pub fn with_tap(mut self, tap: Box<dyn FrameTap>) -> Self {
        self.tap = Some(tap);
        self
    }

    /// Send an encoded frame and wait for the device's reply.
    ///
    /// Bytes are received one at a time and fed to a parser until a frame
    /// completes. A receive timeout or a clean close consumes one retry:
    /// partial input is discarded and the frame is sent again. When the
    /// budget is exhausted the call fails with [`ClientError::Timeout`];
    /// any other transport error is fatal immediately.
    pub fn transact(&mut self, frame: &[u8], retries: u32) -> Result<Decoded> {
        self.link.set_recv_timeout(Some(self.config.recv_timeout))?;

        let mut attempts_left = retries;
        let mut parser = Parser::new();
        self.send_frame(frame)?;

        loop {
            match self.link.recv_byte() {
                Ok(byte) => {
                    if parser.push(byte) {
                        return self.finish_receive(&mut parser);
                    }
                }
                Err(TransportError::RecvTimeout | TransportError::Closed)
                    if attempts_left > 0 =>
                {
                    attempts_left -= 1;
                    debug!(attempts_left, "no reply, resending");
                    parser.reset();
                    self.send_frame(frame)?;
                }
                Err(TransportError::RecvTimeout | TransportError::Closed) => {
                    return Err(ClientError::Timeout {
                        attempts: retries + 1,
                        timeout: self.config.recv_timeout,
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Encode `frame` and run a [`transact`](Client::transact) exchange.
    pub fn send_command(&mut self, frame: &Frame, retries: u32) -> Result<Decoded> {
        let wire = frame.encode()?;
        self.transact(&wire, retries)
    }

    /// Wait for the next frame without sending anything.
    ///
    /// Used when a prior reply announced follow-up frames. A single receive
    /// timeout fails the call; there is no retry. A clean close surfaces as
    /// the transport error, since there is nothing to resend.
    pub fn receive_only(&mut self, timeout: Duration) -> Result<Decoded> {
        self.link.set_recv_timeout(Some(timeout))?;

        let mut parser = Parser::new();
        loop {
            match self.link.recv_byte() {
                Ok(byte) => {
                    if parser.push(byte) {
                        return self.finish_receive(&mut parser);
                    }
                }
                Err(TransportError::RecvTimeout) => {
                    return Err(ClientError::Timeout {
                        attempts: 1,
                        timeout,
                    });
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Borrow the underlying link.
    pub fn link(&self) -> &L {
        &self.link
    }

    /// Mutably borrow the underlying link.
    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Consume the client and return the link.
    pub fn into_link(self) -> L {
        self.link
    }

    /// Current client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn send_frame(&mut self, frame: &[u8]) -> Result<()> {
        self.link.send(frame)?;
        if let Some(tap) = self.tap.as_mut() {
            tap.sent(frame);
        }
        trace!(len = frame.len(), "frame sent");
        Ok(())
    }

    fn finish_receive(&mut self, parser: &mut Parser) -> Result<Decoded> {
        let decoded = parser.take()?;
        if let Some(tap) = self.tap.as_mut() {
            tap.received(decoded.raw.as_ref());
        }
        debug!(
            command = decoded.command,
            len = decoded.payload.len(),
            "frame received"
        );
        Ok(decoded)
    }
}

impl Client<TcpLink> {
    /// Connect to a device over TCP and wrap the link in a client.
    pub fn connect(host: &str, port: u16, config: ClientConfig) -> Result<Self> {
        let link = TcpLink::connect(host, port, config.connect_timeout)?;
        Ok(Self::with_config(link, config))
    }
}

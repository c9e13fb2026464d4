/// Errors that can occur on a device link.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to connect to the device.
    #[error("failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    /// No byte arrived within the receive timeout.
    #[error("receive timed out")]
    RecvTimeout,

    /// The device closed the connection.
    #[error("connection closed by device")]
    Closed,

    /// An I/O error occurred on the link.
    #[error("link I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TransportError>;

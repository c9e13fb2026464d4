use std::time::Duration;

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] taglink_frame::FrameError),

    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] taglink_transport::TransportError),

    /// No complete reply arrived within the retry budget.
    #[error("no reply after {attempts} attempt(s), receive timeout {timeout:?}")]
    Timeout { attempts: u32, timeout: Duration },
}

pub type Result<T> = std::result::Result<T, ClientError>;

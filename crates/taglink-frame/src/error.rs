/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The payload exceeds what the single length byte can carry.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// Frame extraction was attempted before a complete frame was parsed.
    #[error("no complete frame buffered")]
    NotReady,

    /// The input ended before a complete valid frame was found.
    #[error("input exhausted without a complete frame")]
    Incomplete,
}

pub type Result<T> = std::result::Result<T, FrameError>;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BildError {
    // Format errors
    #[error("Not a BILD file")]
    NotBildFile,
    #[error("Wrong BILD file version: found {found} but expected {expected}")]
    VersionMismatch { found: u16, expected: u16 },
    #[error("Invalid header")]
    InvalidHeader,
    #[error("Level header {level} does not match the channel geometry")]
    InconsistentLevelHeader { level: usize },
    #[error("Channel dimensions do not match the image header")]
    ChannelSizeMismatch,

    // Parameter errors
    #[error("Invalid quality {0}, expected 0..=7")]
    InvalidQuality(u32),
    #[error("Invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    // Decode errors
    #[error("Need more data")]
    NeedMoreData,
    #[error("Coded data truncated")]
    TruncatedData,
    #[error("Invalid data")]
    InvalidData,
    #[error("Overflow buffer exhausted")]
    OverflowExhausted,
    #[error("Overflow buffer not fully consumed")]
    OverflowNotConsumed,

    // Resource errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

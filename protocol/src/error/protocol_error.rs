use thiserror::Error;

/// Framing-level failures. Every variant except `Io` means the byte
/// stream position is unrecoverable: the caller must drop the
/// connection and reconnect, never retry the read in place.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid frame length: {0}")]
    InvalidLength(i32),

    #[error("Frame not terminated with two NUL bytes")]
    BadTerminator,

    #[error("Unknown packet type: {0}")]
    UnknownType(i32),

    #[error("Packet body too large: {0} bytes")]
    BodyTooLarge(usize),
}

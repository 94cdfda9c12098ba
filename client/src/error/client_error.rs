use protocol::ProtocolError;
use thiserror::Error;

/// The closed set of errors `execute` can surface. Calling layers map
/// these to status codes or retry decisions without inspecting wire
/// internals.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Malformed or oversized frame. Fatal to the connection; never
    /// retried in place because the stream position is unrecoverable.
    #[error("Framing error: {0}")]
    Framing(ProtocolError),

    /// Socket-level failure (reset, timeout, EOF). The session
    /// reconnects on next use.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The login handshake did not complete within its deadline.
    #[error("RCON handshake timed out")]
    HandshakeTimeout,

    /// The server rejected the password. Not retryable with the same
    /// credentials.
    #[error("Server rejected the RCON password")]
    InvalidCredentials,

    /// The command's response did not complete within the deadline.
    /// The server-side outcome is unknown, not "failed": callers must
    /// not assume the command had no effect.
    #[error("Command response did not complete within the deadline")]
    ExecTimeout,
}

impl ClientError {
    /// Whether a fresh attempt against the same server has a chance of
    /// succeeding without new credentials.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ClientError::Connection(_) | ClientError::HandshakeTimeout
        )
    }

    /// Whether the underlying connection must be torn down. Exec
    /// timeouts keep the session alive: the late response is dropped
    /// as a stray by the next call on the same session.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ClientError::Framing(_) | ClientError::Connection(_))
    }
}

impl From<ProtocolError> for ClientError {
    fn from(err: ProtocolError) -> Self {
        match err {
            ProtocolError::Io(io) => ClientError::Connection(io.to_string()),
            other => ClientError::Framing(other),
        }
    }
}

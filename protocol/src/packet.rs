use bytes::Bytes;

/// Largest body the client will put on the wire in a single frame.
/// Servers split longer responses across multiple frames themselves.
pub const MAX_BODY_LEN: usize = 4096;

/// Ceiling on a whole inbound frame (length prefix included). Anything
/// larger is a misbehaving peer, not a legitimate response.
pub const MAX_FRAME_LEN: usize = 8192;

/// Bytes following the length prefix that are not body: request id,
/// packet type, and the two NUL terminators.
pub const HEADER_LEN: usize = 10;

/// Request id the server substitutes into its auth response when the
/// password was rejected.
pub const AUTH_FAILURE_ID: i32 = -1;

/// RCON packet type discriminant.
///
/// The protocol reuses the value 2 for two meanings: client to server
/// it is a command execution request, server to client it is the auth
/// response. The overlap is part of the wire format and is
/// disambiguated by direction, so it is modeled as one variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum PacketType {
    /// Client -> server login request carrying the plaintext password.
    Login = 3,
    /// Client -> server command execution; server -> client auth response.
    Command = 2,
    /// Server -> client command output.
    Response = 0,
}

impl PacketType {
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            3 => Some(PacketType::Login),
            2 => Some(PacketType::Command),
            0 => Some(PacketType::Response),
            _ => None,
        }
    }

    pub fn raw(self) -> i32 {
        self as i32
    }
}

/// One decoded RCON frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub request_id: i32,
    pub packet_type: PacketType,
    pub body: Bytes,
}

impl Packet {
    pub fn new(request_id: i32, packet_type: PacketType, body: impl Into<Bytes>) -> Self {
        Self {
            request_id,
            packet_type,
            body: body.into(),
        }
    }

    /// Login request carrying the plaintext password as its body.
    pub fn login(request_id: i32, password: &str) -> Self {
        Self::new(request_id, PacketType::Login, password.as_bytes().to_vec())
    }

    /// Command execution request. An empty command is valid and is used
    /// as the completion sentinel for multi-frame responses.
    pub fn command(request_id: i32, command: &str) -> Self {
        Self::new(request_id, PacketType::Command, command.as_bytes().to_vec())
    }

    /// Server-side response frame, used by mock servers in tests.
    pub fn response(request_id: i32, body: impl Into<Bytes>) -> Self {
        Self::new(request_id, PacketType::Response, body)
    }

    /// Body interpreted as text. Command output is opaque text by
    /// contract; invalid UTF-8 is replaced rather than rejected.
    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

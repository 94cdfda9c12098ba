pub mod codec;
pub mod error;
pub mod packet;

pub use codec::RconCodec;
pub use error::{ProtocolError, Result};
pub use packet::{
    AUTH_FAILURE_ID, HEADER_LEN, MAX_BODY_LEN, MAX_FRAME_LEN, Packet, PacketType,
};

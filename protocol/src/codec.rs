use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::error::ProtocolError;
use crate::packet::{HEADER_LEN, MAX_BODY_LEN, MAX_FRAME_LEN, Packet, PacketType};

/// Codec for the RCON wire format:
///
/// ```text
/// [i32 length][i32 request_id][i32 type][body][0x00][0x00]
/// ```
///
/// All integers are little-endian. `length` counts every byte after the
/// length field itself, so `length == 10 + body.len()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RconCodec;

impl RconCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Encoder<Packet> for RconCodec {
    type Error = ProtocolError;

    fn encode(&mut self, item: Packet, dst: &mut BytesMut) -> Result<(), ProtocolError> {
        if item.body.len() > MAX_BODY_LEN {
            return Err(ProtocolError::BodyTooLarge(item.body.len()));
        }

        let length = HEADER_LEN + item.body.len();
        dst.reserve(4 + length);
        dst.put_i32_le(length as i32);
        dst.put_i32_le(item.request_id);
        dst.put_i32_le(item.packet_type.raw());
        dst.extend_from_slice(&item.body);
        dst.put_u8(0);
        dst.put_u8(0);
        Ok(())
    }
}

impl Decoder for RconCodec {
    type Item = Packet;
    type Error = ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Packet>, ProtocolError> {
        if src.len() < 4 {
            return Ok(None);
        }

        let length = i32::from_le_bytes(src[..4].try_into().unwrap());
        if length < HEADER_LEN as i32 || length as usize + 4 > MAX_FRAME_LEN {
            return Err(ProtocolError::InvalidLength(length));
        }

        let length = length as usize;
        if src.len() < 4 + length {
            src.reserve(4 + length - src.len());
            return Ok(None);
        }

        src.advance(4);
        let mut frame = src.split_to(length);

        let request_id = frame.get_i32_le();
        let raw_type = frame.get_i32_le();
        let packet_type =
            PacketType::from_raw(raw_type).ok_or(ProtocolError::UnknownType(raw_type))?;

        let body = frame.split_to(frame.len() - 2).freeze();
        if frame[0] != 0 || frame[1] != 0 {
            return Err(ProtocolError::BadTerminator);
        }

        Ok(Some(Packet {
            request_id,
            packet_type,
            body,
        }))
    }
}

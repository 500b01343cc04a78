use crate::error::WireError;
use byteorder::{BigEndian, ByteOrder};

pub const EAPOL_HEADER_SIZE: usize = 4;
pub const EAPOL_VERSION: u8 = 0x01;

/// Closed set of IEEE 802.1X EAPOL packet types. A value outside this
/// set is not an error at parse time (the header is still well-formed) but
/// makes the frame ineligible for dispatch; `EapolHeader::packet_type`
/// returns `None` in that case so the caller can log-and-drop.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EapolPacketType {
    EapPacket = 0,
    Start = 1,
    Logoff = 2,
    Key = 3,
    EncapsulatedAsfAlert = 4,
}

impl EapolPacketType {
    #[inline]
    pub fn from_u8(value: u8) -> Option<EapolPacketType> {
        match value {
            0 => Some(EapolPacketType::EapPacket),
            1 => Some(EapolPacketType::Start),
            2 => Some(EapolPacketType::Logoff),
            3 => Some(EapolPacketType::Key),
            4 => Some(EapolPacketType::EncapsulatedAsfAlert),
            _ => None,
        }
    }
}

impl From<EapolPacketType> for u8 {
    #[inline]
    fn from(t: EapolPacketType) -> u8 {
        t as u8
    }
}

/// `[version:1][type:1][body_length:2 BE]`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EapolHeader {
    pub version: u8,
    pub raw_packet_type: u8,
    pub body_length: u16,
}

impl EapolHeader {
    #[inline]
    pub fn parse(buf: &[u8]) -> Result<EapolHeader, WireError> {
        if buf.len() < EAPOL_HEADER_SIZE {
            return Err(WireError::TooShort {
                needed: EAPOL_HEADER_SIZE,
                available: buf.len(),
            });
        }

        Ok(EapolHeader {
            version: buf[0],
            raw_packet_type: buf[1],
            body_length: BigEndian::read_u16(&buf[2..4]),
        })
    }

    #[inline]
    pub fn write(&self, out: &mut [u8]) {
        out[0] = self.version;
        out[1] = self.raw_packet_type;
        BigEndian::write_u16(&mut out[2..4], self.body_length);
    }

    #[inline]
    pub fn packet_type(&self) -> Option<EapolPacketType> {
        EapolPacketType::from_u8(self.raw_packet_type)
    }

    #[inline]
    pub fn new(packet_type: EapolPacketType, body_length: u16) -> EapolHeader {
        EapolHeader {
            version: EAPOL_VERSION,
            raw_packet_type: packet_type.into(),
            body_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_too_short_is_invalid() {
        let buf = [0u8; 3];
        assert!(EapolHeader::parse(&buf).is_err());
    }

    #[test]
    fn start_with_zero_body_length_is_valid_type() {
        let header = EapolHeader::new(EapolPacketType::Start, 0);
        assert_eq!(header.packet_type(), Some(EapolPacketType::Start));
        assert_eq!(header.body_length, 0);
    }

    #[test]
    fn unknown_type_byte_has_no_packet_type() {
        let header = EapolHeader {
            version: EAPOL_VERSION,
            raw_packet_type: 200,
            body_length: 0,
        };
        assert_eq!(header.packet_type(), None);
    }

    #[test]
    fn roundtrip() {
        let header = EapolHeader::new(EapolPacketType::Key, 95);
        let mut buf = [0u8; EAPOL_HEADER_SIZE];
        header.write(&mut buf);
        assert_eq!(EapolHeader::parse(&buf).unwrap(), header);
    }
}

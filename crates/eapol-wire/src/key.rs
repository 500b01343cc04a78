use crate::error::WireError;
use bitfield::bitfield;
use byteorder::{BigEndian, ByteOrder};

/// First byte of a `Key`-typed EAPOL body, distinguishing the two descriptor
/// shapes this codec understands.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum KeyDescriptorType {
    Rc4 = 1,
    Ieee80211 = 2,
}

impl KeyDescriptorType {
    #[inline]
    fn from_u8(value: u8) -> Option<KeyDescriptorType> {
        match value {
            1 => Some(KeyDescriptorType::Rc4),
            2 => Some(KeyDescriptorType::Ieee80211),
            _ => None,
        }
    }
}

/// IEEE 802.1X-2001 RC4 key descriptor, fixed part only (44 bytes):
/// `type(1) key_length(2) replay_counter(8) iv(16) flags(1) signature(16)`.
pub const RC4_DESCRIPTOR_SIZE: usize = 1 + 2 + 8 + 16 + 1 + 16;

bitfield! {
    /// The single flags byte of an RC4 descriptor: top bit selects
    /// unicast/broadcast, low nibble carries the key index.
    #[derive(Copy, Clone, Eq, PartialEq)]
    pub struct Rc4Flags(u8);
    impl Debug;
    pub unicast, set_unicast: 7;
    pub index, set_index: 2, 0;
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Rc4KeyDescriptor<'a> {
    pub key_length: u16,
    pub replay_counter: [u8; 8],
    pub key_iv: [u8; 16],
    pub flags: Rc4Flags,
    pub key_signature: [u8; 16],
    pub key_material: &'a [u8],
}

impl<'a> Rc4KeyDescriptor<'a> {
    #[inline]
    pub fn parse(body: &'a [u8]) -> Result<Rc4KeyDescriptor<'a>, WireError> {
        if body.len() < RC4_DESCRIPTOR_SIZE {
            return Err(WireError::Truncated {
                declared: RC4_DESCRIPTOR_SIZE,
                available: body.len(),
            });
        }

        let mut replay_counter = [0u8; 8];
        replay_counter.copy_from_slice(&body[3..11]);
        let mut key_iv = [0u8; 16];
        key_iv.copy_from_slice(&body[11..27]);
        let mut key_signature = [0u8; 16];
        key_signature.copy_from_slice(&body[28..44]);

        Ok(Rc4KeyDescriptor {
            key_length: BigEndian::read_u16(&body[1..3]),
            replay_counter,
            key_iv,
            flags: Rc4Flags(body[27]),
            key_signature,
            key_material: &body[RC4_DESCRIPTOR_SIZE..],
        })
    }
}

/// IEEE 802.11i 4-way-handshake key descriptor, fixed part only (95 bytes).
pub const IEEE80211_DESCRIPTOR_SIZE: usize = 1 + 2 + 2 + 8 + 32 + 16 + 8 + 8 + 16 + 2;

bitfield! {
    /// The 16-bit key information field of an IEEE 802.11i descriptor.
    #[derive(Copy, Clone, Eq, PartialEq)]
    pub struct KeyInformation(u16);
    impl Debug;
    pub descriptor_version, set_descriptor_version: 2, 0;
    pub key_type, set_key_type: 3;
    pub key_index, set_key_index: 5, 4;
    pub install, set_install: 6;
    pub key_ack, set_key_ack: 7;
    pub key_mic, set_key_mic: 8;
    pub secure, set_secure: 9;
    pub error, set_error: 10;
    pub request, set_request: 11;
    pub encrypted_key_data, set_encrypted_key_data: 12;
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Ieee80211KeyDescriptor<'a> {
    pub key_information: KeyInformation,
    pub key_length: u16,
    pub replay_counter: [u8; 8],
    pub key_nonce: [u8; 32],
    pub key_iv: [u8; 16],
    pub key_rsc: [u8; 8],
    pub key_mic: [u8; 16],
    pub key_data: &'a [u8],
}

impl<'a> Ieee80211KeyDescriptor<'a> {
    #[inline]
    pub fn parse(body: &'a [u8]) -> Result<Ieee80211KeyDescriptor<'a>, WireError> {
        if body.len() < IEEE80211_DESCRIPTOR_SIZE {
            return Err(WireError::Truncated {
                declared: IEEE80211_DESCRIPTOR_SIZE,
                available: body.len(),
            });
        }

        let key_data_length = BigEndian::read_u16(&body[93..95]) as usize;
        let available_key_data = body.len() - IEEE80211_DESCRIPTOR_SIZE;
        if key_data_length > available_key_data {
            return Err(WireError::Truncated {
                declared: IEEE80211_DESCRIPTOR_SIZE + key_data_length,
                available: body.len(),
            });
        }

        let mut replay_counter = [0u8; 8];
        replay_counter.copy_from_slice(&body[5..13]);
        let mut key_nonce = [0u8; 32];
        key_nonce.copy_from_slice(&body[13..45]);
        let mut key_iv = [0u8; 16];
        key_iv.copy_from_slice(&body[45..61]);
        let mut key_rsc = [0u8; 8];
        key_rsc.copy_from_slice(&body[61..69]);
        // body[69..77] is the reserved field, intentionally unread.
        let mut key_mic = [0u8; 16];
        key_mic.copy_from_slice(&body[77..93]);

        Ok(Ieee80211KeyDescriptor {
            key_information: KeyInformation(BigEndian::read_u16(&body[1..3])),
            key_length: BigEndian::read_u16(&body[3..5]),
            replay_counter,
            key_nonce,
            key_iv,
            key_rsc,
            key_mic,
            key_data: &body[IEEE80211_DESCRIPTOR_SIZE..IEEE80211_DESCRIPTOR_SIZE + key_data_length],
        })
    }
}

/// Dispatches a `Key`-typed EAPOL body on its descriptor type byte.
/// Unknown descriptor types are invalid; both known variants are
/// validated for minimum/declared length here without keeping the parsed
/// descriptor around (the transport re-parses lazily when it actually needs
/// the fields).
pub(crate) fn validate_key_body(body: &[u8]) -> Result<(), WireError> {
    if body.is_empty() {
        return Err(WireError::Truncated {
            declared: 1,
            available: 0,
        });
    }

    match KeyDescriptorType::from_u8(body[0]) {
        Some(KeyDescriptorType::Rc4) => Rc4KeyDescriptor::parse(body).map(|_| ()),
        Some(KeyDescriptorType::Ieee80211) => Ieee80211KeyDescriptor::parse(body).map(|_| ()),
        None => Err(WireError::UnknownDescriptorType(body[0])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rc4_bytes(extra_key_material: usize) -> Vec<u8> {
        let mut buf = vec![0u8; RC4_DESCRIPTOR_SIZE + extra_key_material];
        buf[0] = KeyDescriptorType::Rc4 as u8;
        BigEndian::write_u16(&mut buf[1..3], 16);
        buf[27] = 0b1000_0101; // unicast set, index = 5
        buf
    }

    #[test]
    fn rc4_descriptor_roundtrips_fields() {
        let buf = rc4_bytes(4);
        let descriptor = Rc4KeyDescriptor::parse(&buf).unwrap();
        assert_eq!(descriptor.key_length, 16);
        assert!(descriptor.flags.unicast());
        assert_eq!(descriptor.flags.index(), 5);
        assert_eq!(descriptor.key_material.len(), 4);
    }

    #[test]
    fn rc4_descriptor_too_short_is_invalid() {
        let buf = vec![KeyDescriptorType::Rc4 as u8; RC4_DESCRIPTOR_SIZE - 1];
        assert!(Rc4KeyDescriptor::parse(&buf).is_err());
    }

    fn ieee80211_bytes(key_data_len: u16, actual_key_data: usize) -> Vec<u8> {
        let mut buf = vec![0u8; IEEE80211_DESCRIPTOR_SIZE + actual_key_data];
        buf[0] = KeyDescriptorType::Ieee80211 as u8;
        BigEndian::write_u16(&mut buf[93..95], key_data_len);
        buf
    }

    #[test]
    fn ieee80211_key_data_length_equal_to_available_is_valid() {
        let buf = ieee80211_bytes(10, 10);
        assert!(validate_key_body(&buf).is_ok());
    }

    #[test]
    fn ieee80211_key_data_length_one_greater_than_available_is_invalid() {
        let buf = ieee80211_bytes(11, 10);
        assert!(validate_key_body(&buf).is_err());
    }

    #[test]
    fn unknown_descriptor_type_is_invalid() {
        let buf = vec![0xffu8; IEEE80211_DESCRIPTOR_SIZE];
        assert_eq!(
            validate_key_body(&buf),
            Err(WireError::UnknownDescriptorType(0xff))
        );
    }
}

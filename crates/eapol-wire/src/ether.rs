use crate::error::WireError;
use byteorder::{BigEndian, ByteOrder};
use std::fmt;

pub const ETHER_HEADER_SIZE: usize = 14;

/// IEEE 802.1X multicast destination used for EAPOL frames on wired links.
pub const EAPOL_MULTICAST: EthernetAddress = EthernetAddress([0x01, 0x80, 0xC2, 0x00, 0x00, 0x03]);

/// A 6-byte MAC address.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EthernetAddress(pub [u8; 6]);

impl EthernetAddress {
    pub const ZERO: EthernetAddress = EthernetAddress([0; 6]);

    #[inline]
    pub fn from_bytes(bytes: &[u8]) -> Option<EthernetAddress> {
        if bytes.len() < 6 {
            return None;
        }
        let mut addr = [0u8; 6];
        addr.copy_from_slice(&bytes[..6]);
        Some(EthernetAddress(addr))
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 6] {
        &self.0
    }
}

impl fmt::Display for EthernetAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

/// EtherType values this codec cares about. Anything else is rejected by the
/// transport at demultiplex time, not here — `EthernetHeader::parse` reports
/// the raw value either way.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EtherType {
    Eapol,
    PreAuth,
    Other(u16),
}

impl EtherType {
    pub const EAPOL: u16 = 0x888E;
    pub const PRE_AUTH: u16 = 0x88C7;

    #[inline]
    pub fn from_u16(value: u16) -> EtherType {
        match value {
            Self::EAPOL => EtherType::Eapol,
            Self::PRE_AUTH => EtherType::PreAuth,
            other => EtherType::Other(other),
        }
    }

    #[inline]
    pub fn as_u16(self) -> u16 {
        match self {
            EtherType::Eapol => Self::EAPOL,
            EtherType::PreAuth => Self::PRE_AUTH,
            EtherType::Other(v) => v,
        }
    }
}

/// Parsed (destination, source, ethertype) Ethernet II header. A frame
/// shorter than 14 bytes cannot carry one and is rejected at parse time.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EthernetHeader {
    pub destination: EthernetAddress,
    pub source: EthernetAddress,
    pub ether_type: EtherType,
}

impl EthernetHeader {
    #[inline]
    pub fn parse(buf: &[u8]) -> Result<EthernetHeader, WireError> {
        if buf.len() < ETHER_HEADER_SIZE {
            return Err(WireError::TooShort {
                needed: ETHER_HEADER_SIZE,
                available: buf.len(),
            });
        }

        let destination = EthernetAddress::from_bytes(&buf[0..6]).expect("slice is 6 bytes");
        let source = EthernetAddress::from_bytes(&buf[6..12]).expect("slice is 6 bytes");
        let ether_type = EtherType::from_u16(BigEndian::read_u16(&buf[12..14]));

        Ok(EthernetHeader {
            destination,
            source,
            ether_type,
        })
    }

    /// Writes the 14-byte header into `out`, which must have at least that much space.
    #[inline]
    pub fn write(&self, out: &mut [u8]) {
        out[0..6].copy_from_slice(self.destination.as_bytes());
        out[6..12].copy_from_slice(self.source.as_bytes());
        BigEndian::write_u16(&mut out[12..14], self.ether_type.as_u16());
    }
}

impl fmt::Display for EthernetHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} ethertype=0x{:04x}",
            self.source,
            self.destination,
            self.ether_type.as_u16()
        )
    }
}

use std::fmt;

/// Validation failures for Ethernet/EAPOL framing. None of these are I/O
/// errors: the bytes were read successfully, they're simply malformed or
/// too short for what they claim to contain.
#[derive(Debug, Eq, PartialEq)]
pub enum WireError {
    /// The buffer is shorter than a fixed-size header requires.
    TooShort { needed: usize, available: usize },
    /// `body_length` (or `key_data_length`) claims more bytes than are present.
    Truncated { declared: usize, available: usize },
    /// The packet type byte is outside the closed set of EAPOL packet types.
    UnknownPacketType(u8),
    /// The descriptor type byte (first byte of a Key body) is neither RC4 nor IEEE 802.11.
    UnknownDescriptorType(u8),
    /// The EAP validator rejected the body of an `EapPacket`-typed frame.
    InvalidEapBody,
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::TooShort { needed, available } => {
                write!(f, "buffer too short: needed {}, got {}", needed, available)
            }
            WireError::Truncated { declared, available } => write!(
                f,
                "declared length {} exceeds available {} bytes",
                declared, available
            ),
            WireError::UnknownPacketType(t) => write!(f, "unknown EAPOL packet type {}", t),
            WireError::UnknownDescriptorType(t) => write!(f, "unknown key descriptor type {}", t),
            WireError::InvalidEapBody => write!(f, "invalid EAP packet body"),
        }
    }
}

impl std::error::Error for WireError {}

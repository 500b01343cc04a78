//! Wire codec for Ethernet/EAPOL framing.
//!
//! Every type in this crate is a pure data structure: parsing validates a
//! byte slice and either returns a borrowed/owned view or reports why the
//! bytes are not well-formed. Nothing here touches a socket, a clock, or a
//! log; the transport crate is the one that decides what a validation
//! failure means operationally (drop, log, disconnect).

mod eap;
mod eapol;
mod error;
mod ether;
mod key;

pub use eap::{EapHeader, EapValidator, DefaultEapValidator};
pub use eapol::{EapolHeader, EapolPacketType, EAPOL_HEADER_SIZE, EAPOL_VERSION};
pub use error::WireError;
pub use ether::{EtherType, EthernetAddress, EthernetHeader, ETHER_HEADER_SIZE, EAPOL_MULTICAST};
pub use key::{
    Ieee80211KeyDescriptor, KeyDescriptorType, Rc4KeyDescriptor, IEEE80211_DESCRIPTOR_SIZE,
    RC4_DESCRIPTOR_SIZE,
};

/// Validates the EAPOL body that follows a header already known to be
/// well-formed, dispatching on packet type to the right per-type check.
///
/// `body` is everything after the 4-byte EAPOL header, truncated to exactly
/// `header.body_length` bytes by the caller is *not* required: `body` may be
/// longer (trailing padding is allowed and reported via `extra`, never an
/// error) but must be at least `header.body_length` bytes.
pub fn eapol_body_valid(
    header: &EapolHeader,
    body: &[u8],
    eap_validator: &dyn EapValidator,
) -> Result<(), WireError> {
    let declared = header.body_length as usize;
    if body.len() < declared {
        return Err(WireError::Truncated {
            declared,
            available: body.len(),
        });
    }
    let declared_body = &body[..declared];

    match header.packet_type() {
        Some(EapolPacketType::EapPacket) => eap_validator
            .validate(declared_body)
            .map_err(|_| WireError::InvalidEapBody),
        Some(EapolPacketType::Key) => key::validate_key_body(declared_body),
        Some(EapolPacketType::Start)
        | Some(EapolPacketType::Logoff)
        | Some(EapolPacketType::EncapsulatedAsfAlert) => Ok(()),
        None => Err(WireError::UnknownPacketType(header.raw_packet_type)),
    }
}

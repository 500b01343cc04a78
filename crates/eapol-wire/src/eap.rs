use byteorder::{BigEndian, ByteOrder};

/// The four fixed bytes every EAP packet opens with (RFC 3748 section 4).
/// The EAP method state machine itself lives outside this crate; this is the
/// seam a caller's validator inspects, not an EAP implementation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct EapHeader {
    pub code: u8,
    pub identifier: u8,
    pub length: u16,
}

impl EapHeader {
    #[inline]
    pub fn parse(body: &[u8]) -> Option<EapHeader> {
        if body.len() < 4 {
            return None;
        }
        Some(EapHeader {
            code: body[0],
            identifier: body[1],
            length: BigEndian::read_u16(&body[2..4]),
        })
    }
}

/// Pluggable validator for `EapPacket`-typed EAPOL bodies. `eapol-transport`
/// supplies whatever its embedding EAP method layer requires; `eapol-wire`
/// only ships the structural default.
pub trait EapValidator {
    fn validate(&self, body: &[u8]) -> Result<(), ()>;
}

/// Checks that the body opens with a well-formed EAP header whose declared
/// `length` does not exceed the bytes actually present. This is the extent
/// of what the transport layer can check without understanding EAP methods.
#[derive(Debug, Default, Copy, Clone)]
pub struct DefaultEapValidator;

impl EapValidator for DefaultEapValidator {
    fn validate(&self, body: &[u8]) -> Result<(), ()> {
        match EapHeader::parse(body) {
            Some(header) if (header.length as usize) <= body.len() => Ok(()),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_body_shorter_than_header() {
        assert!(DefaultEapValidator.validate(&[1, 2, 3]).is_err());
    }

    #[test]
    fn accepts_consistent_length() {
        let body = [1u8, 7, 0, 4];
        assert!(DefaultEapValidator.validate(&body).is_ok());
    }

    #[test]
    fn rejects_length_exceeding_body() {
        let body = [1u8, 7, 0, 99];
        assert!(DefaultEapValidator.validate(&body).is_err());
    }
}

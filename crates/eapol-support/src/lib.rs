//! Ambient infrastructure shared across the EAPOL transport crates: logging
//! bootstrap and small time helpers. Deliberately thin — this is the
//! equivalent of the reference service's `flux` crate trimmed to what an
//! 802.1X transport actually needs (no crypto, no session tokens).

pub mod logging;
pub mod time;

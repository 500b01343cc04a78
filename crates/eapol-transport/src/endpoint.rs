//! The object a single supplicant instance holds to send and receive EAPOL.
//! `SocketSource` owns every `Endpoint`; an `Endpoint` never holds a
//! reference back to its source, only the two flags the sweep and transmit
//! paths need (`EndpointKind`, `remove`).

use eapol_wire::EthernetAddress;
use eapol_support::logging::Logger;

use crate::contracts::Supplicant;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EndpointKind {
    Main,
    Preauth(EthernetAddress),
}

impl EndpointKind {
    pub fn bssid(&self) -> Option<EthernetAddress> {
        match self {
            EndpointKind::Main => None,
            EndpointKind::Preauth(bssid) => Some(*bssid),
        }
    }

    /// `"(main)"` or the BSSID stringified, per `Endpoint::name()`.
    pub fn name(&self) -> String {
        match self {
            EndpointKind::Main => "(main)".to_owned(),
            EndpointKind::Preauth(bssid) => bssid.to_string(),
        }
    }
}

/// One socket endpoint: an owning reference to its supplicant, a receive
/// callback it may or may not have enabled, and the deferred-removal flag
/// the sweep in `source.rs` acts on.
pub struct Endpoint {
    pub kind: EndpointKind,
    pub supplicant: Box<dyn Supplicant>,
    pub receive_enabled: bool,
    pub remove: bool,
    pub log: Logger,
}

impl Endpoint {
    pub fn new_main(supplicant: Box<dyn Supplicant>, log: Logger) -> Endpoint {
        Endpoint {
            kind: EndpointKind::Main,
            supplicant,
            receive_enabled: true,
            remove: false,
            log,
        }
    }

    pub fn new_preauth(bssid: EthernetAddress, supplicant: Box<dyn Supplicant>, log: Logger) -> Endpoint {
        Endpoint {
            kind: EndpointKind::Preauth(bssid),
            supplicant,
            receive_enabled: true,
            remove: false,
            log,
        }
    }

    #[inline]
    pub fn enable_receive(&mut self) {
        self.receive_enabled = true;
    }

    #[inline]
    pub fn disable_receive(&mut self) {
        self.receive_enabled = false;
    }

    #[inline]
    pub fn is_main(&self) -> bool {
        self.kind == EndpointKind::Main
    }

    #[inline]
    pub fn bssid(&self) -> Option<EthernetAddress> {
        self.kind.bssid()
    }

    #[inline]
    pub fn name(&self) -> String {
        self.kind.name()
    }

    #[inline]
    pub fn flag_for_removal(&mut self) {
        self.remove = true;
    }
}

//! Placeholder implementations of the transport's external collaborators
//! (the EAP method state machine, the controller RPC client, the wireless
//! driver adapter). These exist only so the binary links and the run loop
//! has something to drive; swapping in real implementations of
//! `Supplicant`, `ControllerClient` and `WirelessAdapter` is the
//! integration work this crate's boundary exists to keep separate.

use eapol_transport::{
    ClientStatus, ControlDict, ControllerClient, ControllerEvent, EndpointHandle, RxView, ScanEvent,
    Supplicant, SupplicantState, WirelessAdapter,
};
use eapol_wire::{EthernetAddress, KeyDescriptorType};
use eapol_support::logging::{self as log_macros, Logger};

pub struct NullSupplicant {
    log: Logger,
}

impl NullSupplicant {
    pub fn new(log: Logger) -> NullSupplicant {
        NullSupplicant { log }
    }
}

impl Supplicant for NullSupplicant {
    fn start(&mut self, _endpoint: &mut dyn EndpointHandle) {
        log_macros::info!(self.log, "supplicant started");
    }

    fn stop(&mut self, _endpoint: &mut dyn EndpointHandle) {
        log_macros::info!(self.log, "supplicant stopped");
    }

    fn get_state(&self) -> (SupplicantState, ClientStatus) {
        (SupplicantState::Inactive, ClientStatus::Ok)
    }

    fn control(&mut self, _endpoint: &mut dyn EndpointHandle, _command: i64, _dict: &ControlDict) -> bool {
        false
    }

    fn update_configuration(&mut self, _dict: &ControlDict) {}

    fn link_status_changed(&mut self, _endpoint: &mut dyn EndpointHandle, active: bool) {
        log_macros::debug!(self.log, "link status changed"; "active" => active);
    }

    fn set_no_ui(&mut self, _no_ui: bool) {}

    fn receive(&mut self, _endpoint: &mut dyn EndpointHandle, view: RxView<'_>) {
        log_macros::trace!(self.log, "received eapol frame"; "bytes" => view.as_bytes().len());
    }

    fn derive_for_preauth(&self) -> Box<dyn Supplicant> {
        Box::new(NullSupplicant::new(self.log.clone()))
    }
}

/// A controller client that never hears from the controller. `attach`-style
/// setup belongs to whatever real RPC transport backs it; that transport is
/// out of scope here.
pub struct NullController;

impl ControllerClient for NullController {
    fn report_status(&mut self, _dict: &ControlDict) {}
    fn force_renew(&mut self) {}
    fn poll_event(&mut self) -> Option<ControllerEvent> {
        None
    }
    fn detach(&mut self) {}
}

/// A wireless adapter that reports "not associated" forever. Useful for
/// exercising the wired code path end to end and for the pre-auth unit
/// tests in `eapol-transport`; not a real driver binding.
pub struct NullWireless;

impl WirelessAdapter for NullWireless {
    fn ap_mac(&self) -> Option<EthernetAddress> {
        None
    }
    fn copy_ssid(&self) -> Option<String> {
        None
    }
    fn is_wpa_enterprise(&self) -> bool {
        false
    }
    fn set_key(&mut self, _key_type: KeyDescriptorType, _index: u8, _key: &[u8]) -> bool {
        false
    }
    fn set_wpa_pmk(&mut self, _bssid: Option<EthernetAddress>, _pmk: &[u8]) -> bool {
        false
    }
    fn scan(&mut self, _ssid: &str, _count: u32) {}
    fn scan_cancel(&mut self) {}
    fn poll_scan_event(&mut self) -> Option<ScanEvent> {
        None
    }
    fn subscribe_handshake(&mut self) {}
    fn unsubscribe_handshake(&mut self) {}
    fn poll_handshake_complete(&mut self) -> bool {
        false
    }
}
